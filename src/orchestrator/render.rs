//! 文本渲染
//!
//! 书籍列表、题目表格、预览、统计和错误提示。

use crate::error::{ApiError, AppError};
use crate::models::{BookRef, QuestionSet};
use crate::utils::truncate_text;
use std::fmt::Write;

/// 预览条数
pub const PREVIEW_COUNT: usize = 3;
/// 表格默认显示行数
pub const TABLE_ROW_LIMIT: usize = 20;

pub fn render_books(books: &[BookRef]) -> String {
    if books.is_empty() {
        return "📖 还没有上传任何书籍。".to_string();
    }

    let mut out = String::from("📖 已上传书籍:\n");
    for book in books {
        let _ = writeln!(out, "  • {} [{}]", book.display_name, book.external_key);
    }
    out
}

/// 前几道题的预览
pub fn render_preview(set: &QuestionSet) -> String {
    let mut out = String::from("📋 生成题目预览\n");
    for (i, q) in set.records.iter().take(PREVIEW_COUNT).enumerate() {
        let _ = writeln!(out, "문제 {}. [{}][{}]", i + 1, q.category, q.difficulty);
        let _ = writeln!(out, "{}", q.question);
        let _ = writeln!(out, "(A) {}", q.choice_a);
        let _ = writeln!(out, "(B) {}", q.choice_b);
        let _ = writeln!(out, "(C) {}", q.choice_c);
        let _ = writeln!(out, "---");
    }
    out
}

/// 题目表格
///
/// `limit` 为 None 时显示全部。
pub fn render_table(set: &QuestionSet, limit: Option<usize>) -> String {
    let shown = limit.unwrap_or(set.len()).min(set.len());
    let mut out = format!(
        "📊 《{}》 {} / {} ({} 题, 生成于 {})\n",
        set.book.display_name,
        set.request.category,
        set.request.difficulty,
        set.len(),
        set.generated_at.format("%Y-%m-%d %H:%M:%S")
    );
    let _ = writeln!(out, "{}", "─".repeat(60));
    let _ = writeln!(out, "# | category | difficulty | question | A | B | C");

    for (i, q) in set.records.iter().take(shown).enumerate() {
        let _ = writeln!(
            out,
            "{} | {} | {} | {} | {} | {} | {}",
            i + 1,
            q.category,
            q.difficulty,
            truncate_text(&q.question, 40),
            truncate_text(&q.choice_a, 15),
            truncate_text(&q.choice_b, 15),
            truncate_text(&q.choice_c, 15),
        );
    }

    if shown < set.len() {
        let _ = writeln!(out, "... 还有 {} 题 (使用 show --all 查看全部)", set.len() - shown);
    }
    out
}

pub fn render_stats(set: &QuestionSet) -> String {
    let stats = set.stats();
    let average = stats
        .average_difficulty
        .map(|avg| format!("{:.1}", avg))
        .unwrap_or_else(|| "N/A".to_string());

    format!(
        "总题数: {}\n类别数: {}\n平均难度: {}",
        stats.total, stats.category_count, average
    )
}

/// 面向用户的错误提示
pub fn render_error(err: &AppError) -> String {
    let AppError::Api(api) = err else {
        return format!("❌ {}", err);
    };

    match api {
        ApiError::Transport { source, .. } if source.is_timeout() => {
            "❌ 请求超时，请稍后重试。".to_string()
        }
        ApiError::Transport { endpoint, source } => {
            format!("❌ 网络错误 ({}): {}", endpoint, source)
        }
        ApiError::Server { status, message, .. } => {
            format!("❌ 请求失败 (HTTP {}): {}", status, message)
        }
        ApiError::Protocol { detail, .. } => {
            format!("❌ 响应不完整，请检查 webhook 响应: {}", detail)
        }
        ApiError::EmptyResult => "❌ 生成结果为空，请重新尝试。".to_string(),
        ApiError::ParseFailure { raw_text } => format!(
            "⚠️ 题目解析出错，以下为原始文本:\n{}\n{}\nℹ️ 题目已生成但格式转换失败，请检查工作流中的 question parsing 节点。",
            "─".repeat(60),
            raw_text
        ),
        ApiError::Timeout { waited_secs } => {
            format!("⏳ 已等待 {} 秒仍未完成，请稍后再试。", waited_secs)
        }
        ApiError::TransientErrorExhausted {
            waited_secs,
            last_error,
        } => format!(
            "⏳ {} 秒内无法获取任务状态，请稍后再试。(最后错误: {})",
            waited_secs, last_error
        ),
    }
}
