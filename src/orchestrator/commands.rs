//! 交互命令解析
//!
//! 每一行输入先按引号切分，再交给 clap 解析成 [`Command`]。

use crate::models::{Category, DifficultyRange};
use crate::services::ExportFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(no_binary_name = true, name = "", disable_version_flag = true)]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum Command {
    /// 上传书籍 (pdf / docx)
    Upload {
        /// 本地文件路径
        file: PathBuf,
        /// 显示用书名
        title_kr: String,
        /// webhook 侧标识（默认由书名推导）
        title_en: Option<String>,
    },
    /// 列出已上传书籍
    Books,
    /// 为已上传的书籍生成题目
    Generate {
        /// 书名
        book: String,
        #[arg(short, long, default_value = "all", value_parser = parse_category)]
        category: Category,
        /// 题量 (1-20，全部类别时固定 50)
        #[arg(short = 'n', long)]
        count: Option<u32>,
        #[arg(short, long, default_value = "all", value_parser = parse_difficulty)]
        difficulty: DifficultyRange,
    },
    /// 显示当前题目
    Show {
        #[arg(long)]
        all: bool,
    },
    /// 当前题目统计
    Stats,
    /// 导出当前题目
    Export {
        #[arg(value_parser = parse_format)]
        format: ExportFormat,
        /// 输出目录（默认使用配置中的 export_dir）
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// 清空会话
    Clear,
    /// 退出
    #[command(alias = "exit")]
    Quit,
}

fn parse_category(s: &str) -> Result<Category, String> {
    Category::parse(s).map_err(|e| e.to_string())
}

fn parse_difficulty(s: &str) -> Result<DifficultyRange, String> {
    DifficultyRange::parse(s).map_err(|e| e.to_string())
}

fn parse_format(s: &str) -> Result<ExportFormat, String> {
    ExportFormat::parse(s).map_err(|e| e.to_string())
}

/// 解析一行输入
///
/// 空行返回 `Ok(None)`；解析失败（含 help）返回 clap 给出的文本。
pub fn parse_line(line: &str) -> Result<Option<Command>, String> {
    let tokens = tokenize(line)?;
    if tokens.is_empty() {
        return Ok(None);
    }

    CommandLine::try_parse_from(tokens)
        .map(|parsed| Some(parsed.command))
        .map_err(|e| e.to_string())
}

/// 按空白切分，双引号或单引号内的空白保留
pub fn tokenize(line: &str) -> Result<Vec<String>, String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut in_token = false;

    for c in line.chars() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), c) => current.push(c),
            (None, '"' | '\'') => {
                quote = Some(c);
                in_token = true;
            }
            (None, c) if c.is_whitespace() => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            (None, c) => {
                current.push(c);
                in_token = true;
            }
        }
    }

    if quote.is_some() {
        return Err("引号未闭合".to_string());
    }
    if in_token {
        tokens.push(current);
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_keeps_quoted_spaces() {
        assert_eq!(
            tokenize(r#"upload ./book.pdf "가방 들어주는 아이" bag_carrier"#).unwrap(),
            vec!["upload", "./book.pdf", "가방 들어주는 아이", "bag_carrier"]
        );
        assert_eq!(tokenize("  ").unwrap(), Vec::<String>::new());
        assert_eq!(tokenize(r#"generate """#).unwrap(), vec!["generate", ""]);
        assert!(tokenize(r#"upload "unterminated"#).is_err());
    }

    #[test]
    fn test_parse_generate_with_options() {
        let cmd = parse_line(r#"generate "어린 왕자" --category 사고 -n 5 --difficulty hard"#)
            .unwrap()
            .unwrap();
        assert_eq!(
            cmd,
            Command::Generate {
                book: "어린 왕자".to_string(),
                category: Category::Thinking,
                count: Some(5),
                difficulty: DifficultyRange::Hard,
            }
        );
    }

    #[test]
    fn test_parse_generate_defaults() {
        let cmd = parse_line("generate Book").unwrap().unwrap();
        assert_eq!(
            cmd,
            Command::Generate {
                book: "Book".to_string(),
                category: Category::All,
                count: None,
                difficulty: DifficultyRange::All,
            }
        );
    }

    #[test]
    fn test_parse_misc_commands() {
        assert_eq!(parse_line("").unwrap(), None);
        assert_eq!(parse_line("exit").unwrap(), Some(Command::Quit));
        assert_eq!(
            parse_line("export csv").unwrap(),
            Some(Command::Export {
                format: ExportFormat::Csv,
                dir: None
            })
        );
        assert_eq!(
            parse_line("show --all").unwrap(),
            Some(Command::Show { all: true })
        );
    }

    #[test]
    fn test_parse_rejects_unknown_values() {
        assert!(parse_line("export pdf").is_err());
        assert!(parse_line("generate Book --category nonsense").is_err());
        assert!(parse_line("dance").is_err());
    }
}
