//! 题目生成流程 - 流程层
//!
//! 流程顺序：
//! 1. 提交生成请求
//! 2. 200 → 直接归一化；202 → 轮询到结束再归一化
//! 3. 非空题目集写入会话
//!
//! 任何失败都在写入会话之前返回，会话保持不变。

use crate::clients::{GenerationOutcome, WebhookClient};
use crate::error::{ApiError, AppResult, BusinessError};
use crate::models::{Category, DifficultyRange, GenerationRequest, QuestionSet};
use crate::services::normalizer::{self, Normalized};
use crate::services::{PollOutcome, Poller};
use crate::session::SessionStore;
use crate::utils::truncate_text;
use tracing::{info, warn};

/// 生成结果的来源
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationSource {
    /// 同步返回
    Immediate,
    /// 异步任务
    Job { job_id: String },
}

/// 生成结果摘要
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationReport {
    pub source: GenerationSource,
    pub record_count: usize,
}

pub struct GenerationFlow {
    client: WebhookClient,
    poller: Poller,
}

impl GenerationFlow {
    pub fn new(client: WebhookClient, poller: Poller) -> Self {
        Self { client, poller }
    }

    /// 为已上传的书籍生成题目
    ///
    /// # 参数
    /// - `book_name`: 书籍显示名，必须已在会话中登记
    /// - `category`: 题目类别
    /// - `count`: 请求题量（全部类别时忽略）
    /// - `difficulty`: 难度范围
    pub async fn run(
        &self,
        store: &mut SessionStore,
        book_name: &str,
        category: Category,
        count: Option<u32>,
        difficulty: DifficultyRange,
    ) -> AppResult<GenerationReport> {
        let book = store
            .find_book(book_name)
            .cloned()
            .ok_or_else(|| BusinessError::BookNotRegistered {
                display_name: book_name.to_string(),
            })?;

        let request = GenerationRequest {
            category,
            question_count: category.resolve_count(count)?,
            difficulty,
        };

        info!(
            "🎯 《{}》: {} 类题目 {} 道 ({}) 生成中...",
            book.display_name, category, request.question_count, difficulty
        );

        let (source, normalized) = match self.client.submit_generation(&book, &request).await? {
            GenerationOutcome::Immediate(raw) => {
                (GenerationSource::Immediate, normalizer::normalize(&raw))
            }
            GenerationOutcome::Accepted(handle) => {
                let job_id = handle.job_id().to_string();
                info!("题目生成中... (最多等待 {:?})", self.poller.max_wait());

                let questions = match self.poller.poll(&self.client, handle).await {
                    PollOutcome::Done(questions) => questions,
                    PollOutcome::Empty => return Err(ApiError::EmptyResult.into()),
                    PollOutcome::TimedOut { waited, .. } => {
                        return Err(ApiError::Timeout {
                            waited_secs: waited.as_secs(),
                        }
                        .into())
                    }
                    PollOutcome::TransientErrorExhausted {
                        waited, last_error, ..
                    } => {
                        return Err(ApiError::TransientErrorExhausted {
                            waited_secs: waited.as_secs(),
                            last_error,
                        }
                        .into())
                    }
                };
                (
                    GenerationSource::Job { job_id },
                    normalizer::normalize_value(&questions),
                )
            }
        };

        let records = match normalized {
            Normalized::Questions(records) if records.is_empty() => {
                warn!("❌ 没有生成任何题目");
                return Err(ApiError::EmptyResult.into());
            }
            Normalized::Questions(records) => records,
            Normalized::ParseFailure(raw_text) => {
                warn!(
                    "⚠️ 题目解析失败，原文预览: {}",
                    truncate_text(&raw_text, 80)
                );
                return Err(ApiError::ParseFailure { raw_text }.into());
            }
        };

        let record_count = records.len();
        store.set_current_questions(QuestionSet::new(book, request, records));
        info!("✅ 已生成 {} 道题目", record_count);

        Ok(GenerationReport {
            source,
            record_count,
        })
    }
}
