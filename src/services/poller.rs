//! 任务轮询服务 - 业务能力层
//!
//! 只负责"等一个任务结束"，不关心结果怎么解析、存到哪里。

use crate::clients::{JobStatus, WebhookClient};
use crate::config::Config;
use crate::error::ApiError;
use crate::models::JobHandle;
use crate::services::normalizer::is_falsy;
use serde_json::Value;
use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep_until, timeout, Instant};
use tracing::{debug, info, warn};

/// 任务状态来源
///
/// 生产环境由 `WebhookClient` 实现，测试中可替换为脚本化的假实现。
pub trait JobStatusSource {
    fn query_status(
        &self,
        job: &JobHandle,
    ) -> impl Future<Output = Result<JobStatus, ApiError>> + Send;
}

impl JobStatusSource for WebhookClient {
    fn query_status(
        &self,
        job: &JobHandle,
    ) -> impl Future<Output = Result<JobStatus, ApiError>> + Send {
        WebhookClient::query_status(self, job)
    }
}

/// 轮询结果
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// 任务完成且有题目
    Done(Value),
    /// 任务完成但题目为空
    Empty,
    /// 超过最长等待时间
    TimedOut { waited: Duration, attempts: u32 },
    /// 超时，且期间每次查询都失败
    TransientErrorExhausted {
        waited: Duration,
        attempts: u32,
        last_error: String,
    },
}

/// 任务轮询器
///
/// 只保存间隔和预算，不保存任何任务相关状态，可同时轮询多个任务。
#[derive(Debug, Clone, Copy)]
pub struct Poller {
    interval: Duration,
    max_wait: Duration,
}

impl Poller {
    pub fn new(interval: Duration, max_wait: Duration) -> Self {
        Self { interval, max_wait }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.poll_interval(), config.poll_max_wait())
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn max_wait(&self) -> Duration {
        self.max_wait
    }

    /// 轮询任务直到完成或超时
    ///
    /// 单次查询失败只记录日志，不提前结束；正在进行的查询超出剩余预算会被直接放弃。
    pub async fn poll<S: JobStatusSource>(&self, source: &S, handle: JobHandle) -> PollOutcome {
        let started = Instant::now();
        let deadline = started + self.max_wait;
        let mut attempts: u32 = 0;
        let mut responded = false;
        let mut last_error: Option<String> = None;

        info!(
            "⏳ 开始轮询 {} (间隔 {:?}, 最长 {:?})",
            handle, self.interval, self.max_wait
        );

        loop {
            attempts += 1;
            let remaining = deadline.saturating_duration_since(Instant::now());

            match timeout(remaining, source.query_status(&handle)).await {
                Err(_) => {
                    warn!("{} 第 {} 次查询未在剩余预算内返回", handle, attempts);
                    break;
                }
                Ok(Ok(status)) => {
                    responded = true;
                    if status.is_done() {
                        return if is_falsy(&status.questions) {
                            warn!("{} 已完成，但没有生成题目", handle);
                            PollOutcome::Empty
                        } else {
                            info!("✓ {} 已完成 (第 {} 次查询)", handle, attempts);
                            PollOutcome::Done(status.questions)
                        };
                    }
                    debug!(
                        "{} 进行中 (尝试 {}, status={:?})",
                        handle, attempts, status.status
                    );
                }
                Ok(Err(e)) => {
                    warn!("{} 状态查询失败 (尝试 {}), 继续等待: {}", handle, attempts, e);
                    last_error = Some(e.to_string());
                }
            }

            if Instant::now() >= deadline {
                break;
            }
            // 下次查询和截止时间，取先到者
            sleep_until((Instant::now() + self.interval).min(deadline)).await;
            if Instant::now() >= deadline {
                break;
            }
        }

        let waited = started.elapsed();
        match (responded, last_error) {
            (false, Some(last_error)) => PollOutcome::TransientErrorExhausted {
                waited,
                attempts,
                last_error,
            },
            _ => PollOutcome::TimedOut { waited, attempts },
        }
    }
}
