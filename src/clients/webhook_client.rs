/// Webhook 客户端
///
/// 封装与远端题目生成工作流的三个接口：上传、生成、查询任务状态。
/// 本身不持有任何会话状态。
use crate::config::Config;
use crate::error::{AppError, AppResult, ApiError};
use crate::models::{BookRef, GenerationRequest, JobHandle};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info, warn};

pub const UPLOAD_ENDPOINT: &str = "book-upload";
pub const GENERATE_ENDPOINT: &str = "generate-questions";
pub const STATUS_ENDPOINT: &str = "job-result";

/// 同步返回的原始响应体
#[derive(Debug, Clone, PartialEq)]
pub enum RawResponse {
    /// 可以解析为 JSON
    Json(Value),
    /// 非 JSON 文本
    Text(String),
}

impl RawResponse {
    pub fn from_body(body: String) -> Self {
        match serde_json::from_str(&body) {
            Ok(value) => RawResponse::Json(value),
            Err(_) => RawResponse::Text(body),
        }
    }
}

/// 提交生成请求的结果
#[derive(Debug)]
pub enum GenerationOutcome {
    /// 200：直接返回题目
    Immediate(RawResponse),
    /// 202：返回任务 ID，需要轮询
    Accepted(JobHandle),
}

/// 任务状态
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobStatus {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub questions: Value,
}

impl JobStatus {
    pub fn is_done(&self) -> bool {
        self.status.as_deref() == Some("done")
    }
}

/// Webhook 客户端
#[derive(Clone)]
pub struct WebhookClient {
    http: reqwest::Client,
    base_url: String,
    upload_timeout: Duration,
    generate_timeout: Duration,
    status_timeout: Duration,
}

impl WebhookClient {
    /// 创建新的 webhook 客户端
    pub fn new(config: &Config) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| AppError::transport("client-init", e))?;

        Ok(Self {
            http,
            base_url: config.webhook_base_url.trim_end_matches('/').to_string(),
            upload_timeout: config.upload_timeout(),
            generate_timeout: config.generate_timeout(),
            status_timeout: config.status_timeout(),
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint)
    }

    /// 上传书籍文件
    ///
    /// # 参数
    /// - `file_bytes`: 文件内容（以 base64 发送）
    /// - `filename`: 原始文件名
    /// - `title_kr`: 显示用书名
    /// - `title_en`: webhook 侧标识
    ///
    /// # 返回
    /// 200 时返回书籍引用；其他状态码返回服务端原文
    pub async fn submit_upload(
        &self,
        file_bytes: &[u8],
        filename: &str,
        title_kr: &str,
        title_en: &str,
    ) -> Result<BookRef, ApiError> {
        let book = BookRef::new(title_kr, Some(title_en));
        let payload = json!({
            "file": STANDARD.encode(file_bytes),
            "filename": filename,
            "bookTitleKr": book.display_name,
            "bookTitleEn": book.external_key,
        });

        info!(
            "📤 上传书籍《{}》({}, {} 字节)...",
            book.display_name,
            filename,
            file_bytes.len()
        );

        let response = self
            .http
            .post(self.url(UPLOAD_ENDPOINT))
            .json(&payload)
            .timeout(self.upload_timeout)
            .send()
            .await
            .map_err(|e| transport(UPLOAD_ENDPOINT, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| transport(UPLOAD_ENDPOINT, e))?;

        if status != StatusCode::OK {
            warn!("上传失败 (HTTP {}): {}", status.as_u16(), body);
            return Err(ApiError::Server {
                endpoint: UPLOAD_ENDPOINT.to_string(),
                status: status.as_u16(),
                message: body,
            });
        }

        debug!("上传响应: {}", body);
        Ok(book)
    }

    /// 提交题目生成请求
    ///
    /// # 返回
    /// - `Immediate`：200，响应体交给归一化器
    /// - `Accepted`：202，带任务 ID
    pub async fn submit_generation(
        &self,
        book: &BookRef,
        request: &GenerationRequest,
    ) -> Result<GenerationOutcome, ApiError> {
        let payload = json!({
            "bookTitleKr": book.display_name,
            "bookTitleEn": book.external_key,
            "category": request.category.wire_value(),
            "questionCount": request.question_count,
            "difficultyRange": request.difficulty.label(),
        });

        debug!("生成请求 Payload: {}", payload);

        let response = self
            .http
            .post(self.url(GENERATE_ENDPOINT))
            .json(&payload)
            .timeout(self.generate_timeout)
            .send()
            .await
            .map_err(|e| transport(GENERATE_ENDPOINT, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| transport(GENERATE_ENDPOINT, e))?;

        match status {
            StatusCode::ACCEPTED => {
                let job_id = extract_job_id(&body).ok_or_else(|| ApiError::Protocol {
                    endpoint: GENERATE_ENDPOINT.to_string(),
                    detail: format!("202 响应缺少 jobId: {}", body),
                })?;
                info!("✓ 任务已受理: {}", job_id);
                Ok(GenerationOutcome::Accepted(JobHandle::new(job_id)))
            }
            StatusCode::OK => {
                debug!("同步返回 {} 字节", body.len());
                Ok(GenerationOutcome::Immediate(RawResponse::from_body(body)))
            }
            other => {
                warn!("生成请求失败 (HTTP {}): {}", other.as_u16(), body);
                Err(ApiError::Server {
                    endpoint: GENERATE_ENDPOINT.to_string(),
                    status: other.as_u16(),
                    message: body,
                })
            }
        }
    }

    /// 查询任务状态（单次，短超时）
    pub async fn query_status(&self, job: &JobHandle) -> Result<JobStatus, ApiError> {
        let response = self
            .http
            .get(self.url(STATUS_ENDPOINT))
            .query(&[("jobId", job.job_id())])
            .timeout(self.status_timeout)
            .send()
            .await
            .map_err(|e| transport(STATUS_ENDPOINT, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| transport(STATUS_ENDPOINT, e))?;

        if status != StatusCode::OK {
            return Err(ApiError::Server {
                endpoint: STATUS_ENDPOINT.to_string(),
                status: status.as_u16(),
                message: body,
            });
        }

        serde_json::from_str(&body).map_err(|e| ApiError::Protocol {
            endpoint: STATUS_ENDPOINT.to_string(),
            detail: format!("无法解析任务状态: {}", e),
        })
    }
}

fn transport(endpoint: &str, source: reqwest::Error) -> ApiError {
    ApiError::Transport {
        endpoint: endpoint.to_string(),
        source,
    }
}

/// 从 202 响应体中取出 jobId（字符串或数字，空值视为缺失）
fn extract_job_id(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("jobId")? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_job_id() {
        assert_eq!(extract_job_id(r#"{"jobId":"abc-1"}"#).as_deref(), Some("abc-1"));
        assert_eq!(extract_job_id(r#"{"jobId":42}"#).as_deref(), Some("42"));
        assert_eq!(extract_job_id(r#"{"jobId":""}"#), None);
        assert_eq!(extract_job_id(r#"{"status":"queued"}"#), None);
        assert_eq!(extract_job_id("accepted"), None);
    }

    #[test]
    fn test_raw_response_keeps_non_json_text() {
        assert_eq!(
            RawResponse::from_body("Workflow finished".to_string()),
            RawResponse::Text("Workflow finished".to_string())
        );
        assert!(matches!(
            RawResponse::from_body("[]".to_string()),
            RawResponse::Json(Value::Array(_))
        ));
    }

    #[test]
    fn test_job_status_done() {
        let status: JobStatus =
            serde_json::from_str(r#"{"status":"done","questions":[]}"#).unwrap();
        assert!(status.is_done());

        let pending: JobStatus = serde_json::from_str(r#"{"status":"running"}"#).unwrap();
        assert!(!pending.is_done());
        assert!(pending.questions.is_null());
    }

    #[test]
    fn test_url_joins_without_double_slash() {
        let config = Config {
            webhook_base_url: "http://localhost:5678/webhook/".to_string(),
            ..Config::default()
        };
        let client = WebhookClient::new(&config).unwrap();
        assert_eq!(client.url(UPLOAD_ENDPOINT), "http://localhost:5678/webhook/book-upload");
    }
}
