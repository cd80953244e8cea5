//! 书籍上传流程 - 流程层
//!
//! 校验文件 → 检查外部标识 → 上传 → 登记到会话。
//! 上传失败时会话不变。

use crate::clients::WebhookClient;
use crate::error::{AppError, AppResult, BusinessError};
use crate::models::BookRef;
use crate::session::SessionStore;
use std::path::Path;
use tracing::info;

/// 上传文件大小上限（200MB）
pub const MAX_UPLOAD_BYTES: u64 = 200 * 1024 * 1024;
/// 支持的文件扩展名
pub const SUPPORTED_EXTENSIONS: [&str; 2] = ["pdf", "docx"];

pub struct UploadFlow {
    client: WebhookClient,
}

impl UploadFlow {
    pub fn new(client: WebhookClient) -> Self {
        Self { client }
    }

    /// 从本地路径上传书籍
    pub async fn run(
        &self,
        store: &mut SessionStore,
        file_path: &Path,
        title_kr: &str,
        title_en: Option<&str>,
    ) -> AppResult<BookRef> {
        let filename = file_path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();

        let metadata = tokio::fs::metadata(file_path)
            .await
            .map_err(|e| AppError::file_read_failed(file_path.display().to_string(), e))?;
        validate_upload(&filename, metadata.len())?;

        let bytes = tokio::fs::read(file_path)
            .await
            .map_err(|e| AppError::file_read_failed(file_path.display().to_string(), e))?;

        self.upload_bytes(store, &bytes, &filename, title_kr, title_en)
            .await
    }

    /// 上传已读入内存的文件
    pub async fn upload_bytes(
        &self,
        store: &mut SessionStore,
        bytes: &[u8],
        filename: &str,
        title_kr: &str,
        title_en: Option<&str>,
    ) -> AppResult<BookRef> {
        if title_kr.trim().is_empty() {
            return Err(BusinessError::EmptyTitle.into());
        }
        validate_upload(filename, bytes.len() as u64)?;

        let book = BookRef::new(title_kr, title_en);
        store.ensure_registrable(&book)?;

        let registered = self
            .client
            .submit_upload(bytes, filename, &book.display_name, &book.external_key)
            .await?;

        store.register_book(registered.clone())?;
        info!("✅ 《{}》上传完成", registered.display_name);
        Ok(registered)
    }
}

/// 校验文件类型和大小
pub fn validate_upload(filename: &str, size: u64) -> Result<(), BusinessError> {
    let extension = Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase);

    if !extension.is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str())) {
        return Err(BusinessError::UnsupportedFileType {
            filename: filename.to_string(),
        });
    }

    if size > MAX_UPLOAD_BYTES {
        return Err(BusinessError::FileTooLarge {
            filename: filename.to_string(),
            size,
            limit: MAX_UPLOAD_BYTES,
        });
    }
    Ok(())
}
