use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// Webhook 调用错误
    #[error("API错误: {0}")]
    Api(#[from] ApiError),
    /// 业务逻辑错误
    #[error("业务错误: {0}")]
    Business(#[from] BusinessError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 导出错误
    #[error("导出错误: {0}")]
    Export(#[from] ExportError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// Webhook 调用错误
///
/// 每个变体都是当前操作的终止状态，不会自动重新提交。
#[derive(Debug, Error)]
pub enum ApiError {
    /// 网络请求失败或单次请求超时
    #[error("网络请求失败 ({endpoint}): {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    /// 服务端返回非成功状态码，message 为服务端原文
    #[error("服务端返回错误 ({endpoint}, HTTP {status}): {message}")]
    Server {
        endpoint: String,
        status: u16,
        message: String,
    },
    /// 响应不符合协议（如 202 缺少 jobId）
    #[error("响应协议错误 ({endpoint}): {detail}")]
    Protocol { endpoint: String, detail: String },
    /// 任务完成但没有生成任何题目
    #[error("生成结果为空")]
    EmptyResult,
    /// 返回内容无法识别，或远端自身解析失败
    #[error("题目解析失败，原始文本长度: {} 字符", .raw_text.chars().count())]
    ParseFailure { raw_text: String },
    /// 轮询预算耗尽
    #[error("等待时间超过 {waited_secs} 秒，请稍后重试")]
    Timeout { waited_secs: u64 },
    /// 轮询预算耗尽且期间没有一次成功的状态查询
    #[error("等待 {waited_secs} 秒内状态查询全部失败，请稍后重试 (最后错误: {last_error})")]
    TransientErrorExhausted { waited_secs: u64, last_error: String },
}

impl ApiError {
    /// 是否属于"稍后重试"类错误
    pub fn is_retry_later(&self) -> bool {
        matches!(
            self,
            ApiError::Timeout { .. } | ApiError::TransientErrorExhausted { .. }
        )
    }
}

/// 业务逻辑错误
#[derive(Debug, Error)]
pub enum BusinessError {
    /// 书籍尚未上传
    #[error("书籍尚未上传: {display_name}")]
    BookNotRegistered { display_name: String },
    /// 不同的书映射到了同一个外部标识
    #[error("外部标识 '{external_key}' 已被《{existing}》占用")]
    ExternalKeyConflict {
        external_key: String,
        existing: String,
    },
    /// 题目数量超出范围
    #[error("题目数量 {count} 超出范围 [{min}, {max}]")]
    InvalidQuestionCount { count: u32, min: u32, max: u32 },
    /// 不支持的文件类型
    #[error("不支持的文件类型: {filename} (仅支持 pdf / docx)")]
    UnsupportedFileType { filename: String },
    /// 文件过大
    #[error("文件过大: {filename} ({size} 字节, 上限 {limit} 字节)")]
    FileTooLarge {
        filename: String,
        size: u64,
        limit: u64,
    },
    /// 书名为空
    #[error("书名不能为空")]
    EmptyTitle,
    /// 当前没有可用的题目
    #[error("当前没有已生成的题目")]
    NoCurrentQuestions,
    /// 无法识别的选项
    #[error("无法识别的{kind}: {value}")]
    UnknownOption { kind: &'static str, value: String },
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// 导出错误
#[derive(Debug, Error)]
pub enum ExportError {
    /// 题目集为空
    #[error("题目集为空，无法导出")]
    EmptySet,
    /// Excel 编码失败
    #[error("Excel 编码失败: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
    /// CSV 编码失败
    #[error("CSV 编码失败: {0}")]
    Csv(#[from] csv::Error),
    /// 缓冲区写出失败
    #[error("CSV 缓冲区写出失败: {0}")]
    Buffer(String),
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 配置值无效
    #[error("配置项 {field} 无效: {reason}")]
    InvalidValue { field: String, reason: String },
}

// ========== 从常见错误类型转换 ==========

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: String::new(),
            source: err,
        })
    }
}

impl From<rust_xlsxwriter::XlsxError> for AppError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        AppError::Export(ExportError::Xlsx(err))
    }
}

impl From<csv::Error> for AppError {
    fn from(err: csv::Error) -> Self {
        AppError::Export(ExportError::Csv(err))
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建网络请求失败错误
    pub fn transport(endpoint: impl Into<String>, source: reqwest::Error) -> Self {
        AppError::Api(ApiError::Transport {
            endpoint: endpoint.into(),
            source,
        })
    }

    /// 创建文件读取错误
    pub fn file_read_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source,
        })
    }

    /// 创建文件写入错误
    pub fn file_write_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File(FileError::WriteFailed {
            path: path.into(),
            source,
        })
    }

    /// 返回内部的 ApiError（如果有）
    pub fn as_api(&self) -> Option<&ApiError> {
        match self {
            AppError::Api(e) => Some(e),
            _ => None,
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
