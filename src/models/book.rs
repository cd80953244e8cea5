use serde::{Deserialize, Serialize};

/// 已上传的书籍
///
/// `display_name` 是给人看的标题，`external_key` 是 webhook 侧的标识。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRef {
    pub display_name: String,
    pub external_key: String,
}

impl BookRef {
    /// 创建书籍引用；未提供外部标识（或为空白）时由显示名推导
    pub fn new(display_name: impl Into<String>, external_key: Option<&str>) -> Self {
        let display_name = display_name.into().trim().to_string();
        let external_key = match external_key.map(str::trim) {
            Some(key) if !key.is_empty() => key.to_string(),
            _ => derive_external_key(&display_name),
        };
        Self {
            display_name,
            external_key,
        }
    }
}

impl std::fmt::Display for BookRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.display_name, self.external_key)
    }
}

/// 由显示名推导外部标识：小写，空格替换为下划线
pub fn derive_external_key(display_name: &str) -> String {
    display_name.replace(' ', "_").to_lowercase()
}

/// 异步任务句柄
///
/// 不实现 Clone：一个句柄只交给轮询器消费一次。
#[derive(Debug, PartialEq, Eq)]
pub struct JobHandle {
    job_id: String,
}

impl JobHandle {
    pub fn new(job_id: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
        }
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }
}

impl std::fmt::Display for JobHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "job#{}", self.job_id)
    }
}
