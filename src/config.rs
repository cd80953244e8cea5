use crate::error::{AppError, AppResult, ConfigError, FileError};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// 程序配置文件
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Webhook 根地址（不含结尾斜杠）
    pub webhook_base_url: String,
    /// 上传请求超时（秒），大文件远端处理较慢
    pub upload_timeout_secs: u64,
    /// 生成请求超时（秒）
    pub generate_timeout_secs: u64,
    /// 单次状态查询超时（秒）
    pub status_timeout_secs: u64,
    /// 轮询间隔（秒）
    pub poll_interval_secs: u64,
    /// 轮询最长等待（秒）
    pub poll_max_wait_secs: u64,
    /// 导出文件目录
    pub export_dir: String,
    /// 会话日志文件
    pub session_log_file: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            webhook_base_url: "http://localhost:5678/webhook".to_string(),
            upload_timeout_secs: 1200,
            generate_timeout_secs: 600,
            status_timeout_secs: 15,
            poll_interval_secs: 3,
            poll_max_wait_secs: 600,
            export_dir: "exports".to_string(),
            session_log_file: "session.log".to_string(),
            verbose_logging: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// 先读取 TOML 配置文件（不存在则使用默认值），再应用环境变量覆盖
    pub fn load(path: Option<&Path>) -> AppResult<Self> {
        let config = match path {
            Some(path) => {
                let content = std::fs::read_to_string(path)
                    .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;
                toml::from_str::<Config>(&content)
                    .map_err(|e| FileError::TomlParseFailed {
                        path: path.display().to_string(),
                        source: e,
                    })?
                    .with_env_overrides()
            }
            None => Self::from_env(),
        };

        config.validate()?;
        Ok(config)
    }

    fn with_env_overrides(self) -> Self {
        Self {
            webhook_base_url: std::env::var("WEBHOOK_BASE_URL").unwrap_or(self.webhook_base_url),
            upload_timeout_secs: std::env::var("UPLOAD_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(self.upload_timeout_secs),
            generate_timeout_secs: std::env::var("GENERATE_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(self.generate_timeout_secs),
            status_timeout_secs: std::env::var("STATUS_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(self.status_timeout_secs),
            poll_interval_secs: std::env::var("POLL_INTERVAL_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(self.poll_interval_secs),
            poll_max_wait_secs: std::env::var("POLL_MAX_WAIT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(self.poll_max_wait_secs),
            export_dir: std::env::var("EXPORT_DIR").unwrap_or(self.export_dir),
            session_log_file: std::env::var("SESSION_LOG_FILE").unwrap_or(self.session_log_file),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(self.verbose_logging),
        }
    }

    /// 校验配置值
    pub fn validate(&self) -> Result<(), ConfigError> {
        let durations = [
            ("upload_timeout_secs", self.upload_timeout_secs),
            ("generate_timeout_secs", self.generate_timeout_secs),
            ("status_timeout_secs", self.status_timeout_secs),
            ("poll_interval_secs", self.poll_interval_secs),
            ("poll_max_wait_secs", self.poll_max_wait_secs),
        ];
        for (field, value) in durations {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    reason: "必须大于 0".to_string(),
                });
            }
        }
        if self.webhook_base_url.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "webhook_base_url".to_string(),
                reason: "不能为空".to_string(),
            });
        }
        Ok(())
    }

    pub fn upload_timeout(&self) -> Duration {
        Duration::from_secs(self.upload_timeout_secs)
    }

    pub fn generate_timeout(&self) -> Duration {
        Duration::from_secs(self.generate_timeout_secs)
    }

    pub fn status_timeout(&self) -> Duration {
        Duration::from_secs(self.status_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn poll_max_wait(&self) -> Duration {
        Duration::from_secs(self.poll_max_wait_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_matches_webhook_budgets() {
        let config = Config::default();
        assert_eq!(config.upload_timeout(), Duration::from_secs(1200));
        assert_eq!(config.poll_interval(), Duration::from_secs(3));
        assert_eq!(config.poll_max_wait(), Duration::from_secs(600));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_toml_partial_override() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "poll_interval_secs = 5\nexport_dir = \"out\"").unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.poll_interval_secs, 5);
        assert_eq!(config.export_dir, "out");
        assert_eq!(config.status_timeout_secs, 15);
    }

    #[test]
    fn test_load_without_file_reads_env() {
        assert_eq!(Config::load(None).unwrap(), Config::from_env());
    }

    #[test]
    fn test_load_rejects_invalid_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "poll_interval_secs = \"soon\"").unwrap();

        assert!(matches!(
            Config::load(Some(file.path())),
            Err(AppError::File(FileError::TomlParseFailed { .. }))
        ));
    }

    #[test]
    fn test_zero_interval_rejected() {
        let config = Config {
            poll_interval_secs: 0,
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "poll_interval_secs"
        ));
    }
}
