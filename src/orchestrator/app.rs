//! 交互式应用 - 编排层
//!
//! ## 职责
//!
//! 1. **应用初始化**：会话日志、webhook 客户端、上传 / 生成流程
//! 2. **命令循环**：逐行读取 stdin，解析并分派命令
//! 3. **会话所有者**：唯一持有 `SessionStore`，按引用交给各流程
//! 4. **结果呈现**：把流程结果和错误渲染成文本
//!
//! 不做具体业务判断，校验和状态变更都在 workflow 层。

use crate::clients::WebhookClient;
use crate::config::Config;
use crate::error::{AppResult, BusinessError};
use crate::orchestrator::commands::{self, Command};
use crate::orchestrator::render;
use crate::models::QuestionSet;
use crate::services::{exporter, Poller};
use crate::session::SessionStore;
use crate::utils::logging::{append_log_line, init_log_file, log_startup};
use crate::workflow::{GenerationFlow, GenerationSource, UploadFlow};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{info, warn};

const PROMPT: &str = "📚 > ";

/// 应用主结构
pub struct App {
    config: Config,
    store: SessionStore,
    upload_flow: UploadFlow,
    generation_flow: GenerationFlow,
}

impl App {
    /// 初始化应用
    pub fn initialize(config: Config) -> AppResult<Self> {
        init_log_file(&config.session_log_file)?;
        log_startup(&config);

        let client = WebhookClient::new(&config)?;
        let poller = Poller::from_config(&config);

        Ok(Self {
            upload_flow: UploadFlow::new(client.clone()),
            generation_flow: GenerationFlow::new(client, poller),
            store: SessionStore::new(),
            config,
        })
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// 运行命令循环，直到 quit 或输入结束
    pub async fn run(&mut self) -> AppResult<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut stdout = tokio::io::stdout();

        println!("输入 help 查看可用命令。");

        loop {
            stdout.write_all(PROMPT.as_bytes()).await?;
            stdout.flush().await?;

            let Some(line) = lines.next_line().await? else {
                break;
            };

            let command = match commands::parse_line(&line) {
                Ok(Some(command)) => command,
                Ok(None) => continue,
                Err(message) => {
                    println!("{}", message);
                    continue;
                }
            };

            match self.execute(command).await {
                Ok(Some(output)) => println!("{}", output),
                Ok(None) => break,
                Err(e) => {
                    if e.as_api().is_some_and(|api| api.is_retry_later()) {
                        warn!("⏳ 任务未在等待时间内完成");
                    }
                    self.log(&format!("失败: {}", e));
                    println!("{}", render::render_error(&e));
                }
            }
        }

        info!("👋 会话结束");
        Ok(())
    }

    /// 执行单条命令
    ///
    /// 返回要显示的文本；`Ok(None)` 表示退出。
    pub async fn execute(&mut self, command: Command) -> AppResult<Option<String>> {
        let output = match command {
            Command::Upload {
                file,
                title_kr,
                title_en,
            } => {
                let book = self
                    .upload_flow
                    .run(&mut self.store, &file, &title_kr, title_en.as_deref())
                    .await?;
                self.log(&format!("上传: {}", book));
                format!("✅ 《{}》上传完成 [{}]", book.display_name, book.external_key)
            }
            Command::Books => render::render_books(self.store.list_books()),
            Command::Generate {
                book,
                category,
                count,
                difficulty,
            } => {
                let report = self
                    .generation_flow
                    .run(&mut self.store, &book, category, count, difficulty)
                    .await?;

                let source = match &report.source {
                    GenerationSource::Immediate => "同步返回".to_string(),
                    GenerationSource::Job { job_id } => format!("任务 {}", job_id),
                };
                self.log(&format!(
                    "生成: 《{}》 {} {} 题 ({})",
                    book, category, report.record_count, source
                ));

                let mut out = format!("✅ 已生成 {} 道题目 ({})\n", report.record_count, source);
                if let Some(set) = self.store.current_questions() {
                    out.push_str(&render::render_preview(set));
                }
                out
            }
            Command::Show { all } => {
                let set = self.current()?;
                let limit = (!all).then_some(render::TABLE_ROW_LIMIT);
                render::render_table(set, limit)
            }
            Command::Stats => render::render_stats(self.current()?),
            Command::Export { format, dir } => {
                let set = self.current()?;
                let payload = exporter::export(set, format)?;
                let dir = dir.unwrap_or_else(|| PathBuf::from(&self.config.export_dir));
                let path = exporter::save_payload(&payload, &dir).await?;
                self.log(&format!("导出: {}", path.display()));
                format!("💾 已导出: {} ({} 字节)", path.display(), payload.bytes.len())
            }
            Command::Clear => {
                self.store.clear();
                self.log("清空会话");
                "🧹 会话已清空".to_string()
            }
            Command::Quit => return Ok(None),
        };

        Ok(Some(output))
    }

    fn current(&self) -> Result<&QuestionSet, BusinessError> {
        self.store
            .current_questions()
            .ok_or(BusinessError::NoCurrentQuestions)
    }

    /// 写会话日志，失败只告警
    fn log(&self, line: &str) {
        if let Err(e) = append_log_line(&self.config.session_log_file, line) {
            warn!("⚠️ 写入会话日志失败: {}", e);
        }
    }
}
