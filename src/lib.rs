//! # Book Question Gen
//!
//! 读书题目生成器：把书籍上传到远端工作流，生成选择题，查看并导出。
//!
//! ## 架构设计
//!
//! ### ① 客户端层（Clients）
//! - `clients/` - 只负责和 webhook 通信，不持有会话状态
//! - `WebhookClient` - 上传 / 生成 / 查询任务状态
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"
//! - `Poller` - 等待异步任务结束
//! - `normalizer` - 把各种形状的响应统一成题目列表
//! - `exporter` - 导出 xlsx / csv
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 一次上传或一次生成的完整流程
//! - `UploadFlow` - 校验 → 上传 → 登记
//! - `GenerationFlow` - 提交 → 轮询 → 归一化 → 写入会话
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/` - 交互命令循环，持有 `SessionStore`
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod session;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::WebhookClient;
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{BookRef, Category, DifficultyRange, QuestionRecord, QuestionSet};
pub use orchestrator::App;
pub use services::{ExportFormat, Poller};
pub use session::SessionStore;
pub use workflow::{GenerationFlow, UploadFlow};
