//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层是交互会话的"指挥中心"：读取命令、调用流程、呈现结果。
//!
//! ## 模块划分
//!
//! ### `app` - 交互式应用
//! - 管理应用生命周期（初始化、命令循环）
//! - 唯一持有 `SessionStore`
//! - 写会话日志
//!
//! ### `commands` - 命令解析
//! - 引号感知的分词
//! - clap 子命令定义
//!
//! ### `render` - 文本渲染
//! - 书籍列表、题目表格、预览、统计
//! - 面向用户的错误提示
//!
//! ## 层次关系
//!
//! ```text
//! app (命令循环, 持有 SessionStore)
//!     ↓
//! workflow::{UploadFlow, GenerationFlow}
//!     ↓
//! services (poller / normalizer / exporter)
//!     ↓
//! clients::WebhookClient
//! ```

pub mod app;
pub mod commands;
pub mod render;

pub use app::App;
pub use commands::{parse_line, Command};
