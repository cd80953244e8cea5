use anyhow::Result;
use book_question_gen::utils::logging;
use book_question_gen::{App, Config};
use clap::Parser;
use std::path::PathBuf;

/// 读书题目生成器（交互模式）
#[derive(Debug, Parser)]
#[command(name = "book-question-gen", version, about)]
struct Cli {
    /// TOML 配置文件
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// 显示详细日志
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 加载配置
    let mut config = Config::load(cli.config.as_deref())?;
    config.verbose_logging |= cli.verbose;

    // 初始化日志
    logging::init(config.verbose_logging);

    // 初始化并运行应用
    App::initialize(config)?.run().await?;

    Ok(())
}
