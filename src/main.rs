use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use dendro_config::{AppConfig, LogLevel, OutputFormat};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod app;

use app::Application;

#[derive(Parser)]
#[command(name = "dendro")]
#[command(about = "Dendro 科学数据处理门户客户端")]
#[command(version = "0.1.0")]
struct Cli {
    /// 配置文件路径
    #[arg(short, long)]
    config: Option<String>,

    /// 日志级别，覆盖配置文件
    #[arg(short = 'l', long)]
    log_level: Option<LogLevel>,

    /// 日志格式，覆盖配置文件
    #[arg(long)]
    log_format: Option<OutputFormat>,

    /// 不读写本地存储
    #[arg(long)]
    ephemeral: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 作业查看与导出
    #[command(subcommand)]
    Job(JobCommands),
    /// 分拣结果分析
    #[command(subcommand)]
    Analysis(AnalysisCommands),
    /// 最近访问的项目
    #[command(subcommand)]
    Recent(RecentCommands),
    /// 项目设置
    #[command(subcommand)]
    Project(ProjectCommands),
}

#[derive(Subcommand)]
enum JobCommands {
    /// 显示作业详情
    Show {
        /// 作业ID
        job_id: String,
    },
    /// 显示作业控制台输出
    Console {
        /// 作业ID
        job_id: String,
    },
    /// 将作业导出为JSON文件
    Export(ExportArgs),
}

#[derive(Args)]
struct ExportArgs {
    /// 作业ID
    job_id: String,
    /// 输出目录
    #[arg(short, long, default_value = ".")]
    dir: PathBuf,
}

#[derive(Subcommand)]
enum AnalysisCommands {
    /// 查看或准备分拣文件的分析作业
    Prepare(PrepareArgs),
}

#[derive(Args)]
struct PrepareArgs {
    /// 项目ID
    project_id: String,
    /// 分拣结果文件名
    sorting_file: String,
    /// 没有可复用作业时提交新作业
    #[arg(long)]
    submit: bool,
}

#[derive(Subcommand)]
enum RecentCommands {
    /// 列出最近访问的项目
    List {
        /// 只显示这些可访问的项目
        #[arg(long, value_delimiter = ',')]
        accessible: Option<Vec<String>>,
    },
}

#[derive(Subcommand)]
enum ProjectCommands {
    /// 修改项目描述
    SetDescription {
        /// 项目ID
        project_id: String,
        /// 新描述
        description: String,
    },
    /// 修改项目分析源地址
    SetAnalysisUrl {
        /// 项目ID
        project_id: String,
        /// http(s) 地址
        url: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref()).with_context(|| {
        format!("加载配置失败: {}", cli.config.as_deref().unwrap_or("<默认路径>"))
    })?;

    init_logging(
        cli.log_level.unwrap_or(config.logging.level),
        cli.log_format.unwrap_or(config.logging.format),
    )?;
    info!("Dendro API: {}", config.api.base_url);

    let app = Application::new(config, cli.ephemeral)?;

    match cli.command {
        Commands::Job(JobCommands::Show { job_id }) => app.show_job(&job_id).await,
        Commands::Job(JobCommands::Console { job_id }) => app.show_console(&job_id).await,
        Commands::Job(JobCommands::Export(args)) => app.export_job(&args.job_id, &args.dir).await,
        Commands::Analysis(AnalysisCommands::Prepare(args)) => {
            app.prepare_analysis(&args.project_id, &args.sorting_file, args.submit)
                .await
        }
        Commands::Recent(RecentCommands::List { accessible }) => app.list_recent(accessible),
        Commands::Project(ProjectCommands::SetDescription {
            project_id,
            description,
        }) => app.set_description(&project_id, &description).await,
        Commands::Project(ProjectCommands::SetAnalysisUrl { project_id, url }) => {
            app.set_analysis_url(&project_id, &url).await
        }
    }
}

/// 初始化日志系统，日志写到 stderr，stdout 留给命令输出
fn init_logging(log_level: LogLevel, log_format: OutputFormat) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));

    let registry = tracing_subscriber::registry().with(env_filter);

    match log_format {
        OutputFormat::Json => {
            registry
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .try_init()
                .context("初始化JSON日志格式失败")?;
        }
        OutputFormat::Pretty => {
            registry
                .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
                .try_init()
                .context("初始化Pretty日志格式失败")?;
        }
    }

    Ok(())
}
