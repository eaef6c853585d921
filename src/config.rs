// config.rs — 运行配置模块
// 不读配置文件、不读环境变量：所有设置都来自命令行参数，
// 启动时组装一次，之后以引用的形式传给各个组件

use crate::cli::Cli;
use crate::source::{Provider, SourceOptions};
use std::path::PathBuf;
use std::time::Duration;

/// 默认的 NASA API Key（共享演示 Key，每小时 30 次请求）
pub const DEFAULT_NASA_API_KEY: &str = "DEMO_KEY";

/// 描述性 User-Agent，Wikimedia 要求所有客户端都带上
pub const USER_AGENT: &str = concat!(
    env!("CARGO_PKG_NAME"),
    "/",
    env!("CARGO_PKG_VERSION"),
    " (photo-of-the-day downloader)"
);

/// HTTP 相关设置
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// 每个请求最多尝试的次数（至少 1 次）
    pub max_retries: u32,
    /// 单个请求的超时时间
    pub timeout: Duration,
    /// 需要时附加的 User-Agent
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            timeout: Duration::from_secs(30),
            user_agent: USER_AGENT.to_string(),
        }
    }
}

/// 一次运行的完整配置
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// 是否输出诊断日志（取代全局的 verbose 开关）
    pub verbose: bool,
    pub http: HttpConfig,
    /// 选中的图源
    pub provider: Provider,
    /// 目标保存路径（扩展名可能在保存时被修正）
    pub target: PathBuf,
    /// 图源相关的参数（API Key、Unsplash 的 topic/query）
    pub source: SourceOptions,
}

impl AppConfig {
    /// 从解析后的命令行参数组装配置
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            verbose: cli.verbose,
            http: HttpConfig {
                max_retries: cli.retries.max(1),
                timeout: Duration::from_secs(cli.timeout),
                ..HttpConfig::default()
            },
            provider: cli.source,
            target: cli.target.clone(),
            source: SourceOptions {
                nasa_api_key: cli.api_key.clone(),
                unsplash_access_key: cli.unsplash_api_key.clone(),
                topic: cli.topic.clone(),
                query: cli.query.clone(),
            },
        }
    }
}
