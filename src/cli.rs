// cli.rs — 命令行接口定义模块
// 使用 clap 的 derive 模式定义位置参数和选项

use crate::config::DEFAULT_NASA_API_KEY;
use crate::source::Provider;
use clap::Parser; // Parser: 解析命令行参数的 trait
use std::path::PathBuf;

/// 每日图片下载工具
///
/// 从 Bing、NASA APOD、Wikipedia 或 Unsplash 获取今天的图片，
/// 保存到指定路径（缺少图片扩展名时自动补全）。
#[derive(Parser, Debug)]
#[command(name = "potd")]
#[command(version)] // 自动从 Cargo.toml 读取 version 字段
#[command(about = "Download photo of the day from various sources")]
#[command(after_help = "Examples:
  potd bing wallpaper.jpg
  potd nasa apod.jpg --api-key YOUR_NASA_KEY
  potd wikipedia wiki-potd.jpg --verbose
  potd unsplash nature.jpg --unsplash-api-key YOUR_KEY --topic nature
  potd unsplash mountain.jpg --unsplash-api-key YOUR_KEY --query \"mountain sunset\"")]
pub struct Cli {
    /// 图片来源
    #[arg(value_enum)]
    pub source: Provider,

    /// 图片保存路径
    pub target: PathBuf,

    /// NASA API Key（默认 DEMO_KEY，每小时限 30 次）
    #[arg(long, default_value = DEFAULT_NASA_API_KEY)]
    pub api_key: String,

    /// Unsplash Access Key（使用 unsplash 时必填）。申请地址 https://unsplash.com/developers
    #[arg(long)]
    pub unsplash_api_key: Option<String>,

    /// Unsplash 主题（如 nature, architecture, travel, food）
    #[arg(long)]
    pub topic: Option<String>,

    /// Unsplash 搜索关键词（如 "mountain sunset"）
    #[arg(long)]
    pub query: Option<String>,

    /// 每个请求最多尝试的次数
    #[arg(long, default_value_t = 3, value_name = "N",
          value_parser = clap::value_parser!(u32).range(1..=10))]
    pub retries: u32,

    /// 单个请求的超时时间（秒）
    #[arg(long, default_value_t = 30, value_name = "SECONDS",
          value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: u64,

    /// 输出详细的诊断信息
    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn rejects_unknown_source() {
        let result = Cli::try_parse_from(["potd", "natgeo", "out.jpg"]);
        assert!(result.is_err());
    }

    #[test]
    fn rejects_zero_retries() {
        let result = Cli::try_parse_from(["potd", "bing", "out.jpg", "--retries", "0"]);
        assert!(result.is_err());
    }

    #[test]
    fn parses_positionals_and_verbose_short_flag() {
        let cli = Cli::try_parse_from(["potd", "wikipedia", "wiki.jpg", "-v"]).unwrap();
        assert_eq!(cli.source, Provider::Wikipedia);
        assert_eq!(cli.target, PathBuf::from("wiki.jpg"));
        assert!(cli.verbose);
        assert_eq!(cli.api_key, "DEMO_KEY");
    }
}
