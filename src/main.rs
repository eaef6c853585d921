// main.rs — 程序入口
// 负责初始化运行时、解析命令行参数、分发到图源，并把错误映射为退出码

mod cli; // 声明 cli 模块，对应 src/cli.rs
mod config;
mod error;
mod http;
mod logging;
mod saver;
mod source;

// 初始化多语言支持，嵌入 locales 目录下的所有翻译
rust_i18n::i18n!("locales");

use clap::Parser; // 引入 Parser trait 的 parse() 方法
use cli::Cli;
use config::AppConfig;
use error::PotdError;
use http::{Fetcher, ReqwestTransport};
use rust_i18n::t; // 引入翻译宏
use source::Provider;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

const UNSPLASH_DEVELOPERS_URL: &str = "https://unsplash.com/developers";

/// 单线程运行时即可：所有请求都是顺序执行的
#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // 自动检测系统语言并设置
    let locale = std::env::var("LANG").unwrap_or_else(|_| "en".to_string());
    if locale.starts_with("zh") {
        rust_i18n::set_locale("zh-CN");
    } else {
        rust_i18n::set_locale("en");
    }

    let cli = Cli::parse();
    logging::init_logging();
    let config = AppConfig::from_cli(&cli);

    // Ctrl-C 时直接丢弃下载任务；文件先写 .part 再重命名，目标路径不会残缺
    // 信号监听注册失败（Err）时该分支被禁用，继续等待下载完成
    tokio::select! {
        result = run(&config) => finish(result, &mut std::io::stderr()),
        Ok(()) = tokio::signal::ctrl_c() => {
            println!("\n{}", t!("cancelled"));
            ExitCode::FAILURE
        }
    }
}

/// 把运行结果映射为退出码，失败信息写入 `stderr`
fn finish(result: Result<PathBuf, PotdError>, stderr: &mut impl Write) -> ExitCode {
    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err, stderr);
            ExitCode::FAILURE
        }
    }
}

/// 创建图源（前置条件检查在任何网络请求之前）并完成下载
async fn run(config: &AppConfig) -> Result<PathBuf, PotdError> {
    let source = source::build_source(config.provider, &config.source, &config.http)?;

    let transport = ReqwestTransport::new(&config.http)?;
    let fetcher = Fetcher::new(Arc::new(transport), &config.http, config.verbose);

    source::download(source.as_ref(), &fetcher, &config.target).await
}

/// 把错误打印到 stderr，每种失败一行（缺 Key 时额外给出申请地址）
fn report(err: &PotdError, out: &mut impl Write) {
    // stderr 写失败时没有更好的去处，忽略
    let _ = match err {
        PotdError::MissingCredential {
            provider: Provider::Unsplash,
        } => writeln!(out, "{}", t!("error_unsplash_key_required")).and_then(|_| {
            writeln!(out, "{}", t!("unsplash_key_hint", url => UNSPLASH_DEVELOPERS_URL))
        }),
        _ => writeln!(out, "{}", t!("error_prefix", message => err)),
    };
}
