// logging.rs — 日志初始化
// 诊断信息输出到 stderr，RUST_LOG 可以覆盖默认过滤级别

use tracing_subscriber::EnvFilter;

/// 初始化 tracing 订阅者
///
/// 是否输出 info 级诊断由 `AppConfig::verbose` 在各组件里决定，
/// 这里只负责格式和去向
pub fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}
