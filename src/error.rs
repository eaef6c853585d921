// error.rs — 错误类型模块
// 网络层与各图源的失败统一在这里分类，main 是唯一的错误出口

use crate::source::Provider;
use std::path::PathBuf;
use thiserror::Error;

/// HTTP 层的失败：传输错误或非 2xx 状态码
///
/// 不直接包装 `reqwest::Error`，这样测试中的模拟传输层也能构造它
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// 连接、超时、读取响应体等传输层失败
    #[error("request to {url} failed: {message}")]
    Request { url: String, message: String },

    /// 服务端返回了非 2xx 状态码
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
}

/// 一次下载流程中可能出现的全部错误
#[derive(Debug, Error)]
pub enum PotdError {
    /// 图源需要 API Key 但调用方没有提供（在任何网络请求之前检查）
    #[error("{provider} API key is required")]
    MissingCredential { provider: Provider },

    /// 响应中没有任何图片条目
    #[error("No images found in {0} response")]
    NoImageFound(Provider),

    /// 有图片条目，但找不到可用的图片 URL
    #[error("No image URL found in {0} response")]
    MissingImageUrl(Provider),

    /// NASA APOD 今天发布的不是图片（通常是视频）
    #[error("Today's APOD is not an image, it's a {media_type}")]
    NotAnImage { media_type: String },

    /// 响应体不是预期的 JSON 结构
    #[error("Invalid {provider} response: {source}")]
    InvalidResponse {
        provider: Provider,
        #[source]
        source: serde_json::Error,
    },

    /// 重试耗尽后的最后一次网络错误
    #[error("fetch failed: {0}")]
    Fetch(#[from] TransportError),

    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// HTTP 客户端构建失败（TLS 后端初始化等）
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}
