// source/mod.rs — 图源模块入口
// 定义所有图源（Bing、NASA、Wikipedia、Unsplash）必须实现的通用 Trait
pub mod bing;
pub mod nasa;
pub mod unsplash;
pub mod wikipedia;

use crate::config::HttpConfig;
use crate::error::PotdError;
use crate::http::Fetcher;
use crate::saver;
use async_trait::async_trait; // 异步 Trait 支持宏
use serde::de::DeserializeOwned;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::info;

/// 支持的图源
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Provider {
    /// Bing Photo of the Day
    Bing,
    /// NASA Astronomy Picture of the Day (APOD)
    Nasa,
    /// Wikipedia/Wikimedia Commons Picture of the Day
    Wikipedia,
    /// Unsplash random photos
    Unsplash,
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Provider::Bing => "Bing",
            Provider::Nasa => "NASA APOD",
            Provider::Wikipedia => "Wikipedia",
            Provider::Unsplash => "Unsplash",
        };
        f.write_str(name)
    }
}

/// 各图源需要的命令行参数
#[derive(Debug, Clone, Default)]
pub struct SourceOptions {
    pub nasa_api_key: String,
    pub unsplash_access_key: Option<String>,
    pub topic: Option<String>,
    pub query: Option<String>,
}

/// 统一的每日图片信息
/// 不论来自哪个图源，都转换成这个结构体供保存流程使用
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhotoOfTheDay {
    /// 图片的直接下载 URL（非空）
    pub url: String,
    pub title: Option<String>,
    /// 作者或版权信息
    pub author: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
    /// 下载图片时需要附加的请求头
    pub download_headers: Vec<(String, String)>,
}

/// 图源的抽象 Trait
#[async_trait]
pub trait PhotoSource: Send + Sync {
    fn provider(&self) -> Provider;

    /// 请求图源的元数据接口，解析出今天的图片
    async fn resolve(&self, fetcher: &Fetcher) -> Result<PhotoOfTheDay, PotdError>;
}

/// 把响应体解析为图源的响应结构
pub(crate) fn parse_json<T: DeserializeOwned>(provider: Provider, body: &[u8]) -> Result<T, PotdError> {
    serde_json::from_slice(body).map_err(|source| PotdError::InvalidResponse { provider, source })
}

/// 过滤掉空字符串，空 URL 与缺失等价
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// 按 100 个字符截断描述，日志里不刷屏
fn truncate_description(text: &str) -> String {
    const LIMIT: usize = 100;
    match text.char_indices().nth(LIMIT) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

fn log_photo(photo: &PhotoOfTheDay) {
    if let Some(title) = &photo.title {
        info!("Title: {title}");
    }
    if let Some(date) = &photo.date {
        info!("Date: {date}");
    }
    if let Some(author) = &photo.author {
        info!("By: {author}");
    }
    if let Some(description) = &photo.description {
        info!("Description: {}", truncate_description(description));
    }
}

/// 根据选项创建图源；Unsplash 缺少 Key 时直接失败，不发任何请求
pub fn build_source(
    provider: Provider,
    options: &SourceOptions,
    http: &HttpConfig,
) -> Result<Box<dyn PhotoSource>, PotdError> {
    let source: Box<dyn PhotoSource> = match provider {
        Provider::Bing => Box::new(bing::BingSource::new()),
        Provider::Nasa => Box::new(nasa::NasaSource::new(options.nasa_api_key.clone())),
        Provider::Wikipedia => {
            Box::new(wikipedia::WikipediaSource::today(http.user_agent.clone()))
        }
        Provider::Unsplash => {
            let access_key = non_empty(options.unsplash_access_key.clone())
                .ok_or(PotdError::MissingCredential { provider })?;
            Box::new(unsplash::UnsplashSource::new(
                access_key,
                options.topic.clone(),
                options.query.clone(),
            ))
        }
    };
    Ok(source)
}

/// 完整流程：解析图源 -> 下载图片 -> 保存到目标路径
pub async fn download(
    source: &dyn PhotoSource,
    fetcher: &Fetcher,
    target: &Path,
) -> Result<PathBuf, PotdError> {
    if fetcher.verbose() {
        info!("Fetching {} photo of the day", source.provider());
    }

    let photo = source.resolve(fetcher).await?;
    if fetcher.verbose() {
        log_photo(&photo);
    }

    saver::save(fetcher, &photo.url, target, &photo.download_headers).await
}
