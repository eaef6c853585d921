// unsplash.rs — Unsplash 随机图片
// 使用官方 API 的 /photos/random，强制横向构图；可选 topic 与 query 过滤

use super::{PhotoOfTheDay, PhotoSource, Provider, non_empty, parse_json};
use crate::error::PotdError;
use crate::http::{FetchRequest, Fetcher};
use async_trait::async_trait;
use serde::Deserialize; // 反序列化 trait，用于将 JSON 转为 Rust 结构体
use tracing::info;

/// 单张图片的数据结构
#[derive(Deserialize, Debug, Default)]
pub struct Photo {
    /// 各尺寸图片 URL 集合
    pub urls: Option<PhotoUrls>,
    pub user: Option<PhotoUser>,
    pub description: Option<String>,
    pub alt_description: Option<String>,
}

/// 图片 URL 集合
#[derive(Deserialize, Debug, Default)]
pub struct PhotoUrls {
    /// 最高质量图片（带 q=80&fm=jpg）
    pub full: Option<String>,
    /// 1080 宽的常规尺寸
    pub regular: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct PhotoUser {
    pub name: Option<String>,
}

/// Unsplash API 客户端
///
/// Access Key 通过 `Authorization: Client-ID <key>` header 传递。
pub struct UnsplashSource {
    /// API 基础 URL
    base_url: String,
    /// Unsplash Access Key（必填，非空）
    access_key: String,
    topic: Option<String>,
    query: Option<String>,
}

impl UnsplashSource {
    pub fn new(access_key: String, topic: Option<String>, query: Option<String>) -> Self {
        Self {
            base_url: String::from("https://api.unsplash.com"),
            access_key,
            // 空字符串的 topic/query 不发送
            topic: non_empty(topic),
            query: non_empty(query),
        }
    }

    /// Unsplash 使用 "Client-ID <key>" 格式，而非 Bearer token
    fn auth_header(&self) -> String {
        format!("Client-ID {}", self.access_key)
    }

    fn request(&self) -> FetchRequest {
        let mut request = FetchRequest::new(format!("{}/photos/random", self.base_url))
            .header("Authorization", self.auth_header())
            .query("orientation", "landscape"); // 壁纸场景优先横向

        if let Some(topic) = &self.topic {
            request = request.query("topics", topic.as_str());
        }
        if let Some(query) = &self.query {
            request = request.query("query", query.as_str());
        }
        request
    }

    pub fn extract(photo: Photo) -> Result<PhotoOfTheDay, PotdError> {
        let urls = photo.urls.unwrap_or_default();
        let url = non_empty(urls.full)
            .or_else(|| non_empty(urls.regular))
            .ok_or(PotdError::MissingImageUrl(Provider::Unsplash))?;

        Ok(PhotoOfTheDay {
            url,
            author: photo.user.and_then(|user| user.name),
            description: photo.description.or(photo.alt_description),
            ..PhotoOfTheDay::default()
        })
    }
}

#[async_trait]
impl PhotoSource for UnsplashSource {
    fn provider(&self) -> Provider {
        Provider::Unsplash
    }

    async fn resolve(&self, fetcher: &Fetcher) -> Result<PhotoOfTheDay, PotdError> {
        if fetcher.verbose() {
            if let Some(topic) = &self.topic {
                info!("Using topic: {topic}");
            }
            if let Some(query) = &self.query {
                info!("Using query: {query}");
            }
        }

        let response = fetcher.fetch(&self.request()).await?;
        let photo: Photo = parse_json(Provider::Unsplash, &response.body)?;
        Self::extract(photo)
    }
}
