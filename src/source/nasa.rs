// nasa.rs — NASA 每日天文图片 (APOD)
// APOD 有时发布的是视频，只有 media_type 为 image 时才下载

use super::{PhotoOfTheDay, PhotoSource, Provider, non_empty, parse_json};
use crate::error::PotdError;
use crate::http::{FetchRequest, Fetcher};
use async_trait::async_trait;
use serde::Deserialize;

/// GET /planetary/apod 返回的 JSON 对象
#[derive(Deserialize, Debug, Default)]
pub struct ApodResponse {
    /// "image" 或 "video"
    pub media_type: Option<String>,
    /// 高清图地址，可能缺失
    pub hdurl: Option<String>,
    pub url: Option<String>,
    pub title: Option<String>,
    pub date: Option<String>,
    pub copyright: Option<String>,
    pub explanation: Option<String>,
}

pub struct NasaSource {
    base_url: String,
    api_key: String,
}

impl NasaSource {
    pub fn new(api_key: String) -> Self {
        Self {
            base_url: String::from("https://api.nasa.gov"),
            api_key,
        }
    }

    fn request(&self) -> FetchRequest {
        FetchRequest::new(format!("{}/planetary/apod", self.base_url))
            .query("api_key", self.api_key.as_str())
    }

    /// 校验媒体类型，优先使用高清地址
    pub fn extract(response: ApodResponse) -> Result<PhotoOfTheDay, PotdError> {
        if response.media_type.as_deref() != Some("image") {
            return Err(PotdError::NotAnImage {
                media_type: response.media_type.unwrap_or_else(|| "unknown".to_string()),
            });
        }

        let url = non_empty(response.hdurl)
            .or_else(|| non_empty(response.url))
            .ok_or(PotdError::MissingImageUrl(Provider::Nasa))?;

        Ok(PhotoOfTheDay {
            url,
            title: response.title,
            author: response.copyright.map(|c| c.trim().to_string()),
            description: response.explanation,
            date: response.date,
            download_headers: Vec::new(),
        })
    }
}

#[async_trait]
impl PhotoSource for NasaSource {
    fn provider(&self) -> Provider {
        Provider::Nasa
    }

    async fn resolve(&self, fetcher: &Fetcher) -> Result<PhotoOfTheDay, PotdError> {
        let response = fetcher.fetch(&self.request()).await?;
        let apod: ApodResponse = parse_json(Provider::Nasa, &response.body)?;
        Self::extract(apod)
    }
}
