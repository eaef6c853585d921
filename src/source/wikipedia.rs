// wikipedia.rs — Wikipedia / Wikimedia Commons 每日图片
// featured 接口按日期取内容；Wikimedia 要求元数据请求和图片下载都带描述性 User-Agent

use super::{PhotoOfTheDay, PhotoSource, Provider, non_empty, parse_json};
use crate::error::PotdError;
use crate::http::{FetchRequest, Fetcher};
use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use serde::Deserialize;

/// GET /api/rest_v1/feed/featured/YYYY/MM/DD，只取每日图片部分
#[derive(Deserialize, Debug, Default)]
pub struct FeaturedResponse {
    pub image: Option<FeaturedImage>,
}

#[derive(Deserialize, Debug, Default)]
pub struct FeaturedImage {
    pub title: Option<String>,
    /// 原图信息，`source` 即完整分辨率的地址
    pub image: Option<ImageSource>,
    pub artist: Option<TextField>,
    pub description: Option<TextField>,
}

impl FeaturedImage {
    /// 空对象与缺失等价
    fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.image.is_none()
            && self.artist.is_none()
            && self.description.is_none()
    }
}

#[derive(Deserialize, Debug, Default)]
pub struct ImageSource {
    pub source: Option<String>,
}

/// 同时带 html 与纯文本的字段，这里只要纯文本
#[derive(Deserialize, Debug, Default)]
pub struct TextField {
    pub text: Option<String>,
}

pub struct WikipediaSource {
    base_url: String,
    date: NaiveDate,
    user_agent: String,
}

impl WikipediaSource {
    pub fn new(date: NaiveDate, user_agent: String) -> Self {
        Self {
            base_url: String::from("https://en.wikipedia.org"),
            date,
            user_agent,
        }
    }

    /// 使用本地日历的今天
    pub fn today(user_agent: String) -> Self {
        Self::new(Local::now().date_naive(), user_agent)
    }

    fn headers(&self) -> Vec<(String, String)> {
        vec![("User-Agent".to_string(), self.user_agent.clone())]
    }

    fn request(&self) -> FetchRequest {
        FetchRequest::new(format!(
            "{}/api/rest_v1/feed/featured/{}",
            self.base_url,
            self.date.format("%Y/%m/%d")
        ))
        .headers(&self.headers())
    }

    pub fn extract(&self, response: FeaturedResponse) -> Result<PhotoOfTheDay, PotdError> {
        let potd = response
            .image
            .filter(|image| !image.is_empty())
            .ok_or(PotdError::NoImageFound(Provider::Wikipedia))?;

        let url = non_empty(potd.image.and_then(|image| image.source))
            .ok_or(PotdError::MissingImageUrl(Provider::Wikipedia))?;

        Ok(PhotoOfTheDay {
            url,
            title: potd.title,
            author: potd.artist.and_then(|artist| artist.text),
            description: potd.description.and_then(|description| description.text),
            date: Some(self.date.to_string()),
            download_headers: self.headers(),
        })
    }
}

#[async_trait]
impl PhotoSource for WikipediaSource {
    fn provider(&self) -> Provider {
        Provider::Wikipedia
    }

    async fn resolve(&self, fetcher: &Fetcher) -> Result<PhotoOfTheDay, PotdError> {
        let response = fetcher.fetch(&self.request()).await?;
        let featured: FeaturedResponse = parse_json(Provider::Wikipedia, &response.body)?;
        self.extract(featured)
    }
}
