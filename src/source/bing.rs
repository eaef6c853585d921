// bing.rs — Bing 每日图片
// 图片归档接口只返回 urlbase，需要自己拼出 1920x1080 的完整地址

use super::{PhotoOfTheDay, PhotoSource, Provider, non_empty, parse_json};
use crate::error::PotdError;
use crate::http::{FetchRequest, Fetcher};
use async_trait::async_trait;
use serde::Deserialize;

/// 拼接在 urlbase 之后的分辨率后缀
const RESOLUTION_SUFFIX: &str = "_1920x1080.jpg";

/// HPImageArchive.aspx 返回的 JSON 根对象
#[derive(Deserialize, Debug, Default)]
pub struct ArchiveResponse {
    /// 缺失或为 null 时都视为没有图片
    #[serde(default)]
    pub images: Option<Vec<ArchiveImage>>,
}

#[derive(Deserialize, Debug, Default)]
pub struct ArchiveImage {
    /// 形如 "/th?id=OHR.Xxx_ZH-CN123"，不含域名与分辨率
    pub urlbase: Option<String>,
    pub title: Option<String>,
    pub copyright: Option<String>,
}

pub struct BingSource {
    base_url: String,
    market: String,
}

impl BingSource {
    pub fn new() -> Self {
        Self {
            base_url: String::from("https://www.bing.com"),
            market: String::from("en-US"),
        }
    }

    #[cfg(test)]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::new()
        }
    }

    fn request(&self) -> FetchRequest {
        FetchRequest::new(format!("{}/HPImageArchive.aspx", self.base_url))
            .query("format", "js")
            .query("idx", "0")
            .query("n", "1")
            .query("mkt", self.market.as_str())
    }

    /// 取第一张图片，拼出完整的图片地址
    pub fn extract(&self, response: ArchiveResponse) -> Result<PhotoOfTheDay, PotdError> {
        let image = response
            .images
            .unwrap_or_default()
            .into_iter()
            .next()
            .ok_or(PotdError::NoImageFound(Provider::Bing))?;

        let urlbase =
            non_empty(image.urlbase).ok_or(PotdError::MissingImageUrl(Provider::Bing))?;

        Ok(PhotoOfTheDay {
            url: format!("{}{}{}", self.base_url, urlbase, RESOLUTION_SUFFIX),
            title: image.title,
            author: image.copyright,
            ..PhotoOfTheDay::default()
        })
    }
}

impl Default for BingSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PhotoSource for BingSource {
    fn provider(&self) -> Provider {
        Provider::Bing
    }

    async fn resolve(&self, fetcher: &Fetcher) -> Result<PhotoOfTheDay, PotdError> {
        let response = fetcher.fetch(&self.request()).await?;
        let archive: ArchiveResponse = parse_json(Provider::Bing, &response.body)?;
        self.extract(archive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::testing::{MockTransport, fetcher};
    use crate::source::download;

    #[test]
    fn builds_full_resolution_url() {
        let body = br#"{"images":[{"urlbase":"/th?id=OHR.Test","title":"T","copyright":"C"}]}"#;
        let archive: ArchiveResponse = parse_json(Provider::Bing, body).unwrap();

        let photo = BingSource::new().extract(archive).unwrap();

        assert_eq!(photo.url, "https://www.bing.com/th?id=OHR.Test_1920x1080.jpg");
        assert_eq!(photo.title.as_deref(), Some("T"));
        assert_eq!(photo.author.as_deref(), Some("C"));
    }

    #[test]
    fn missing_urlbase_is_reported() {
        let archive: ArchiveResponse =
            parse_json(Provider::Bing, br#"{"images":[{"title":"T"}]}"#).unwrap();
        let err = BingSource::new().extract(archive).unwrap_err();
        assert!(matches!(err, PotdError::MissingImageUrl(Provider::Bing)));
    }

    #[test]
    fn null_or_missing_images_mean_no_image() {
        for body in [r#"{"images":null}"#, r#"{}"#] {
            let archive: ArchiveResponse = parse_json(Provider::Bing, body.as_bytes()).unwrap();
            let err = BingSource::new().extract(archive).unwrap_err();
            assert!(matches!(err, PotdError::NoImageFound(Provider::Bing)));
        }
    }

    #[test]
    fn request_targets_archive_endpoint() {
        let request = BingSource::new().request();
        assert_eq!(request.url, "https://www.bing.com/HPImageArchive.aspx");
        assert!(request.query.contains(&("mkt".to_string(), "en-US".to_string())));
        assert!(request.query.contains(&("format".to_string(), "js".to_string())));
    }

    #[tokio::test]
    async fn empty_images_fail_without_downloading() {
        let dir = tempfile::tempdir().unwrap();
        let transport = MockTransport::new();
        transport.push_json(r#"{"images":[]}"#);
        let (fetcher, _) = fetcher(&transport, 3);

        let err = download(&BingSource::new(), &fetcher, &dir.path().join("out.jpg"))
            .await
            .unwrap_err();

        assert!(matches!(err, PotdError::NoImageFound(Provider::Bing)));
        assert_eq!(transport.requests().len(), 1);
        assert!(!dir.path().join("out.jpg").exists());
    }

    #[tokio::test]
    async fn downloads_todays_image_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.jpg");
        let transport = MockTransport::new();
        transport
            .push_json(r#"{"images":[{"urlbase":"/th?id=OHR.Test","title":"T","copyright":"C"}]}"#)
            .push_image(b"bing-image-bytes", Some("image/jpeg"));
        let (fetcher, _) = fetcher(&transport, 3);

        let written = download(&BingSource::new(), &fetcher, &target).await.unwrap();

        assert_eq!(written, target);
        assert_eq!(std::fs::read(&target).unwrap(), b"bing-image-bytes");
        let requests = transport.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(
            requests[1].url,
            "https://www.bing.com/th?id=OHR.Test_1920x1080.jpg"
        );
    }

    #[tokio::test]
    async fn works_against_a_live_http_server() {
        let mut server = mockito::Server::new_async().await;
        let _archive = server
            .mock("GET", "/HPImageArchive.aspx")
            .match_query(mockito::Matcher::UrlEncoded("mkt".into(), "en-US".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"images":[{"urlbase":"/th?id=OHR.Live"}]}"#)
            .create_async()
            .await;
        let _image = server
            .mock("GET", "/th")
            .match_query(mockito::Matcher::UrlEncoded(
                "id".into(),
                "OHR.Live_1920x1080.jpg".into(),
            ))
            .with_status(200)
            .with_header("content-type", "image/jpeg")
            .with_body("live-bytes")
            .create_async()
            .await;

        let config = crate::config::HttpConfig::default();
        let transport = crate::http::ReqwestTransport::new(&config).unwrap();
        let fetcher = Fetcher::new(std::sync::Arc::new(transport), &config, false);
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("live");

        let source = BingSource::with_base_url(server.url());
        let written = download(&source, &fetcher, &target).await.unwrap();

        assert_eq!(written, dir.path().join("live.jpg"));
        assert_eq!(std::fs::read(&written).unwrap(), b"live-bytes");
    }
}
