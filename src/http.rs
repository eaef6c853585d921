// http.rs — 带重试的 HTTP GET
// 传输层与等待策略都抽象成 trait，默认实现分别是 reqwest 和 tokio::time::sleep

use crate::config::HttpConfig;
use crate::error::TransportError;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// 一次 GET 请求的描述
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchRequest {
    pub url: String,
    /// 请求头，按添加顺序发送
    pub headers: Vec<(String, String)>,
    /// 查询参数，由传输层编码到 URL 上
    pub query: Vec<(String, String)>,
}

impl FetchRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// 批量附加请求头（下载图片时复用元数据请求的请求头）
    pub fn headers(mut self, headers: &[(String, String)]) -> Self {
        self.headers.extend_from_slice(headers);
        self
    }

    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }
}

/// 成功（2xx）的响应
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResult {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

/// 发送单个 GET 请求的传输层
///
/// 非 2xx 状态码必须以 [`TransportError::Status`] 返回
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, request: &FetchRequest) -> Result<FetchResult, TransportError>;
}

/// 重试之间的等待
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// 基于 reqwest 的传输层
pub struct ReqwestTransport {
    /// HTTP 客户端（内部有连接池，应复用）
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// 按配置创建客户端，超时作用于每一个请求
    pub fn new(config: &HttpConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, request: &FetchRequest) -> Result<FetchResult, TransportError> {
        let to_error = |e: reqwest::Error| TransportError::Request {
            url: request.url.clone(),
            message: e.to_string(),
        };

        let mut builder = self.client.get(&request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }

        let response = builder.send().await.map_err(to_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                url: request.url.clone(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let body = response.bytes().await.map_err(to_error)?.to_vec();

        Ok(FetchResult {
            status: status.as_u16(),
            content_type,
            body,
        })
    }
}

/// 第 `attempt` 次（从 0 开始）失败之后的等待时间：1s, 2s, 4s, ...
pub fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_secs(1u64 << attempt.min(16))
}

/// 带指数退避重试的请求器
pub struct Fetcher {
    transport: Arc<dyn HttpTransport>,
    sleeper: Arc<dyn Sleeper>,
    max_retries: u32,
    verbose: bool,
}

impl Fetcher {
    pub fn new(transport: Arc<dyn HttpTransport>, config: &HttpConfig, verbose: bool) -> Self {
        Self {
            transport,
            sleeper: Arc::new(TokioSleeper),
            max_retries: config.max_retries.max(1),
            verbose,
        }
    }

    /// 替换重试之间的等待策略
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }

    /// 发送 GET 请求，失败时按指数退避重试
    ///
    /// 最后一次尝试的错误原样返回给调用方
    pub async fn fetch(&self, request: &FetchRequest) -> Result<FetchResult, TransportError> {
        let mut attempt = 0;
        loop {
            if self.verbose {
                info!(
                    "Fetching {} (attempt {}/{})",
                    request.url,
                    attempt + 1,
                    self.max_retries
                );
            }

            match self.transport.get(request).await {
                Ok(result) => return Ok(result),
                Err(err) if attempt + 1 >= self.max_retries => return Err(err),
                Err(err) => {
                    if self.verbose {
                        info!("Request failed: {err}. Retrying...");
                    }
                    self.sleeper.sleep(backoff_delay(attempt)).await;
                    attempt += 1;
                }
            }
        }
    }
}

/// 测试用的模拟传输层与等待策略
#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// 按顺序返回预设响应，并记录收到的每个请求
    #[derive(Default)]
    pub struct MockTransport {
        responses: Mutex<VecDeque<Result<FetchResult, TransportError>>>,
        requests: Mutex<Vec<FetchRequest>>,
    }

    impl MockTransport {
        pub fn new() -> Arc<Self> {
            Arc::new(Self::default())
        }

        pub fn push(&self, response: Result<FetchResult, TransportError>) -> &Self {
            self.responses.lock().unwrap().push_back(response);
            self
        }

        pub fn push_json(&self, body: &str) -> &Self {
            self.push(Ok(FetchResult {
                status: 200,
                content_type: Some("application/json".to_string()),
                body: body.as_bytes().to_vec(),
            }))
        }

        pub fn push_image(&self, body: &[u8], content_type: Option<&str>) -> &Self {
            self.push(Ok(FetchResult {
                status: 200,
                content_type: content_type.map(str::to_owned),
                body: body.to_vec(),
            }))
        }

        pub fn requests(&self) -> Vec<FetchRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl HttpTransport for MockTransport {
        async fn get(&self, request: &FetchRequest) -> Result<FetchResult, TransportError> {
            self.requests.lock().unwrap().push(request.clone());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| {
                    Err(TransportError::Request {
                        url: request.url.clone(),
                        message: "no scripted response".to_string(),
                    })
                })
        }
    }

    /// 只记录等待时长，不真正等待
    #[derive(Default)]
    pub struct RecordingSleeper {
        delays: Mutex<Vec<Duration>>,
    }

    impl RecordingSleeper {
        pub fn delays(&self) -> Vec<Duration> {
            self.delays.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Sleeper for RecordingSleeper {
        async fn sleep(&self, duration: Duration) {
            self.delays.lock().unwrap().push(duration);
        }
    }

    /// 组装一个使用模拟传输层、不会真正等待的 Fetcher
    pub fn fetcher(transport: &Arc<MockTransport>, max_retries: u32) -> (Fetcher, Arc<RecordingSleeper>) {
        fetcher_with(transport, max_retries, true)
    }

    pub fn fetcher_with(
        transport: &Arc<MockTransport>,
        max_retries: u32,
        verbose: bool,
    ) -> (Fetcher, Arc<RecordingSleeper>) {
        let sleeper = Arc::new(RecordingSleeper::default());
        let config = HttpConfig {
            max_retries,
            ..HttpConfig::default()
        };
        let fetcher =
            Fetcher::new(transport.clone(), &config, verbose).with_sleeper(sleeper.clone());
        (fetcher, sleeper)
    }

    /// 把当前线程的 tracing 输出收集到内存里
    #[derive(Clone, Default)]
    pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

    impl LogCapture {
        /// 在返回的 guard 存活期间，当前线程的日志写入本对象
        pub fn install(&self) -> tracing::subscriber::DefaultGuard {
            let writer = self.clone();
            let subscriber = tracing_subscriber::fmt()
                .with_writer(move || writer.clone())
                .with_max_level(tracing::Level::INFO)
                .with_ansi(false)
                .with_target(false)
                .without_time()
                .finish();
            tracing::subscriber::set_default(subscriber)
        }

        pub fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl std::io::Write for LogCapture {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    pub fn server_error(url: &str) -> Result<FetchResult, TransportError> {
        Err(TransportError::Status {
            url: url.to_string(),
            status: 500,
        })
    }
}
