use std::{sync::Arc, time::Duration};

use http::header::ACCEPT;
use reqwest::{Client, Url};
use serde_json::{from_str, Value};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::models::{
    cache::ResponseCache,
    error::NewsError,
    news::NewsResult,
    search::{RequestSignature, SearchRequest},
};

const API_KEY_HEADER: &str = "X-API-KEY";

/// Client for the top-headlines endpoint, answering from the response cache when it can.
#[derive(Clone)]
pub struct NewsClient {
    http_client: Client,
    endpoint: Url,
    api_key: String,
    timeout: Duration,
    cache: Arc<ResponseCache>,
}

impl NewsClient {
    pub fn new(
        http_client: Client,
        endpoint: Url,
        api_key: String,
        timeout: Duration,
        cache: Arc<ResponseCache>,
    ) -> Self {
        Self {
            http_client,
            endpoint,
            api_key,
            timeout,
            cache,
        }
    }

    pub fn signature(&self, request: &SearchRequest) -> RequestSignature {
        request.signature(&self.endpoint)
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// Returns the headlines for `request`, fetching them only on a cache miss.
    /// Only successful responses are cached.
    pub async fn fetch_news(
        &self,
        request: &SearchRequest,
        cancel: CancellationToken,
    ) -> Result<NewsResult, NewsError> {
        let signature = self.signature(request);

        if let Some(cached) = self.cache.get(&signature) {
            return Ok(cached);
        }

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(NewsError::Cancelled),
            res = tokio::time::timeout(self.timeout, self.fetch_upstream(&signature)) => {
                res.unwrap_or(Err(NewsError::Timeout(self.timeout)))
            }
        };

        match result {
            Ok(news) => {
                info!(
                    "fetched {} articles for {}",
                    news.articles.len(),
                    signature
                );
                self.cache.put(signature, news.clone());
                Ok(news)
            }
            Err(e) => {
                warn!("fetch for {} failed: {}", signature, e);
                Err(e)
            }
        }
    }

    async fn fetch_upstream(&self, signature: &RequestSignature) -> Result<NewsResult, NewsError> {
        let res = self
            .http_client
            .get(signature.url().clone())
            .header(API_KEY_HEADER, &self.api_key)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(NewsError::UpstreamStatus {
                status,
                message: upstream_message(&body).unwrap_or_else(|| {
                    status.canonical_reason().unwrap_or("unknown status").to_string()
                }),
            });
        }

        Ok(from_str(&body)?)
    }
}

/// newsapi error bodies look like `{"status":"error","code":"...","message":"..."}`.
fn upstream_message(body: &str) -> Option<String> {
    let json: Value = from_str(body).ok()?;
    json["message"].as_str().map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::search::{Category, Country};
    use mockito::{Matcher, Server};

    const PATH: &str = "/v2/top-headlines";

    fn ok_body() -> String {
        serde_json::json!({
            "status": "ok",
            "totalResults": 2,
            "articles": [
                { "title": "AI one", "publishedAt": "2024-05-01T12:00:00Z", "url": "https://a" },
                { "title": "AI two", "publishedAt": "2024-05-02T12:00:00Z", "url": "https://b" }
            ]
        })
        .to_string()
    }

    fn client(server_url: &str, timeout: Duration) -> NewsClient {
        NewsClient::new(
            Client::new(),
            Url::parse(&format!("{server_url}{PATH}")).unwrap(),
            "secret-key".to_string(),
            timeout,
            Arc::new(ResponseCache::new()),
        )
    }

    fn tech_us_ai() -> SearchRequest {
        let country: Country = "us".parse().unwrap();
        SearchRequest::new(Some(Category::Technology), Some(country), Some("ai"))
    }

    #[tokio::test]
    async fn second_identical_call_is_a_cache_hit() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", PATH)
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("q".into(), "ai".into()),
                Matcher::UrlEncoded("country".into(), "US".into()),
                Matcher::UrlEncoded("category".into(), "Technology".into()),
            ]))
            .match_header("x-api-key", "secret-key")
            .match_header("accept", "application/json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(ok_body())
            .expect(1)
            .create_async()
            .await;

        let news = client(&server.url(), Duration::from_secs(5));
        let request = tech_us_ai();

        let first = news.fetch_news(&request, CancellationToken::new()).await.unwrap();
        let second = news.fetch_news(&request, CancellationToken::new()).await.unwrap();

        mock.assert_async().await;
        assert_eq!(first, second);
        assert_eq!(first.articles.len(), 2);
        assert_eq!(news.cache().hits(), 1);
        assert_eq!(news.cache().len(), 1);

        let signature = news.signature(&request);
        assert!(news.cache().contains(&signature));
        assert!(signature.as_str().ends_with("?q=ai&country=US&category=Technology"));
        assert!(!signature.as_str().contains("secret-key"));
    }

    #[tokio::test]
    async fn cached_signature_skips_the_network() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", PATH)
            .match_query(Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let news = client(&server.url(), Duration::from_secs(5));
        let request = tech_us_ai();
        let cached = NewsResult {
            status: "ok".to_string(),
            total_results: Some(0),
            articles: vec![],
        };
        news.cache().put(news.signature(&request), cached.clone());

        let got = news.fetch_news(&request, CancellationToken::new()).await.unwrap();

        mock.assert_async().await;
        assert_eq!(got, cached);
    }

    #[tokio::test]
    async fn failed_fetch_leaves_cache_clean() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", PATH)
            .match_query(Matcher::Any)
            .with_status(500)
            .with_body(r#"{"status":"error","code":"unexpectedError","message":"boom"}"#)
            .expect(2)
            .create_async()
            .await;

        let news = client(&server.url(), Duration::from_secs(5));
        let request = tech_us_ai();

        for _ in 0..2 {
            let err = news.fetch_news(&request, CancellationToken::new()).await.unwrap_err();
            match err {
                NewsError::UpstreamStatus { status, message } => {
                    assert_eq!(status, http::StatusCode::INTERNAL_SERVER_ERROR);
                    assert_eq!(message, "boom");
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }

        mock.assert_async().await;
        assert!(news.cache().is_empty());
        assert_eq!(news.cache().hits(), 0);
    }

    #[tokio::test]
    async fn unreadable_body_is_not_cached() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", PATH)
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("<html>not json</html>")
            .create_async()
            .await;

        let news = client(&server.url(), Duration::from_secs(5));

        let err = news
            .fetch_news(&tech_us_ai(), CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, NewsError::Decode(_)));
        assert!(news.cache().is_empty());
    }

    #[tokio::test]
    async fn network_failure_is_reported() {
        // nothing listens on the discard port
        let news = client("http://127.0.0.1:9", Duration::from_secs(5));

        let err = news
            .fetch_news(&tech_us_ai(), CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, NewsError::Network(_)));
        assert!(news.cache().is_empty());
    }

    #[tokio::test]
    async fn cancelled_fetch_is_not_cached() {
        let server = Server::new_async().await;
        let news = client(&server.url(), Duration::from_secs(5));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = news.fetch_news(&tech_us_ai(), cancel).await.unwrap_err();

        assert!(matches!(err, NewsError::Cancelled));
        assert!(news.cache().is_empty());
    }

    #[tokio::test]
    async fn slow_upstream_times_out() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        // accept and never answer
        let _server = tokio::spawn(async move {
            let mut held = Vec::new();
            loop {
                if let Ok((socket, _)) = listener.accept().await {
                    held.push(socket);
                }
            }
        });

        let news = client(&format!("http://{addr}"), Duration::from_millis(200));

        let err = news
            .fetch_news(&tech_us_ai(), CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, NewsError::Timeout(_)));
        assert!(news.cache().is_empty());
    }
}
