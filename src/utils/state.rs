use std::sync::Arc;

use reqwest::Client;
use tokio_util::sync::CancellationToken;

use crate::models::cache::ResponseCache;
use crate::utils::{config::Config, news_client::NewsClient};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub news: NewsClient,
    pub shutdown: CancellationToken,
}

impl AppState {
    /// Creates the shared state, including the response cache, once at startup.
    pub fn init(config: Config) -> Result<Arc<Self>, reqwest::Error> {
        let http_client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let cache = Arc::new(ResponseCache::new());

        Ok(Self::with_client(config, http_client, cache))
    }

    pub fn with_client(config: Config, http_client: Client, cache: Arc<ResponseCache>) -> Arc<Self> {
        let news = NewsClient::new(
            http_client,
            config.news_api_endpoint.clone(),
            config.news_api_key.clone(),
            config.fetch_timeout,
            cache,
        );

        Arc::new(AppState {
            config,
            news,
            shutdown: CancellationToken::new(),
        })
    }
}
