use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use reqwest::Url;

pub const DEFAULT_ENDPOINT: &str = "https://newsapi.org/v2/top-headlines";
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;

/// Search news headlines by country and category
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Port to listen on
    #[arg(env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Address to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub news_api_key: String,
    pub news_api_endpoint: Url,
    pub fetch_timeout: Duration,
    pub static_dir: String,
}

impl Config {
    pub fn init(cli: Cli) -> anyhow::Result<Self> {
        Self::from_lookup(cli, |key| std::env::var(key).ok())
    }

    /// Builds the config from `cli` and a variable lookup, normally the process environment.
    pub fn from_lookup(cli: Cli, lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let news_api_key = lookup("NEWSAPI").context("NEWSAPI not set")?;

        let endpoint = lookup("NEWS_API_ENDPOINT").unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        let news_api_endpoint = Url::parse(&endpoint)
            .with_context(|| format!("NEWS_API_ENDPOINT is not a valid URL: {endpoint}"))?;

        let fetch_timeout = match lookup("NEWS_FETCH_TIMEOUT_SECS") {
            Some(secs) => secs
                .parse::<u64>()
                .with_context(|| format!("NEWS_FETCH_TIMEOUT_SECS is not a number: {secs}"))?,
            None => DEFAULT_FETCH_TIMEOUT_SECS,
        };

        Ok(Config {
            host: cli.host,
            port: cli.port,
            news_api_key,
            news_api_endpoint,
            fetch_timeout: Duration::from_secs(fetch_timeout),
            static_dir: lookup("STATIC_DIR").unwrap_or_else(|| "static".to_string()),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
