use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::search::Country;

/// Upstream top-headlines payload, kept as close to the wire shape as possible so the
/// cache holds what the API returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsResult {
    pub status: String,
    #[serde(rename = "totalResults", default, skip_serializing_if = "Option::is_none")]
    pub total_results: Option<u64>,
    #[serde(default)]
    pub articles: Vec<Value>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Article {
    pub title: Option<String>,
    pub description: Option<String>,
    pub url_to_image: Option<String>,
    pub published_at: Option<String>,
    pub url: Option<String>,
    pub source: Option<String>,
}

fn text(value: &Value) -> Option<String> {
    value.as_str().map(str::to_string)
}

impl Article {
    /// Reads an upstream article. Fields of the wrong type read as absent.
    pub fn from_value(article: &Value) -> Self {
        Self {
            title: text(&article["title"]),
            description: text(&article["description"]),
            url_to_image: text(&article["urlToImage"]),
            published_at: text(&article["publishedAt"]),
            url: text(&article["url"]),
            source: text(&article["source"]["name"]),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PublishedAt {
    Valid(DateTime<FixedOffset>),
    /// Upstream sent something that is not an RFC 3339 timestamp.
    Invalid(String),
    Missing,
}

impl PublishedAt {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            None => PublishedAt::Missing,
            Some(raw) => DateTime::parse_from_rfc3339(raw.trim())
                .map(PublishedAt::Valid)
                .unwrap_or_else(|_| PublishedAt::Invalid(raw.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DisplayArticle {
    pub title: Option<String>,
    pub description: Option<String>,
    pub url_to_image: Option<String>,
    pub url: Option<String>,
    pub source: Option<String>,
    pub published_at: PublishedAt,
    pub country: Option<Country>,
}

impl DisplayArticle {
    pub fn new(article: Article, country: Option<&Country>) -> Self {
        let published_at = PublishedAt::parse(article.published_at.as_deref());
        Self {
            title: article.title,
            description: article.description,
            url_to_image: article.url_to_image,
            url: article.url,
            source: article.source,
            published_at,
            country: country.cloned(),
        }
    }
}

/// Turns upstream articles into display rows. Never fails: a bad article keeps its
/// place in the list with whatever fields could be read.
pub fn normalize_articles(result: &NewsResult, country: Option<&Country>) -> Vec<DisplayArticle> {
    let articles: Vec<DisplayArticle> = result
        .articles
        .iter()
        .map(|raw| DisplayArticle::new(Article::from_value(raw), country))
        .collect();

    let invalid = articles
        .iter()
        .filter(|a| matches!(a.published_at, PublishedAt::Invalid(_)))
        .count();
    if invalid > 0 {
        tracing::debug!("{} of {} articles have an unparseable publishedAt", invalid, articles.len());
    }

    articles
}
