use axum::extract::rejection::QueryRejection;
use axum::http::StatusCode;
use axum::response::Html;
use axum::response::IntoResponse;
use axum::response::Response;

use crate::views;

/// Failures of the search flow, from validating input to talking to the news API.
#[derive(Debug, thiserror::Error)]
pub enum NewsError {
    #[error("unknown category: {0}")]
    UnknownCategory(String),

    #[error("unsupported country: {0}")]
    UnsupportedCountry(String),

    #[error("news API responded with {status}: {message}")]
    UpstreamStatus { status: StatusCode, message: String },

    #[error("news API request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("news API returned an unreadable body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("news API did not answer within {0:?}")]
    Timeout(std::time::Duration),

    #[error("news API request was cancelled")]
    Cancelled,
}

impl NewsError {
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            NewsError::UnknownCategory(_) | NewsError::UnsupportedCountry(_)
        )
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            NewsError::UnknownCategory(_) | NewsError::UnsupportedCountry(_) => {
                StatusCode::BAD_REQUEST
            }
            NewsError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            NewsError::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
            NewsError::UpstreamStatus { .. } | NewsError::Network(_) | NewsError::Decode(_) => {
                StatusCode::BAD_GATEWAY
            }
        }
    }
}

/// Error returned from handlers, rendered as an HTML error page.
#[derive(Debug)]
pub struct Error {
    pub code: StatusCode,
    pub message: String,
}

impl Error {
    pub fn new(code: StatusCode, message: &str) -> Self {
        Self {
            code,
            message: message.to_string(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        (self.code, Html(views::error_page(self.code, &self.message))).into_response()
    }
}

impl From<NewsError> for Error {
    fn from(error: NewsError) -> Self {
        let code = error.status_code();
        if error.is_validation() {
            Self::new(code, &error.to_string())
        } else {
            tracing::warn!("search failed: {}", error);
            // upstream details stay in the log
            Self::new(code, "Could not fetch headlines from the news service. Please try again later.")
        }
    }
}

impl From<QueryRejection> for Error {
    fn from(rejection: QueryRejection) -> Self {
        Self::new(StatusCode::BAD_REQUEST, &rejection.body_text())
    }
}
