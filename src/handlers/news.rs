use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    response::Html,
};

use crate::{
    models::{
        error::Error,
        news::normalize_articles,
        search::{SearchParams, SearchRequest},
    },
    utils::state::AppState,
    views::{self, Results},
};

pub async fn search_news(
    State(state): State<Arc<AppState>>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Html<String>, Error> {
    let Query(params) = params?;
    let request = SearchRequest::from_params(&params)?;

    let result = state
        .news
        .fetch_news(&request, state.shutdown.child_token())
        .await?;

    let articles = normalize_articles(&result, request.country.as_ref());

    Ok(Html(views::results_page(&Results {
        request: &request,
        articles: &articles,
    })))
}
