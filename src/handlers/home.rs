use axum::response::{Html, IntoResponse, Redirect};

use crate::views;

pub async fn home() -> Html<String> {
    Html(views::home_page())
}

pub async fn redirect_home() -> impl IntoResponse {
    Redirect::to("/")
}
