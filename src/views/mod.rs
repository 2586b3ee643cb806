//! HTML pages. Every value from the request or the news API goes through `html_escape`.

use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};
use http::StatusCode;

use crate::models::{
    news::{DisplayArticle, PublishedAt},
    search::{SearchRequest, CATEGORIES, SUPPORTED_COUNTRIES},
};

const DATE_FORMAT: &str = "%a %b %d %Y %H:%M:%S %:z";

pub struct Results<'a> {
    pub request: &'a SearchRequest,
    pub articles: &'a [DisplayArticle],
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<link rel="stylesheet" href="/static/style.css">
</head>
<body>
<h1>{title}</h1>
{body}
</body>
</html>
"#,
        title = text(title),
    )
}

fn search_form(request: Option<&SearchRequest>) -> String {
    let search = request.and_then(|r| r.search_term.as_deref()).unwrap_or("");
    let country = request.and_then(|r| r.country.as_ref());
    let category = request.and_then(|r| r.category);

    let mut html = format!(
        r#"<form method="get" action="/search">
<input type="text" name="search" placeholder="Search headlines" value="{}">
<select name="images">
<option value="">Any country</option>
"#,
        attr(search)
    );
    for code in SUPPORTED_COUNTRIES {
        let selected = country.is_some_and(|c| c.as_str().eq_ignore_ascii_case(code));
        html.push_str(&format!(
            "<option value=\"{code}\"{}>{}</option>\n",
            if selected { " selected" } else { "" },
            code.to_ascii_uppercase()
        ));
    }
    html.push_str("</select>\n<select name=\"category\">\n<option value=\"\">Any category</option>\n");
    for c in CATEGORIES {
        html.push_str(&format!(
            "<option value=\"{c}\"{}>{c}</option>\n",
            if category == Some(c) { " selected" } else { "" },
        ));
    }
    html.push_str("</select>\n<button type=\"submit\">Search</button>\n</form>\n");
    html
}

fn safe_url(url: Option<&str>) -> Option<&str> {
    url.filter(|u| u.starts_with("https://") || u.starts_with("http://"))
}

fn published(published_at: &PublishedAt) -> String {
    match published_at {
        PublishedAt::Valid(date) => date.format(DATE_FORMAT).to_string(),
        PublishedAt::Invalid(_) => "Invalid Date".to_string(),
        PublishedAt::Missing => "Unknown date".to_string(),
    }
}

fn article_card(article: &DisplayArticle) -> String {
    let mut html = String::from("<article>\n");
    if let Some(image) = safe_url(article.url_to_image.as_deref()) {
        html.push_str(&format!("<img src=\"{}\" alt=\"\">\n", attr(image)));
    }
    let title = text(article.title.as_deref().unwrap_or("Untitled"));
    match safe_url(article.url.as_deref()) {
        Some(url) => {
            html.push_str(&format!("<h2><a href=\"{}\">{title}</a></h2>\n", attr(url)));
        }
        None => {
            html.push_str(&format!("<h2>{title}</h2>\n"));
        }
    }
    if let Some(description) = &article.description {
        html.push_str(&format!("<p>{}</p>\n", text(description)));
    }
    html.push_str(&format!(
        "<p class=\"meta\">{}",
        text(&published(&article.published_at))
    ));
    if let Some(source) = &article.source {
        html.push_str(&format!(" &middot; {}", text(source)));
    }
    if let Some(country) = &article.country {
        html.push_str(&format!(" &middot; {}", text(country.as_str())));
    }
    html.push_str("</p>\n</article>\n");
    html
}

pub fn home_page() -> String {
    layout("Search news", &search_form(None))
}

pub fn results_page(results: &Results<'_>) -> String {
    let request = results.request;
    let mut body = search_form(Some(request));

    let mut filters = Vec::new();
    if let Some(term) = &request.search_term {
        filters.push(format!("\"{}\"", text(term)));
    }
    if let Some(country) = &request.country {
        filters.push(text(country.as_str()).into_owned());
    }
    if let Some(category) = request.category {
        filters.push(category.to_string());
    }
    body.push_str(&format!(
        "<p class=\"summary\">{} articles{}{}</p>\n",
        results.articles.len(),
        if filters.is_empty() { "" } else { " for " },
        filters.join(", ")
    ));

    if results.articles.is_empty() {
        body.push_str("<p>No headlines found.</p>\n");
    }
    for article in results.articles {
        body.push_str(&article_card(article));
    }

    layout("Search results", &body)
}

pub fn error_page(code: StatusCode, message: &str) -> String {
    let body = format!(
        "<p class=\"error\">{}</p>\n<p>{}</p>\n<p><a href=\"/\">Back to search</a></p>\n",
        text(code.canonical_reason().unwrap_or("Error")),
        text(message)
    );
    layout(&format!("Error {}", code.as_u16()), &body)
}
