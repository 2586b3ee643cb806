use std::{fmt, str::FromStr};

use reqwest::Url;
use serde::Deserialize;

use crate::models::error::NewsError;

pub const CATEGORIES: [Category; 7] = [
    Category::Business,
    Category::Entertainment,
    Category::General,
    Category::Health,
    Category::Science,
    Category::Sports,
    Category::Technology,
];

/// Country codes offered on the search form.
pub const SUPPORTED_COUNTRIES: [&str; 6] = ["cn", "fr", "jp", "sg", "uk", "us"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Business,
    Entertainment,
    General,
    Health,
    Science,
    Sports,
    Technology,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Business => "Business",
            Category::Entertainment => "Entertainment",
            Category::General => "General",
            Category::Health => "Health",
            Category::Science => "Science",
            Category::Sports => "Sports",
            Category::Technology => "Technology",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = NewsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        CATEGORIES
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| NewsError::UnknownCategory(s.to_string()))
    }
}

/// Upper-cased two letter country code from [`SUPPORTED_COUNTRIES`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Country(String);

impl Country {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Country {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Country {
    type Err = NewsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim();
        if SUPPORTED_COUNTRIES
            .iter()
            .any(|c| c.eq_ignore_ascii_case(code))
        {
            Ok(Country(code.to_ascii_uppercase()))
        } else {
            Err(NewsError::UnsupportedCountry(s.to_string()))
        }
    }
}

/// Raw query string of `GET /search`. The country select is named `images` on the form.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub search: Option<String>,
    pub images: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchRequest {
    pub category: Option<Category>,
    pub country: Option<Country>,
    pub search_term: Option<String>,
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

impl SearchRequest {
    pub fn new(category: Option<Category>, country: Option<Country>, search_term: Option<&str>) -> Self {
        Self {
            category,
            country,
            search_term: non_blank(search_term).map(str::to_string),
        }
    }

    /// Validates form input. Blank fields mean "no filter", anything else must be known.
    pub fn from_params(params: &SearchParams) -> Result<Self, NewsError> {
        let category = non_blank(params.category.as_deref())
            .map(str::parse::<Category>)
            .transpose()?;
        let country = non_blank(params.images.as_deref())
            .map(str::parse::<Country>)
            .transpose()?;

        Ok(Self::new(category, country, params.search.as_deref()))
    }

    /// Builds the upstream URL for this request. Parameters always appear as
    /// `q`, `country`, `category` and absent ones are left out.
    pub fn signature(&self, endpoint: &Url) -> RequestSignature {
        let mut url = endpoint.clone();
        url.set_query(None);
        {
            let mut pairs = url.query_pairs_mut();
            if let Some(q) = &self.search_term {
                pairs.append_pair("q", q);
            }
            if let Some(country) = &self.country {
                pairs.append_pair("country", country.as_str());
            }
            if let Some(category) = &self.category {
                pairs.append_pair("category", category.as_str());
            }
        }
        if url.query() == Some("") {
            url.set_query(None);
        }
        RequestSignature(url)
    }
}

/// Cache key of an upstream response: the full upstream URL, without credentials.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestSignature(Url);

impl RequestSignature {
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn url(&self) -> &Url {
        &self.0
    }
}

impl fmt::Display for RequestSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}
