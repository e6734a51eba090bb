use std::fmt;
use std::time::Duration;

use reqwest::blocking::Client;
use serde_json::Value;
use tracing::debug;

use crate::api::model::{ApiResponse, MovieList};
use crate::cli::config::ApiConfig;
use crate::error::{SuiteError, SuiteResult};

/// List endpoints the suite checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Popular,
    NowPlaying,
    TrendingWeek,
    TopRated,
}

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::Popular => "/movie/popular",
            Endpoint::NowPlaying => "/movie/now_playing",
            Endpoint::TrendingWeek => "/trending/movie/week",
            Endpoint::TopRated => "/movie/top_rated",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Blocking client for the TMDB v3 REST API.
pub struct TmdbClient {
    http: Client,
    config: ApiConfig,
}

impl TmdbClient {
    pub fn new(config: ApiConfig) -> SuiteResult<Self> {
        let http = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub fn url(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), endpoint.path())
    }

    /// GET one page of `endpoint`. Any HTTP status is returned as-is.
    pub fn fetch(&self, endpoint: Endpoint, page: u32) -> SuiteResult<ApiResponse> {
        let api_key = self.config.api_key.as_deref().ok_or_else(|| {
            SuiteError::Config("no TMDB API key; set TMDB_API_KEY or pass --api-key".into())
        })?;

        let url = self.url(endpoint);
        debug!(%url, page, "GET");
        let page = page.to_string();
        let response = self
            .http
            .get(&url)
            .query(&[
                ("api_key", api_key),
                ("language", self.config.language.as_str()),
                ("sort_by", self.config.sort_by.as_str()),
                ("page", page.as_str()),
            ])
            .send()?;

        let status = response.status().as_u16();
        let text = response.text()?;
        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text)?
        };
        Ok(ApiResponse { status, body })
    }

    /// GET and decode; a non-2xx status is an error.
    pub fn list(&self, endpoint: Endpoint, page: u32) -> SuiteResult<MovieList> {
        let response = self.fetch(endpoint, page)?;
        if !response.is_ok() {
            return Err(SuiteError::ApiStatus {
                endpoint: endpoint.to_string(),
                status: response.status,
            });
        }
        Ok(serde_json::from_value(response.body)?)
    }
}
