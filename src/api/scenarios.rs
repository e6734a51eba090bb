//! Shape checks against the live TMDB list endpoints.

use serde_json::Value;

use crate::api::client::{Endpoint, TmdbClient};
use crate::api::model::ApiResponse;
use crate::error::{SuiteError, SuiteResult};
use crate::scenario::context::ScenarioContext;
use crate::scenario::expect::{expect_eq, expect_field, expect_gt, expect_true};
use crate::scenario::model::Scenario;

const GROUP: &str = "TMDB API Automation Tests";

pub fn api_scenarios() -> Vec<Scenario> {
    vec![
        Scenario::api("API-001", "GET Request - Popular Movies", GROUP, popular_movies),
        Scenario::api("API-002", "GET Request - Newest", GROUP, now_playing),
        Scenario::api("API-003", "GET Request - Trending Movies", GROUP, trending_movies),
        Scenario::api("API-004", "GET Request - Top Rated Movies", GROUP, top_rated_movies),
    ]
}

/// Fetch page 1 and check the status and that `results` is non-empty.
fn fetch_listing(ctx: &mut ScenarioContext, endpoint: Endpoint) -> SuiteResult<ApiResponse> {
    let client = TmdbClient::new(ctx.config().api.clone())?;
    let response = ctx.check(&format!("GET {}", endpoint), || client.fetch(endpoint, 1))?;

    ctx.check("Assert status and data", || {
        expect_true(
            response.is_ok(),
            format!("expected a 2xx status from {}, got {}", endpoint, response.status),
        )?;
        expect_gt(response.results().len(), 0, "results length")
    })?;
    ctx.info(format!(
        "Total Results: {}",
        response
            .total_results()
            .map(|n| n.to_string())
            .unwrap_or_else(|| "unknown".into())
    ));
    Ok(response)
}

fn first_result(response: &ApiResponse) -> SuiteResult<&Value> {
    response
        .results()
        .first()
        .ok_or_else(|| SuiteError::assertion("results is empty"))
}

fn popular_movies(ctx: &mut ScenarioContext) -> SuiteResult<()> {
    let response = fetch_listing(ctx, Endpoint::Popular)?;
    ctx.check("Assert first movie object has expected fields", || {
        let first = first_result(&response)?;
        expect_field(first, "title")?;
        expect_field(first, "vote_average")
    })
}

fn now_playing(ctx: &mut ScenarioContext) -> SuiteResult<()> {
    let response = fetch_listing(ctx, Endpoint::NowPlaying)?;
    ctx.check("Validate pagination fields", || {
        expect_field(&response.body, "total_pages")?;
        expect_field(&response.body, "total_results")
    })?;
    ctx.check("Validate first movie object", || {
        let first = first_result(&response)?;
        for field in ["id", "title", "overview", "release_date"] {
            expect_field(first, field)?;
        }
        Ok(())
    })
}

fn trending_movies(ctx: &mut ScenarioContext) -> SuiteResult<()> {
    let response = fetch_listing(ctx, Endpoint::TrendingWeek)?;
    ctx.check("Assert first movie object has expected fields", || {
        let first = first_result(&response)?;
        expect_field(first, "title")?;
        expect_field(first, "vote_average")?;
        expect_eq(
            first.get("media_type").and_then(Value::as_str),
            Some("movie"),
            "media_type",
        )
    })
}

fn top_rated_movies(ctx: &mut ScenarioContext) -> SuiteResult<()> {
    let response = fetch_listing(ctx, Endpoint::TopRated)?;
    ctx.check("Validate structure", || {
        expect_true(response.results_is_array(), "results is not an array")?;
        expect_field(&response.body, "total_results")
    })?;
    ctx.check("Validate first movie object", || {
        let first = first_result(&response)?;
        expect_field(first, "overview")?;
        expect_field(first, "vote_average")
    })
}
