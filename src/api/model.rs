use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A paged movie listing as returned by the list endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieList {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub results: Vec<Movie>,
    #[serde(default)]
    pub total_pages: u64,
    #[serde(default)]
    pub total_results: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Movie {
    pub id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    /// Only present on trending listings
    #[serde(default)]
    pub media_type: Option<String>,

    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

/// Raw response: status plus the undecoded JSON body.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    /// 2xx
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The `results` array, empty when absent or not an array.
    pub fn results(&self) -> &[Value] {
        self.body
            .get("results")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn results_is_array(&self) -> bool {
        self.body.get("results").is_some_and(Value::is_array)
    }

    pub fn total_results(&self) -> Option<u64> {
        self.body.get("total_results").and_then(Value::as_u64)
    }
}

/// `value` is an object with `field` present, whatever its value.
pub fn has_field(value: &Value, field: &str) -> bool {
    value.as_object().is_some_and(|obj| obj.contains_key(field))
}
