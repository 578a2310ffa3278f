use serde::{Deserialize, Serialize};

pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const CONTENT_TYPE_HTML: &str = "text/html; charset=utf-8";

/// Body returned to HTTP clients when a request fails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
  pub error: String,
}

impl ErrorResponse {
  pub fn new(error: impl Into<String>) -> Self {
    Self { error: error.into() }
  }
}

/// Body returned to HTTP clients when a request succeeds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusResponse {
  pub status: String,
}

impl StatusResponse {
  pub fn success() -> Self {
    Self { status: "success".into() }
  }
}
