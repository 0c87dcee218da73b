use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{AgentError, Result};
use crate::types::Package;

const DEFAULT_BACKEND_URL: &str = "http://localhost:5000";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Coarse filters for the backend package search; fine-grained matching
/// happens in the ranking engine afterwards
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
}

/// Source of candidate packages for the ranking engine.
///
/// The production implementation is [`BackendClient`]; tests drive the
/// engine with an in-process fake. A transport or decode failure is an
/// `Err`; a backend reply with `success: false` or missing data is an
/// empty candidate list, not an error.
#[async_trait]
pub trait CandidateFetcher: Send + Sync {
    async fn search_packages(&self, filters: &SearchFilters) -> Result<Vec<Package>>;
}

/// HTTP client for the booking backend's package search
#[derive(Debug, Clone)]
pub struct BackendClient {
    base_url: String,
    client: Client,
}

impl BackendClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| AgentError::Config(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self {
            base_url: normalize_base_url(&base_url.into()),
            client,
        })
    }

    /// Resolve the backend URL from `BACKEND_URL` / `BACKEND_API_URL`,
    /// falling back to localhost
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("BACKEND_URL")
            .or_else(|_| std::env::var("BACKEND_API_URL"))
            .unwrap_or_else(|_| DEFAULT_BACKEND_URL.to_string());
        Self::new(base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl CandidateFetcher for BackendClient {
    async fn search_packages(&self, filters: &SearchFilters) -> Result<Vec<Package>> {
        let url = format!("{}/packages", self.base_url);
        debug!(target: "raahi::api", %url, ?filters, "GET packages");

        let mut request = self.client.get(&url);
        if let Some(destination) = &filters.destination {
            request = request.query(&[("destination", destination.as_str())]);
        }
        if let Some(max_price) = filters.max_price {
            request = request.query(&[("maxPrice", max_price)]);
        }
        if let Some(duration) = filters.duration {
            request = request.query(&[("duration", duration)]);
        }

        let response = request.send().await?;
        let status = response.status();
        let body: Value = response.json().await?;

        if !status.is_success() {
            let message = body
                .pointer("/error/message")
                .and_then(Value::as_str)
                .unwrap_or("package search failed");
            return Err(AgentError::Backend(format!("HTTP {status}: {message}")));
        }

        if !body.get("success").and_then(Value::as_bool).unwrap_or(false) {
            warn!(target: "raahi::api", "backend reported success=false");
            return Ok(Vec::new());
        }

        // The backend wraps results as data.packages; older deployments
        // return the array directly under data
        let packages = match body.get("data") {
            Some(Value::Object(data)) => data.get("packages").cloned().unwrap_or(Value::Null),
            Some(data @ Value::Array(_)) => data.clone(),
            _ => Value::Null,
        };

        match packages {
            Value::Array(_) => {
                let packages: Vec<Package> = serde_json::from_value(packages)?;
                debug!(target: "raahi::api", count = packages.len(), "packages received");
                Ok(packages)
            }
            _ => {
                warn!(target: "raahi::api", "backend reply carried no package data");
                Ok(Vec::new())
            }
        }
    }
}

/// The backend mounts everything under /api; accept base URLs with or
/// without the suffix
fn normalize_base_url(base_url: &str) -> String {
    let trimmed = base_url.trim_end_matches('/');
    if trimmed.ends_with("/api") {
        trimmed.to_string()
    } else {
        format!("{trimmed}/api")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_normalization() {
        assert_eq!(normalize_base_url("http://localhost:5000"), "http://localhost:5000/api");
        assert_eq!(normalize_base_url("http://localhost:5000/"), "http://localhost:5000/api");
        assert_eq!(
            normalize_base_url("http://localhost:5000/api"),
            "http://localhost:5000/api"
        );
    }

    #[test]
    fn test_filters_serialize_to_camel_case() {
        let filters = SearchFilters {
            destination: Some("Hunza".to_string()),
            max_price: Some(30000),
            duration: None,
        };
        let json = serde_json::to_value(&filters).unwrap();
        assert_eq!(json["maxPrice"], 30000);
        assert!(json.get("duration").is_none());
    }
}
