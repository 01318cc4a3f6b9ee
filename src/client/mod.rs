//! API client for the Veranda HTTP surface
//!
//! Resolves one base URL from an explicit environment snapshot and exposes
//! one async function per resource operation. Every failure is logged with
//! diagnostic context (endpoint, message, status, base URL) and returned to
//! the caller. No retries, no caching.

use hyper::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{error, info};

use crate::routes::{DeleteResponse, LeadResponse, PropertyResponse, SiteVisitResponse};
use crate::types::{Result, VerandaError};

/// Development default when no explicit URL is configured
pub const DEV_BASE_URL: &str = "http://localhost:5000/api";

/// Hardcoded production fallback
pub const PROD_BASE_URL: &str = "https://veranda-listings.onrender.com/api";

/// Snapshot of the environment the client resolves its base URL from
#[derive(Debug, Clone, Default)]
pub struct ClientEnv {
    /// Explicit base URL override
    pub api_url: Option<String>,
    /// Whether the client runs in development mode
    pub dev_mode: bool,
}

impl ClientEnv {
    /// Capture a snapshot from the process environment
    pub fn from_process_env() -> Self {
        Self {
            api_url: std::env::var("API_URL").ok().filter(|s| !s.is_empty()),
            dev_mode: std::env::var("DEV_MODE")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        }
    }
}

/// Resolve the base URL from an environment snapshot
///
/// Precedence: explicit configuration, then the development localhost
/// default, then the hardcoded production fallback.
pub fn resolve_base_url(env: &ClientEnv) -> String {
    if let Some(ref url) = env.api_url {
        let url = url.trim_end_matches('/').to_string();
        info!("Using configured API URL: {}", url);
        return url;
    }

    if env.dev_mode {
        info!("Using development API URL: {}", DEV_BASE_URL);
        return DEV_BASE_URL.to_string();
    }

    info!("Using production API URL: {}", PROD_BASE_URL);
    PROD_BASE_URL.to_string()
}

/// HTTP client for the listing API
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client resolving its base URL from the given snapshot
    pub fn new(env: &ClientEnv) -> Result<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| VerandaError::Http(format!("HTTP client error: {}", e)))?;

        Ok(Self {
            http,
            base_url: resolve_base_url(env),
        })
    }

    /// The resolved base URL every request targets
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // Properties

    pub async fn get_properties(&self) -> Result<Vec<PropertyResponse>> {
        self.request_json("get_properties", reqwest::Method::GET, "/properties", None::<&()>)
            .await
    }

    pub async fn get_property(&self, id: &str) -> Result<PropertyResponse> {
        self.request_json(
            &format!("get_property/{}", id),
            reqwest::Method::GET,
            &format!("/properties/{}", id),
            None::<&()>,
        )
        .await
    }

    pub async fn create_property<T: Serialize>(&self, property: &T) -> Result<PropertyResponse> {
        self.request_json("create_property", reqwest::Method::POST, "/properties", Some(property))
            .await
    }

    pub async fn update_property<T: Serialize>(
        &self,
        id: &str,
        updates: &T,
    ) -> Result<PropertyResponse> {
        self.request_json(
            &format!("update_property/{}", id),
            reqwest::Method::PUT,
            &format!("/properties/{}", id),
            Some(updates),
        )
        .await
    }

    pub async fn delete_property(&self, id: &str) -> Result<DeleteResponse> {
        self.request_json(
            &format!("delete_property/{}", id),
            reqwest::Method::DELETE,
            &format!("/properties/{}", id),
            None::<&()>,
        )
        .await
    }

    // Leads

    pub async fn get_leads(&self) -> Result<Vec<LeadResponse>> {
        self.request_json("get_leads", reqwest::Method::GET, "/leads", None::<&()>)
            .await
    }

    pub async fn create_lead<T: Serialize>(&self, lead: &T) -> Result<LeadResponse> {
        self.request_json("create_lead", reqwest::Method::POST, "/leads", Some(lead))
            .await
    }

    pub async fn update_lead<T: Serialize>(&self, id: &str, updates: &T) -> Result<LeadResponse> {
        self.request_json(
            &format!("update_lead/{}", id),
            reqwest::Method::PUT,
            &format!("/leads/{}", id),
            Some(updates),
        )
        .await
    }

    // Site visits

    pub async fn get_site_visits(&self) -> Result<Vec<SiteVisitResponse>> {
        self.request_json("get_site_visits", reqwest::Method::GET, "/site-visits", None::<&()>)
            .await
    }

    pub async fn create_site_visit<T: Serialize>(&self, visit: &T) -> Result<SiteVisitResponse> {
        self.request_json("create_site_visit", reqwest::Method::POST, "/site-visits", Some(visit))
            .await
    }

    pub async fn update_site_visit<T: Serialize>(
        &self,
        id: &str,
        updates: &T,
    ) -> Result<SiteVisitResponse> {
        self.request_json(
            &format!("update_site_visit/{}", id),
            reqwest::Method::PUT,
            &format!("/site-visits/{}", id),
            Some(updates),
        )
        .await
    }

    // Request plumbing

    /// Issue one JSON request and parse the response
    ///
    /// Any transport failure, non-2xx status, or body parse failure is
    /// logged exactly once with the endpoint name before being returned.
    async fn request_json<B: Serialize, T: DeserializeOwned>(
        &self,
        endpoint: &str,
        method: reqwest::Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);

        let mut request = self
            .http
            .request(method, &url)
            .header(reqwest::header::CONTENT_TYPE, "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = match request.send().await {
            Ok(r) => r,
            Err(e) => {
                let err = VerandaError::Http(format!("{} failed: {}", endpoint, e));
                self.log_failure(endpoint, &err.to_string(), None);
                return Err(err);
            }
        };

        let status = response.status();
        if !status.is_success() {
            let reason = status.canonical_reason().unwrap_or("request failed");
            let err = VerandaError::Http(format!("{} failed: {}", endpoint, reason));
            self.log_failure(endpoint, &err.to_string(), Some(status));
            return Err(err);
        }

        match response.json::<T>().await {
            Ok(parsed) => Ok(parsed),
            Err(e) => {
                let err = VerandaError::Http(format!("{} returned invalid JSON: {}", endpoint, e));
                self.log_failure(endpoint, &err.to_string(), None);
                Err(err)
            }
        }
    }

    fn log_failure(&self, endpoint: &str, message: &str, status: Option<StatusCode>) {
        error!(
            endpoint = %endpoint,
            message = %message,
            status = ?status.map(|s| s.as_u16()),
            url = %self.base_url,
            "API request failed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_url_wins() {
        let env = ClientEnv {
            api_url: Some("https://api.example.com/api".to_string()),
            dev_mode: true,
        };
        assert_eq!(resolve_base_url(&env), "https://api.example.com/api");
    }

    #[test]
    fn test_explicit_url_is_trimmed() {
        let env = ClientEnv {
            api_url: Some("https://api.example.com/api/".to_string()),
            dev_mode: false,
        };
        assert_eq!(resolve_base_url(&env), "https://api.example.com/api");
    }

    #[test]
    fn test_dev_mode_falls_back_to_localhost() {
        let env = ClientEnv {
            api_url: None,
            dev_mode: true,
        };
        assert_eq!(resolve_base_url(&env), DEV_BASE_URL);
    }

    #[test]
    fn test_production_falls_back_to_hardcoded_url() {
        let env = ClientEnv {
            api_url: None,
            dev_mode: false,
        };
        assert_eq!(resolve_base_url(&env), PROD_BASE_URL);
    }

    #[tokio::test]
    async fn test_network_failure_surfaces_as_error() {
        // Nothing listens on this port; the request fails at transport level
        let env = ClientEnv {
            api_url: Some("http://127.0.0.1:1/api".to_string()),
            dev_mode: false,
        };
        let client = ApiClient::new(&env).unwrap();

        let result = client.get_properties().await;
        let err = result.unwrap_err();
        assert!(err.to_string().contains("get_properties"));
    }
}
