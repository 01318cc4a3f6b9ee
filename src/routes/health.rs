//! Health and version endpoints
//!
//! - /api/health - Liveness probe (is the server running?)
//! - /api/version - Build info for deployment verification
//!
//! The health probe reports only that the process is serving; it does not
//! check the database.

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use serde::{Deserialize, Serialize};

/// Health response
#[derive(Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

/// Handle liveness probe (/api/health)
pub fn health_check() -> Response<Full<Bytes>> {
    let response = HealthResponse {
        status: "ok".to_string(),
        message: "Server is running".to_string(),
    };

    let body = serde_json::to_string(&response)
        .unwrap_or_else(|_| r#"{"status":"ok","message":"Server is running"}"#.to_string());

    Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(body)))
        .unwrap()
}

/// Version information for deployment verification
#[derive(Serialize)]
pub struct VersionResponse {
    /// Cargo package version
    pub version: &'static str,
    /// Service name
    pub service: &'static str,
}

/// Handle version endpoint (/api/version)
pub fn version_info() -> Response<Full<Bytes>> {
    let response = VersionResponse {
        version: env!("CARGO_PKG_VERSION"),
        service: "veranda",
    };

    let body = serde_json::to_string(&response)
        .unwrap_or_else(|_| r#"{"version":"unknown"}"#.to_string());

    Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(body)))
        .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_payload_is_exact() {
        let resp = health_check();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = resp.into_body();
        let bytes = http_body_util::BodyExt::collect(body);
        let collected = tokio_test::block_on(bytes).unwrap().to_bytes();
        let parsed: serde_json::Value = serde_json::from_slice(&collected).unwrap();
        assert_eq!(
            parsed,
            serde_json::json!({"status": "ok", "message": "Server is running"})
        );
    }

    #[test]
    fn test_version_reports_crate_version() {
        let resp = version_info();
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
