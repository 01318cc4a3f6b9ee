//! Shared helpers for route handlers
//!
//! JSON response builders, body parsing, and id handling used by every
//! resource router.

use bson::oid::ObjectId;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::{Request, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::db::MongoClient;
use crate::server::AppState;

pub type FullBody = Full<Bytes>;

/// Standard error payload
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// Confirmation payload for delete operations
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
}

pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<FullBody> {
    let json = serde_json::to_string(body).unwrap_or_else(|_| "{}".to_string());
    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(json)))
        .unwrap()
}

pub fn error_response(status: StatusCode, error: &str, code: Option<&str>) -> Response<FullBody> {
    json_response(
        status,
        &ErrorResponse {
            error: error.to_string(),
            code: code.map(|c| c.to_string()),
        },
    )
}

/// Parse a path segment as an ObjectId.
///
/// A malformed id can never match a stored document, so it is reported the
/// same way as a missing one (404).
pub fn parse_object_id(id: &str) -> Result<ObjectId, Response<FullBody>> {
    ObjectId::parse_str(id).map_err(|_| {
        error_response(
            StatusCode::NOT_FOUND,
            &format!("No document with id '{}'", id),
            Some("NOT_FOUND"),
        )
    })
}

/// Read and deserialize a JSON request body
pub async fn read_json_body<T: DeserializeOwned>(
    req: Request<Incoming>,
) -> Result<T, Response<FullBody>> {
    let body_bytes = match req.into_body().collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            warn!("Failed to read request body: {}", e);
            return Err(error_response(
                StatusCode::BAD_REQUEST,
                "Failed to read request body",
                Some("BAD_BODY"),
            ));
        }
    };

    serde_json::from_slice(&body_bytes).map_err(|e| {
        error_response(
            StatusCode::BAD_REQUEST,
            &format!("Invalid JSON: {}", e),
            Some("BAD_JSON"),
        )
    })
}

/// Get the MongoDB client, or a 503 if the server is running without one
pub fn require_mongo(state: &AppState) -> Result<&MongoClient, Response<FullBody>> {
    state.mongo.as_ref().ok_or_else(|| {
        error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            "Database not available",
            Some("DB_UNAVAILABLE"),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_object_id_accepts_valid_hex() {
        let oid = parse_object_id("665f1c2ab1e8f94d3c0a7712").expect("valid id should parse");
        assert_eq!(oid.to_hex(), "665f1c2ab1e8f94d3c0a7712");
    }

    #[test]
    fn test_parse_object_id_rejects_malformed_as_not_found() {
        let resp = parse_object_id("not-an-id").unwrap_err();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_error_response_carries_code() {
        let resp = error_response(StatusCode::BAD_REQUEST, "bad", Some("BAD_JSON"));
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            resp.headers().get("Content-Type").unwrap(),
            "application/json"
        );
    }
}
