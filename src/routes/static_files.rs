//! Static file serving for the compiled frontend bundle
//!
//! Serves files from the configured bundle directory and falls back to the
//! bundle's index.html for any unmatched path, so client-side routing can
//! take over (SPA fallback).

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use std::path::Path;
use tokio::fs;
use tracing::warn;

use crate::routes::helpers::error_response;

/// Serve a path from the static directory, falling back to index.html
pub async fn serve_static(static_dir: &str, path: &str) -> Response<Full<Bytes>> {
    if let Some((content, content_type)) = load_from_directory(static_dir, path).await {
        return file_response(content, content_type);
    }

    // SPA fallback: unmatched routes get the entry document
    match load_index(static_dir).await {
        Some(content) => file_response(content, "text/html; charset=utf-8"),
        None => error_response(
            StatusCode::NOT_FOUND,
            &format!("Not found: {}", path),
            Some("NOT_FOUND"),
        ),
    }
}

/// Load a file from the bundle directory
///
/// Returns None when the file does not exist or resolves outside the
/// bundle directory (traversal guard).
async fn load_from_directory(static_dir: &str, path: &str) -> Option<(Vec<u8>, &'static str)> {
    // Remove leading slash and prevent directory traversal
    let clean_path = path.trim_start_matches('/').replace("..", "");

    let static_dir_canonical = Path::new(static_dir).canonicalize().ok()?;

    let mut file_path = Path::new(static_dir).join(&clean_path);
    if clean_path.is_empty() || file_path.is_dir() {
        file_path = file_path.join("index.html");
    }

    let file_path_canonical = file_path.canonicalize().ok()?;
    if !file_path_canonical.starts_with(&static_dir_canonical) {
        warn!("Path traversal attempt blocked: {}", path);
        return None;
    }

    let content = match fs::read(&file_path_canonical).await {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read file '{}': {}", file_path_canonical.display(), e);
            return None;
        }
    };

    let content_type = get_content_type(file_path_canonical.extension().and_then(|e| e.to_str()));

    Some((content, content_type))
}

/// Load the bundle's entry document
async fn load_index(static_dir: &str) -> Option<Vec<u8>> {
    fs::read(Path::new(static_dir).join("index.html")).await.ok()
}

fn file_response(content: Vec<u8>, content_type: &'static str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", content_type)
        .header("Content-Length", content.len())
        .body(Full::new(Bytes::from(content)))
        .unwrap()
}

/// Get MIME Content-Type based on file extension
pub fn get_content_type(extension: Option<&str>) -> &'static str {
    match extension {
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("css") => "text/css",
        Some("js" | "mjs") => "application/javascript",
        Some("json") => "application/json",
        Some("txt") => "text/plain; charset=utf-8",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        Some("webp") => "image/webp",
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("ttf") => "font/ttf",
        Some("map") => "application/json",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_for_bundle_assets() {
        assert_eq!(get_content_type(Some("html")), "text/html; charset=utf-8");
        assert_eq!(get_content_type(Some("js")), "application/javascript");
        assert_eq!(get_content_type(Some("css")), "text/css");
        assert_eq!(get_content_type(None), "application/octet-stream");
    }

    #[tokio::test]
    async fn test_missing_bundle_dir_yields_404() {
        let resp = serve_static("/nonexistent-bundle-dir", "/dashboard").await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_spa_fallback_serves_index_for_unmatched_route() {
        let dir = std::env::temp_dir().join("veranda-static-test");
        let _ = std::fs::create_dir_all(&dir);
        std::fs::write(dir.join("index.html"), "<html>app</html>").unwrap();

        let resp = serve_static(dir.to_str().unwrap(), "/some/client/route").await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get("Content-Type").unwrap(),
            "text/html; charset=utf-8"
        );
    }
}
