//! HTTP server implementation
//!
//! Uses hyper http1 with TokioIo for async handling. Routes API requests to
//! the resource routers, serves the frontend bundle for everything else, and
//! answers CORS preflights permissively.

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::header::HeaderValue;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::config::Args;
use crate::db::MongoClient;
use crate::routes;
use crate::types::VerandaError;

type BoxBody = http_body_util::combinators::BoxBody<Bytes, hyper::Error>;

/// Shared application state
pub struct AppState {
    pub args: Args,
    /// MongoDB client; None when running in dev mode without a database
    pub mongo: Option<MongoClient>,
}

impl AppState {
    /// Create application state with an optional database connection
    pub fn new(args: Args, mongo: Option<MongoClient>) -> Self {
        Self { args, mongo }
    }
}

/// Start the HTTP server
pub async fn run(state: Arc<AppState>) -> Result<(), VerandaError> {
    let listener = TcpListener::bind(state.args.listen).await?;

    info!(
        "Veranda listening on {} as node {}",
        state.args.listen, state.args.node_id
    );

    if state.mongo.is_none() {
        warn!("Running without a database - data routes will answer 503");
    }

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    let io = TokioIo::new(stream);

                    let service = service_fn(move |req| {
                        let state = Arc::clone(&state);
                        async move { handle_request(state, addr, req).await }
                    });

                    if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                        error!("Error serving connection from {}: {:?}", addr, err);
                    }
                });
            }
            Err(e) => {
                error!("Error accepting connection: {:?}", e);
            }
        }
    }
}

/// Route incoming HTTP requests
async fn handle_request(
    state: Arc<AppState>,
    addr: SocketAddr,
    req: Request<Incoming>,
) -> Result<Response<BoxBody>, hyper::Error> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    info!("[{}] {} {}", addr, method, path);

    let response = match (method, path.as_str()) {
        // Liveness probe
        (Method::GET, "/api/health") => routes::health_check(),

        // Version info for deployment verification
        (Method::GET, "/api/version") => routes::version_info(),

        // CORS preflight
        (Method::OPTIONS, _) => preflight_response(),

        // Resource routers
        (_, p) if p.starts_with("/api/properties") => {
            routes::handle_properties_request(req, Arc::clone(&state), p).await
        }
        (_, p) if p.starts_with("/api/leads") => {
            routes::handle_leads_request(req, Arc::clone(&state), p).await
        }
        (_, p) if p.starts_with("/api/site-visits") => {
            routes::handle_site_visits_request(req, Arc::clone(&state), p).await
        }

        // Unknown API paths stay JSON 404s rather than falling back to the SPA
        (_, p) if p.starts_with("/api/") => not_found_response(p),

        // Static bundle with SPA fallback for any other GET
        (Method::GET, p) => routes::serve_static(&state.args.static_dir, p).await,

        // Not found
        _ => not_found_response(&path),
    };

    Ok(to_boxed(with_cors(response)))
}

/// Convert a Full<Bytes> body to BoxBody
fn to_boxed(response: Response<Full<Bytes>>) -> Response<BoxBody> {
    response.map(|body| body.map_err(|never| match never {}).boxed())
}

/// Add the permissive CORS header to every response
fn with_cors(mut response: Response<Full<Bytes>>) -> Response<Full<Bytes>> {
    response.headers_mut().insert(
        "Access-Control-Allow-Origin",
        HeaderValue::from_static("*"),
    );
    response
}

/// CORS preflight response
fn preflight_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::OK)
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Headers", "*")
        .header("Access-Control-Allow-Methods", "GET, POST, PUT, DELETE, OPTIONS")
        .body(Full::new(Bytes::new()))
        .unwrap()
}

/// Not found response
fn not_found_response(path: &str) -> Response<Full<Bytes>> {
    let body = serde_json::json!({
        "error": "Not Found",
        "path": path,
    });

    Response::builder()
        .status(StatusCode::NOT_FOUND)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(body.to_string())))
        .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preflight_allows_all_origins() {
        let resp = preflight_response();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get("Access-Control-Allow-Origin").unwrap(),
            "*"
        );
        assert_eq!(
            resp.headers().get("Access-Control-Allow-Methods").unwrap(),
            "GET, POST, PUT, DELETE, OPTIONS"
        );
    }

    #[test]
    fn test_with_cors_decorates_any_response() {
        let resp = with_cors(not_found_response("/api/unknown"));
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            resp.headers().get("Access-Control-Allow-Origin").unwrap(),
            "*"
        );
    }
}
