//! Site visit routes
//!
//! ## Endpoints
//!
//! - `GET /api/site-visits` - List all site visits
//! - `GET /api/site-visits/{id}` - Get a single site visit
//! - `POST /api/site-visits` - Schedule a site visit
//! - `PUT /api/site-visits/{id}` - Update a site visit (partial)
//!
//! Site visits expose no delete operation; cancellations are status
//! updates.

use bson::{doc, DateTime, Document};
use hyper::body::Incoming;
use hyper::{Method, Request, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

use crate::db::schemas::{SiteVisitDoc, SITE_VISIT_COLLECTION};
use crate::db::MongoCollection;
use crate::routes::helpers::{
    error_response, json_response, parse_object_id, read_json_body, require_mongo, FullBody,
};
use crate::server::AppState;

/// Site visit as returned on the wire
#[derive(Debug, Serialize, Deserialize)]
pub struct SiteVisitResponse {
    pub id: String,
    pub property_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lead_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl From<SiteVisitDoc> for SiteVisitResponse {
    fn from(doc: SiteVisitDoc) -> Self {
        Self {
            id: doc._id.map(|o| o.to_hex()).unwrap_or_default(),
            property_id: doc.property_id,
            lead_id: doc.lead_id,
            scheduled_at: doc.scheduled_at.map(|d| d.to_rfc3339()),
            notes: doc.notes,
            status: doc.status,
            created_at: doc.metadata.created_at.map(|d| d.to_string()),
            updated_at: doc.metadata.updated_at.map(|d| d.to_string()),
        }
    }
}

/// Partial update for a site visit
#[derive(Debug, Default, Deserialize)]
pub struct UpdateSiteVisitRequest {
    pub property_id: Option<String>,
    pub lead_id: Option<String>,
    pub scheduled_at: Option<chrono::DateTime<chrono::Utc>>,
    pub notes: Option<String>,
    pub status: Option<String>,
}

impl UpdateSiteVisitRequest {
    /// Build a `$set` document from the provided fields only
    pub fn into_set_document(self) -> Document {
        let mut set = Document::new();
        if let Some(v) = self.property_id {
            set.insert("property_id", v);
        }
        if let Some(v) = self.lead_id {
            set.insert("lead_id", v);
        }
        if let Some(v) = self.scheduled_at {
            set.insert("scheduled_at", v.to_rfc3339());
        }
        if let Some(v) = self.notes {
            set.insert("notes", v);
        }
        if let Some(v) = self.status {
            set.insert("status", v);
        }
        set
    }
}

/// Main handler for /api/site-visits/* routes
pub async fn handle_site_visits_request(
    req: Request<Incoming>,
    state: Arc<AppState>,
    path: &str,
) -> Response<FullBody> {
    let method = req.method().clone();
    let subpath = path.strip_prefix("/api/site-visits").unwrap_or("");

    match (method, subpath) {
        // GET /api/site-visits - List all site visits
        (Method::GET, "") | (Method::GET, "/") => handle_list_site_visits(state).await,

        // POST /api/site-visits - Schedule a site visit
        (Method::POST, "") | (Method::POST, "/") => handle_create_site_visit(req, state).await,

        // GET /api/site-visits/{id} - Get a single site visit
        (Method::GET, p) if !p.trim_start_matches('/').contains('/') => {
            let id = p.trim_start_matches('/');
            handle_get_site_visit(state, id).await
        }

        // PUT /api/site-visits/{id} - Update a site visit
        (Method::PUT, p) if !p.trim_start_matches('/').contains('/') => {
            let id = p.trim_start_matches('/').to_string();
            handle_update_site_visit(req, state, &id).await
        }

        _ => error_response(StatusCode::NOT_FOUND, "Not found", None),
    }
}

/// Get the site visits collection, or an error response
async fn site_visit_collection(
    state: &AppState,
) -> Result<MongoCollection<SiteVisitDoc>, Response<FullBody>> {
    let mongo = require_mongo(state)?;
    mongo
        .collection::<SiteVisitDoc>(SITE_VISIT_COLLECTION)
        .await
        .map_err(|e| {
            warn!("Error getting site visits collection: {}", e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Database error",
                Some("DB_ERROR"),
            )
        })
}

/// GET /api/site-visits
async fn handle_list_site_visits(state: Arc<AppState>) -> Response<FullBody> {
    let collection = match site_visit_collection(&state).await {
        Ok(c) => c,
        Err(resp) => return resp,
    };

    match collection.find_many(doc! {}).await {
        Ok(docs) => {
            let visits: Vec<SiteVisitResponse> = docs.into_iter().map(Into::into).collect();
            json_response(StatusCode::OK, &visits)
        }
        Err(e) => {
            warn!("Error listing site visits: {}", e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to list site visits",
                Some("DB_ERROR"),
            )
        }
    }
}

/// GET /api/site-visits/{id}
async fn handle_get_site_visit(state: Arc<AppState>, id: &str) -> Response<FullBody> {
    let oid = match parse_object_id(id) {
        Ok(o) => o,
        Err(resp) => return resp,
    };

    let collection = match site_visit_collection(&state).await {
        Ok(c) => c,
        Err(resp) => return resp,
    };

    match collection.find_one(doc! { "_id": oid }).await {
        Ok(Some(doc)) => json_response(StatusCode::OK, &SiteVisitResponse::from(doc)),
        Ok(None) => error_response(
            StatusCode::NOT_FOUND,
            &format!("No site visit with id '{}'", id),
            Some("NOT_FOUND"),
        ),
        Err(e) => {
            warn!("Error fetching site visit {}: {}", id, e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch site visit",
                Some("DB_ERROR"),
            )
        }
    }
}

/// POST /api/site-visits
async fn handle_create_site_visit(
    req: Request<Incoming>,
    state: Arc<AppState>,
) -> Response<FullBody> {
    let mut visit: SiteVisitDoc = match read_json_body(req).await {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    visit._id = None;

    let collection = match site_visit_collection(&state).await {
        Ok(c) => c,
        Err(resp) => return resp,
    };

    let id = match collection.insert_one(visit).await {
        Ok(id) => id,
        Err(e) => {
            warn!("Error creating site visit: {}", e);
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to create site visit",
                Some("DB_ERROR"),
            );
        }
    };

    match collection.find_one(doc! { "_id": id }).await {
        Ok(Some(doc)) => json_response(StatusCode::CREATED, &SiteVisitResponse::from(doc)),
        Ok(None) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Created site visit not found",
            Some("DB_ERROR"),
        ),
        Err(e) => {
            warn!("Error reading back site visit {}: {}", id, e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to read created site visit",
                Some("DB_ERROR"),
            )
        }
    }
}

/// PUT /api/site-visits/{id}
async fn handle_update_site_visit(
    req: Request<Incoming>,
    state: Arc<AppState>,
    id: &str,
) -> Response<FullBody> {
    let oid = match parse_object_id(id) {
        Ok(o) => o,
        Err(resp) => return resp,
    };

    let patch: UpdateSiteVisitRequest = match read_json_body(req).await {
        Ok(p) => p,
        Err(resp) => return resp,
    };

    let collection = match site_visit_collection(&state).await {
        Ok(c) => c,
        Err(resp) => return resp,
    };

    let mut set = patch.into_set_document();
    if !set.is_empty() {
        set.insert("metadata.updated_at", DateTime::now());

        let result = match collection.update_one(doc! { "_id": oid }, doc! { "$set": set }).await {
            Ok(r) => r,
            Err(e) => {
                warn!("Error updating site visit {}: {}", id, e);
                return error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to update site visit",
                    Some("DB_ERROR"),
                );
            }
        };

        if result.matched_count == 0 {
            return error_response(
                StatusCode::NOT_FOUND,
                &format!("No site visit with id '{}'", id),
                Some("NOT_FOUND"),
            );
        }
    }

    match collection.find_one(doc! { "_id": oid }).await {
        Ok(Some(doc)) => json_response(StatusCode::OK, &SiteVisitResponse::from(doc)),
        Ok(None) => error_response(
            StatusCode::NOT_FOUND,
            &format!("No site visit with id '{}'", id),
            Some("NOT_FOUND"),
        ),
        Err(e) => {
            warn!("Error reading back site visit {}: {}", id, e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to read updated site visit",
                Some("DB_ERROR"),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reschedule_patch_formats_timestamp() {
        let patch: UpdateSiteVisitRequest =
            serde_json::from_str(r#"{"scheduled_at": "2026-08-20T14:00:00Z", "status": "confirmed"}"#)
                .unwrap();
        let set = patch.into_set_document();
        assert_eq!(set.len(), 2);
        assert_eq!(set.get_str("scheduled_at").unwrap(), "2026-08-20T14:00:00+00:00");
        assert_eq!(set.get_str("status").unwrap(), "confirmed");
    }

    #[test]
    fn test_empty_patch_produces_empty_set_document() {
        let patch: UpdateSiteVisitRequest = serde_json::from_str("{}").unwrap();
        assert!(patch.into_set_document().is_empty());
    }
}
