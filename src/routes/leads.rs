//! Lead routes
//!
//! ## Endpoints
//!
//! - `GET /api/leads` - List all leads
//! - `GET /api/leads/{id}` - Get a single lead
//! - `POST /api/leads` - Create a lead
//! - `PUT /api/leads/{id}` - Update a lead (partial)
//!
//! Leads expose no delete operation; the resource contract is
//! create/read/update only.

use bson::{doc, DateTime, Document};
use hyper::body::Incoming;
use hyper::{Method, Request, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

use crate::db::schemas::{LeadDoc, LEAD_COLLECTION};
use crate::db::MongoCollection;
use crate::routes::helpers::{
    error_response, json_response, parse_object_id, read_json_body, require_mongo, FullBody,
};
use crate::server::AppState;

/// Lead as returned on the wire
#[derive(Debug, Serialize, Deserialize)]
pub struct LeadResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl From<LeadDoc> for LeadResponse {
    fn from(doc: LeadDoc) -> Self {
        Self {
            id: doc._id.map(|o| o.to_hex()).unwrap_or_default(),
            name: doc.name,
            email: doc.email,
            phone: doc.phone,
            property_id: doc.property_id,
            message: doc.message,
            source: doc.source,
            status: doc.status,
            created_at: doc.metadata.created_at.map(|d| d.to_string()),
            updated_at: doc.metadata.updated_at.map(|d| d.to_string()),
        }
    }
}

/// Partial update for a lead
#[derive(Debug, Default, Deserialize)]
pub struct UpdateLeadRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub property_id: Option<String>,
    pub message: Option<String>,
    pub source: Option<String>,
    pub status: Option<String>,
}

impl UpdateLeadRequest {
    /// Build a `$set` document from the provided fields only
    pub fn into_set_document(self) -> Document {
        let mut set = Document::new();
        if let Some(v) = self.name {
            set.insert("name", v);
        }
        if let Some(v) = self.email {
            set.insert("email", v);
        }
        if let Some(v) = self.phone {
            set.insert("phone", v);
        }
        if let Some(v) = self.property_id {
            set.insert("property_id", v);
        }
        if let Some(v) = self.message {
            set.insert("message", v);
        }
        if let Some(v) = self.source {
            set.insert("source", v);
        }
        if let Some(v) = self.status {
            set.insert("status", v);
        }
        set
    }
}

/// Main handler for /api/leads/* routes
pub async fn handle_leads_request(
    req: Request<Incoming>,
    state: Arc<AppState>,
    path: &str,
) -> Response<FullBody> {
    let method = req.method().clone();
    let subpath = path.strip_prefix("/api/leads").unwrap_or("");

    match (method, subpath) {
        // GET /api/leads - List all leads
        (Method::GET, "") | (Method::GET, "/") => handle_list_leads(state).await,

        // POST /api/leads - Create a lead
        (Method::POST, "") | (Method::POST, "/") => handle_create_lead(req, state).await,

        // GET /api/leads/{id} - Get a single lead
        (Method::GET, p) if !p.trim_start_matches('/').contains('/') => {
            let id = p.trim_start_matches('/');
            handle_get_lead(state, id).await
        }

        // PUT /api/leads/{id} - Update a lead
        (Method::PUT, p) if !p.trim_start_matches('/').contains('/') => {
            let id = p.trim_start_matches('/').to_string();
            handle_update_lead(req, state, &id).await
        }

        _ => error_response(StatusCode::NOT_FOUND, "Not found", None),
    }
}

/// Get the leads collection, or an error response
async fn lead_collection(state: &AppState) -> Result<MongoCollection<LeadDoc>, Response<FullBody>> {
    let mongo = require_mongo(state)?;
    mongo.collection::<LeadDoc>(LEAD_COLLECTION).await.map_err(|e| {
        warn!("Error getting leads collection: {}", e);
        error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Database error",
            Some("DB_ERROR"),
        )
    })
}

/// GET /api/leads
async fn handle_list_leads(state: Arc<AppState>) -> Response<FullBody> {
    let collection = match lead_collection(&state).await {
        Ok(c) => c,
        Err(resp) => return resp,
    };

    match collection.find_many(doc! {}).await {
        Ok(docs) => {
            let leads: Vec<LeadResponse> = docs.into_iter().map(Into::into).collect();
            json_response(StatusCode::OK, &leads)
        }
        Err(e) => {
            warn!("Error listing leads: {}", e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to list leads",
                Some("DB_ERROR"),
            )
        }
    }
}

/// GET /api/leads/{id}
async fn handle_get_lead(state: Arc<AppState>, id: &str) -> Response<FullBody> {
    let oid = match parse_object_id(id) {
        Ok(o) => o,
        Err(resp) => return resp,
    };

    let collection = match lead_collection(&state).await {
        Ok(c) => c,
        Err(resp) => return resp,
    };

    match collection.find_one(doc! { "_id": oid }).await {
        Ok(Some(doc)) => json_response(StatusCode::OK, &LeadResponse::from(doc)),
        Ok(None) => error_response(
            StatusCode::NOT_FOUND,
            &format!("No lead with id '{}'", id),
            Some("NOT_FOUND"),
        ),
        Err(e) => {
            warn!("Error fetching lead {}: {}", id, e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch lead",
                Some("DB_ERROR"),
            )
        }
    }
}

/// POST /api/leads
async fn handle_create_lead(req: Request<Incoming>, state: Arc<AppState>) -> Response<FullBody> {
    let mut lead: LeadDoc = match read_json_body(req).await {
        Ok(l) => l,
        Err(resp) => return resp,
    };
    lead._id = None;

    let collection = match lead_collection(&state).await {
        Ok(c) => c,
        Err(resp) => return resp,
    };

    let id = match collection.insert_one(lead).await {
        Ok(id) => id,
        Err(e) => {
            warn!("Error creating lead: {}", e);
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to create lead",
                Some("DB_ERROR"),
            );
        }
    };

    match collection.find_one(doc! { "_id": id }).await {
        Ok(Some(doc)) => json_response(StatusCode::CREATED, &LeadResponse::from(doc)),
        Ok(None) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Created lead not found",
            Some("DB_ERROR"),
        ),
        Err(e) => {
            warn!("Error reading back lead {}: {}", id, e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to read created lead",
                Some("DB_ERROR"),
            )
        }
    }
}

/// PUT /api/leads/{id}
async fn handle_update_lead(
    req: Request<Incoming>,
    state: Arc<AppState>,
    id: &str,
) -> Response<FullBody> {
    let oid = match parse_object_id(id) {
        Ok(o) => o,
        Err(resp) => return resp,
    };

    let patch: UpdateLeadRequest = match read_json_body(req).await {
        Ok(p) => p,
        Err(resp) => return resp,
    };

    let collection = match lead_collection(&state).await {
        Ok(c) => c,
        Err(resp) => return resp,
    };

    let mut set = patch.into_set_document();
    if !set.is_empty() {
        set.insert("metadata.updated_at", DateTime::now());

        let result = match collection.update_one(doc! { "_id": oid }, doc! { "$set": set }).await {
            Ok(r) => r,
            Err(e) => {
                warn!("Error updating lead {}: {}", id, e);
                return error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to update lead",
                    Some("DB_ERROR"),
                );
            }
        };

        if result.matched_count == 0 {
            return error_response(
                StatusCode::NOT_FOUND,
                &format!("No lead with id '{}'", id),
                Some("NOT_FOUND"),
            );
        }
    }

    match collection.find_one(doc! { "_id": oid }).await {
        Ok(Some(doc)) => json_response(StatusCode::OK, &LeadResponse::from(doc)),
        Ok(None) => error_response(
            StatusCode::NOT_FOUND,
            &format!("No lead with id '{}'", id),
            Some("NOT_FOUND"),
        ),
        Err(e) => {
            warn!("Error reading back lead {}: {}", id, e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to read updated lead",
                Some("DB_ERROR"),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_only_patch() {
        let patch: UpdateLeadRequest =
            serde_json::from_str(r#"{"status": "contacted"}"#).unwrap();
        let set = patch.into_set_document();
        assert_eq!(set.len(), 1);
        assert_eq!(set.get_str("status").unwrap(), "contacted");
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let patch: UpdateLeadRequest =
            serde_json::from_str(r#"{"status": "qualified", "budget": 500000}"#).unwrap();
        let set = patch.into_set_document();
        assert_eq!(set.len(), 1);
        assert!(set.get("budget").is_none());
    }
}
