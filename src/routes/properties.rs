//! Property routes
//!
//! ## Endpoints
//!
//! - `GET /api/properties` - List all properties
//! - `GET /api/properties/{id}` - Get a single property
//! - `POST /api/properties` - Create a property
//! - `PUT /api/properties/{id}` - Update a property (partial)
//! - `DELETE /api/properties/{id}` - Delete a property

use bson::{doc, DateTime, Document};
use hyper::body::Incoming;
use hyper::{Method, Request, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

use crate::db::schemas::{PropertyDoc, PROPERTY_COLLECTION};
use crate::db::MongoCollection;
use crate::routes::helpers::{
    error_response, json_response, parse_object_id, read_json_body, require_mongo, DeleteResponse,
    FullBody,
};
use crate::server::AppState;

/// Property as returned on the wire
#[derive(Debug, Serialize, Deserialize)]
pub struct PropertyResponse {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bedrooms: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bathrooms: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area_sqft: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property_type: Option<String>,
    pub status: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl From<PropertyDoc> for PropertyResponse {
    fn from(doc: PropertyDoc) -> Self {
        Self {
            id: doc._id.map(|o| o.to_hex()).unwrap_or_default(),
            title: doc.title,
            address: doc.address,
            city: doc.city,
            price: doc.price,
            bedrooms: doc.bedrooms,
            bathrooms: doc.bathrooms,
            area_sqft: doc.area_sqft,
            description: doc.description,
            property_type: doc.property_type,
            status: doc.status,
            images: doc.images,
            created_at: doc.metadata.created_at.map(|d| d.to_string()),
            updated_at: doc.metadata.updated_at.map(|d| d.to_string()),
        }
    }
}

/// Partial update for a property
#[derive(Debug, Default, Deserialize)]
pub struct UpdatePropertyRequest {
    pub title: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub price: Option<f64>,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,
    pub area_sqft: Option<f64>,
    pub description: Option<String>,
    pub property_type: Option<String>,
    pub status: Option<String>,
    pub images: Option<Vec<String>>,
}

impl UpdatePropertyRequest {
    /// Build a `$set` document from the provided fields only
    pub fn into_set_document(self) -> Document {
        let mut set = Document::new();
        if let Some(v) = self.title {
            set.insert("title", v);
        }
        if let Some(v) = self.address {
            set.insert("address", v);
        }
        if let Some(v) = self.city {
            set.insert("city", v);
        }
        if let Some(v) = self.price {
            set.insert("price", v);
        }
        if let Some(v) = self.bedrooms {
            set.insert("bedrooms", v);
        }
        if let Some(v) = self.bathrooms {
            set.insert("bathrooms", v);
        }
        if let Some(v) = self.area_sqft {
            set.insert("area_sqft", v);
        }
        if let Some(v) = self.description {
            set.insert("description", v);
        }
        if let Some(v) = self.property_type {
            set.insert("property_type", v);
        }
        if let Some(v) = self.status {
            set.insert("status", v);
        }
        if let Some(v) = self.images {
            set.insert("images", v);
        }
        set
    }
}

/// Main handler for /api/properties/* routes
pub async fn handle_properties_request(
    req: Request<Incoming>,
    state: Arc<AppState>,
    path: &str,
) -> Response<FullBody> {
    let method = req.method().clone();
    let subpath = path.strip_prefix("/api/properties").unwrap_or("");

    match (method, subpath) {
        // GET /api/properties - List all properties
        (Method::GET, "") | (Method::GET, "/") => handle_list_properties(state).await,

        // POST /api/properties - Create a property
        (Method::POST, "") | (Method::POST, "/") => handle_create_property(req, state).await,

        // GET /api/properties/{id} - Get a single property
        (Method::GET, p) if !p.trim_start_matches('/').contains('/') => {
            let id = p.trim_start_matches('/');
            handle_get_property(state, id).await
        }

        // PUT /api/properties/{id} - Update a property
        (Method::PUT, p) if !p.trim_start_matches('/').contains('/') => {
            let id = p.trim_start_matches('/').to_string();
            handle_update_property(req, state, &id).await
        }

        // DELETE /api/properties/{id} - Delete a property
        (Method::DELETE, p) if !p.trim_start_matches('/').contains('/') => {
            let id = p.trim_start_matches('/');
            handle_delete_property(state, id).await
        }

        _ => error_response(StatusCode::NOT_FOUND, "Not found", None),
    }
}

/// Get the properties collection, or an error response
async fn property_collection(
    state: &AppState,
) -> Result<MongoCollection<PropertyDoc>, Response<FullBody>> {
    let mongo = require_mongo(state)?;
    mongo
        .collection::<PropertyDoc>(PROPERTY_COLLECTION)
        .await
        .map_err(|e| {
            warn!("Error getting properties collection: {}", e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Database error",
                Some("DB_ERROR"),
            )
        })
}

/// GET /api/properties
async fn handle_list_properties(state: Arc<AppState>) -> Response<FullBody> {
    let collection = match property_collection(&state).await {
        Ok(c) => c,
        Err(resp) => return resp,
    };

    match collection.find_many(doc! {}).await {
        Ok(docs) => {
            let properties: Vec<PropertyResponse> = docs.into_iter().map(Into::into).collect();
            json_response(StatusCode::OK, &properties)
        }
        Err(e) => {
            warn!("Error listing properties: {}", e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to list properties",
                Some("DB_ERROR"),
            )
        }
    }
}

/// GET /api/properties/{id}
async fn handle_get_property(state: Arc<AppState>, id: &str) -> Response<FullBody> {
    let oid = match parse_object_id(id) {
        Ok(o) => o,
        Err(resp) => return resp,
    };

    let collection = match property_collection(&state).await {
        Ok(c) => c,
        Err(resp) => return resp,
    };

    match collection.find_one(doc! { "_id": oid }).await {
        Ok(Some(doc)) => json_response(StatusCode::OK, &PropertyResponse::from(doc)),
        Ok(None) => error_response(
            StatusCode::NOT_FOUND,
            &format!("No property with id '{}'", id),
            Some("NOT_FOUND"),
        ),
        Err(e) => {
            warn!("Error fetching property {}: {}", id, e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch property",
                Some("DB_ERROR"),
            )
        }
    }
}

/// POST /api/properties
async fn handle_create_property(req: Request<Incoming>, state: Arc<AppState>) -> Response<FullBody> {
    let mut property: PropertyDoc = match read_json_body(req).await {
        Ok(p) => p,
        Err(resp) => return resp,
    };
    property._id = None;

    let collection = match property_collection(&state).await {
        Ok(c) => c,
        Err(resp) => return resp,
    };

    let id = match collection.insert_one(property).await {
        Ok(id) => id,
        Err(e) => {
            warn!("Error creating property: {}", e);
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to create property",
                Some("DB_ERROR"),
            );
        }
    };

    // Return the stored document including its generated id
    match collection.find_one(doc! { "_id": id }).await {
        Ok(Some(doc)) => json_response(StatusCode::CREATED, &PropertyResponse::from(doc)),
        Ok(None) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Created property not found",
            Some("DB_ERROR"),
        ),
        Err(e) => {
            warn!("Error reading back property {}: {}", id, e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to read created property",
                Some("DB_ERROR"),
            )
        }
    }
}

/// PUT /api/properties/{id}
async fn handle_update_property(
    req: Request<Incoming>,
    state: Arc<AppState>,
    id: &str,
) -> Response<FullBody> {
    let oid = match parse_object_id(id) {
        Ok(o) => o,
        Err(resp) => return resp,
    };

    let patch: UpdatePropertyRequest = match read_json_body(req).await {
        Ok(p) => p,
        Err(resp) => return resp,
    };

    let collection = match property_collection(&state).await {
        Ok(c) => c,
        Err(resp) => return resp,
    };

    let mut set = patch.into_set_document();
    if !set.is_empty() {
        set.insert("metadata.updated_at", DateTime::now());

        let result = match collection.update_one(doc! { "_id": oid }, doc! { "$set": set }).await {
            Ok(r) => r,
            Err(e) => {
                warn!("Error updating property {}: {}", id, e);
                return error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to update property",
                    Some("DB_ERROR"),
                );
            }
        };

        if result.matched_count == 0 {
            return error_response(
                StatusCode::NOT_FOUND,
                &format!("No property with id '{}'", id),
                Some("NOT_FOUND"),
            );
        }
    }

    // Return the updated document (empty patch is a no-op read)
    match collection.find_one(doc! { "_id": oid }).await {
        Ok(Some(doc)) => json_response(StatusCode::OK, &PropertyResponse::from(doc)),
        Ok(None) => error_response(
            StatusCode::NOT_FOUND,
            &format!("No property with id '{}'", id),
            Some("NOT_FOUND"),
        ),
        Err(e) => {
            warn!("Error reading back property {}: {}", id, e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to read updated property",
                Some("DB_ERROR"),
            )
        }
    }
}

/// DELETE /api/properties/{id}
async fn handle_delete_property(state: Arc<AppState>, id: &str) -> Response<FullBody> {
    let oid = match parse_object_id(id) {
        Ok(o) => o,
        Err(resp) => return resp,
    };

    let collection = match property_collection(&state).await {
        Ok(c) => c,
        Err(resp) => return resp,
    };

    match collection.delete_one(doc! { "_id": oid }).await {
        Ok(result) if result.deleted_count == 0 => error_response(
            StatusCode::NOT_FOUND,
            &format!("No property with id '{}'", id),
            Some("NOT_FOUND"),
        ),
        Ok(_) => json_response(
            StatusCode::OK,
            &DeleteResponse {
                success: true,
                message: "Property deleted".to_string(),
            },
        ),
        Err(e) => {
            warn!("Error deleting property {}: {}", id, e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to delete property",
                Some("DB_ERROR"),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_document_includes_only_provided_fields() {
        let patch: UpdatePropertyRequest =
            serde_json::from_str(r#"{"price": 260000, "status": "under_offer"}"#).unwrap();
        let set = patch.into_set_document();
        assert_eq!(set.len(), 2);
        assert_eq!(set.get_f64("price").unwrap(), 260000.0);
        assert_eq!(set.get_str("status").unwrap(), "under_offer");
        assert!(set.get("address").is_none());
    }

    #[test]
    fn test_empty_patch_produces_empty_set_document() {
        let patch: UpdatePropertyRequest = serde_json::from_str("{}").unwrap();
        assert!(patch.into_set_document().is_empty());
    }

    #[test]
    fn test_response_maps_id_to_hex() {
        let oid = bson::oid::ObjectId::parse_str("665f1c2ab1e8f94d3c0a7712").unwrap();
        let doc = PropertyDoc {
            _id: Some(oid),
            address: "12 Oak St".to_string(),
            price: 250000.0,
            status: "available".to_string(),
            ..Default::default()
        };
        let resp = PropertyResponse::from(doc);
        assert_eq!(resp.id, "665f1c2ab1e8f94d3c0a7712");
        assert_eq!(resp.address, "12 Oak St");
        assert_eq!(resp.price, 250000.0);
    }
}
