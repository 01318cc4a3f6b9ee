//! Property document schema
//!
//! A property listing: address, price, and descriptive attributes.

use bson::{doc, oid::ObjectId, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;

/// Collection name for properties
pub const PROPERTY_COLLECTION: &str = "properties";

/// Property document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct PropertyDoc {
    /// MongoDB document ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    /// Common metadata (created_at, updated_at)
    #[serde(default)]
    pub metadata: Metadata,

    /// Short listing title
    #[serde(default)]
    pub title: Option<String>,

    /// Street address
    pub address: String,

    /// City
    #[serde(default)]
    pub city: Option<String>,

    /// Asking price
    pub price: f64,

    /// Number of bedrooms
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bedrooms: Option<i32>,

    /// Number of bathrooms
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bathrooms: Option<i32>,

    /// Floor area in square feet
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area_sqft: Option<f64>,

    /// Free-form description
    #[serde(default)]
    pub description: Option<String>,

    /// Property type (apartment, house, plot, commercial, ...)
    #[serde(default)]
    pub property_type: Option<String>,

    /// Listing status (available, under_offer, sold, ...)
    #[serde(default = "default_property_status")]
    pub status: String,

    /// Image URLs
    #[serde(default)]
    pub images: Vec<String>,
}

fn default_property_status() -> String {
    "available".to_string()
}

impl IntoIndexes for PropertyDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![
            // Index on city for location filtering
            (
                doc! { "city": 1 },
                Some(IndexOptions::builder().name("city_index".to_string()).build()),
            ),
            // Index on status for listing queries
            (
                doc! { "status": 1 },
                Some(
                    IndexOptions::builder()
                        .name("status_index".to_string())
                        .build(),
                ),
            ),
        ]
    }
}

impl MutMetadata for PropertyDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_payload_deserializes_with_defaults() {
        let doc: PropertyDoc =
            serde_json::from_str(r#"{"address": "12 Oak St", "price": 250000}"#).unwrap();
        assert_eq!(doc.address, "12 Oak St");
        assert_eq!(doc.price, 250000.0);
        assert_eq!(doc.status, "available");
        assert!(doc.images.is_empty());
        assert!(doc._id.is_none());
    }

    #[test]
    fn test_missing_address_is_rejected() {
        let result = serde_json::from_str::<PropertyDoc>(r#"{"price": 250000}"#);
        assert!(result.is_err());
    }
}
