//! Site visit document schema
//!
//! A scheduled viewing linking a property and a lead. Neither reference is
//! enforced by the application.

use bson::{doc, Document, oid::ObjectId};
use chrono::{DateTime, Utc};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;

/// Collection name for site visits
pub const SITE_VISIT_COLLECTION: &str = "site_visits";

/// Site visit document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct SiteVisitDoc {
    /// MongoDB document ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    /// Common metadata (created_at, updated_at)
    #[serde(default)]
    pub metadata: Metadata,

    /// Property being visited (unenforced reference)
    pub property_id: String,

    /// Lead making the visit (unenforced reference)
    #[serde(default)]
    pub lead_id: Option<String>,

    /// When the visit is scheduled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_at: Option<DateTime<Utc>>,

    /// Free-form notes for the visit
    #[serde(default)]
    pub notes: Option<String>,

    /// Visit status (scheduled, completed, cancelled, ...)
    #[serde(default = "default_visit_status")]
    pub status: String,
}

fn default_visit_status() -> String {
    "scheduled".to_string()
}

impl IntoIndexes for SiteVisitDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![
            // Index on property_id for per-listing schedules
            (
                doc! { "property_id": 1 },
                Some(
                    IndexOptions::builder()
                        .name("property_id_index".to_string())
                        .build(),
                ),
            ),
            // Index on status for schedule queries
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

impl MutMetadata for SiteVisitDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_defaults_to_scheduled() {
        let doc: SiteVisitDoc = serde_json::from_str(
            r#"{"property_id": "665f1c2ab1e8f94d3c0a7712", "lead_id": "665f1c2ab1e8f94d3c0a7713"}"#,
        )
        .unwrap();
        assert_eq!(doc.status, "scheduled");
        assert!(doc.scheduled_at.is_none());
    }

    #[test]
    fn test_scheduled_at_parses_rfc3339() {
        let doc: SiteVisitDoc = serde_json::from_str(
            r#"{"property_id": "p1", "scheduled_at": "2026-08-15T10:30:00Z"}"#,
        )
        .unwrap();
        let ts = doc.scheduled_at.expect("scheduled_at should parse");
        assert_eq!(ts.to_rfc3339(), "2026-08-15T10:30:00+00:00");
    }
}
