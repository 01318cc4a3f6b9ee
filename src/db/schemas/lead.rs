//! Lead document schema
//!
//! A buyer inquiry: contact details, interest, and a mutable status.

use bson::{doc, Document, oid::ObjectId};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;

/// Collection name for leads
pub const LEAD_COLLECTION: &str = "leads";

/// Lead document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct LeadDoc {
    /// MongoDB document ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    /// Common metadata (created_at, updated_at)
    #[serde(default)]
    pub metadata: Metadata,

    /// Contact name
    pub name: String,

    /// Contact email
    pub email: String,

    /// Contact phone
    #[serde(default)]
    pub phone: Option<String>,

    /// Property the lead is interested in (unenforced reference)
    #[serde(default)]
    pub property_id: Option<String>,

    /// Free-form inquiry message
    #[serde(default)]
    pub message: Option<String>,

    /// Where the lead came from (website, referral, walk-in, ...)
    #[serde(default)]
    pub source: Option<String>,

    /// Lead status (new, contacted, qualified, closed, ...)
    #[serde(default = "default_lead_status")]
    pub status: String,
}

fn default_lead_status() -> String {
    "new".to_string()
}

impl IntoIndexes for LeadDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![
            // Index on email for contact lookups
            (
                doc! { "email": 1 },
                Some(
                    IndexOptions::builder()
                        .name("email_index".to_string())
                        .build(),
                ),
            ),
            // Index on status for pipeline queries
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

impl MutMetadata for LeadDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_defaults_to_new() {
        let doc: LeadDoc =
            serde_json::from_str(r#"{"name": "Asha Rao", "email": "asha@example.com"}"#).unwrap();
        assert_eq!(doc.status, "new");
        assert!(doc.property_id.is_none());
    }

    #[test]
    fn test_missing_email_is_rejected() {
        let result = serde_json::from_str::<LeadDoc>(r#"{"name": "Asha Rao"}"#);
        assert!(result.is_err());
    }
}
