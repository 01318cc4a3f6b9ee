//! Database schemas for Veranda
//!
//! Defines MongoDB document structures for properties, leads, and site visits.

mod lead;
mod metadata;
mod property;
mod site_visit;

pub use lead::{LeadDoc, LEAD_COLLECTION};
pub use metadata::Metadata;
pub use property::{PropertyDoc, PROPERTY_COLLECTION};
pub use site_visit::{SiteVisitDoc, SITE_VISIT_COLLECTION};
