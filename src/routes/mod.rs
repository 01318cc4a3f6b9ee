//! HTTP routes for Veranda

pub mod health;
pub mod helpers;
pub mod leads;
pub mod properties;
pub mod site_visits;
pub mod static_files;

pub use health::{health_check, version_info, HealthResponse};
pub use helpers::DeleteResponse;
pub use leads::{handle_leads_request, LeadResponse};
pub use properties::{handle_properties_request, PropertyResponse};
pub use site_visits::{handle_site_visits_request, SiteVisitResponse};
pub use static_files::serve_static;
