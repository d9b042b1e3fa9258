//! Portal access for the volunteer desk.
//!
//! - `model`  : JSON shapes of the portal's API views
//! - `export` : export filters, sanitized filenames, download URLs
//! - `client` : `PortalApi` seam and its reqwest implementation

pub mod client;
pub mod error;
pub mod export;
pub mod model;

pub use client::{PortalApi, PortalClient};
pub use error::{PortalError, Result};
pub use export::{ExportFilters, ExportFormat, ExportRequest, Filename};
pub use model::{
    Category, CategoryId, DashboardStats, FormReceipt, Opportunity, OpportunityId,
    OpportunitySummary, PreviewPage,
};
