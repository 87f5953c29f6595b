//! Report routes
//!
//! - api.rs: JSON report for charts and external consumers

pub mod api;

pub use api::{api_report, ReportResponse};
