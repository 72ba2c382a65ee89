//! Fetch and mutate calls behind each portal view.
//!
//! One service per area. Services are thin: they build paths, pick the
//! payload type and unwrap list envelopes. Scoping by clinic is explicit,
//! callers pass the id they want.

pub mod admin;
pub mod appointments;
pub mod chat;
pub mod clinics;
pub mod dashboard;
pub mod doctors;
pub mod documents;
pub mod lab;
pub mod medical;
pub mod usage;

pub use admin::AdminService;
pub use appointments::AppointmentService;
pub use chat::ChatService;
pub use clinics::ClinicService;
pub use dashboard::{DashboardService, PatientDashboard, StaffDashboard};
pub use doctors::DoctorService;
pub use documents::DocumentService;
pub use lab::LabService;
pub use medical::MedicalService;
pub use usage::UsageTracker;

use crate::api::ApiClient;
use crate::error::{ApiError, Result};
use sante_core::unwrap_list;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// GET a list endpoint, bare or wrapped
pub(crate) async fn fetch_list<T: DeserializeOwned>(api: &ApiClient, path: &str) -> Result<Vec<T>> {
    let reply: Value = api.get(path).await?;
    Ok(unwrap_list(reply).map_err(ApiError::from)?)
}

/// `{"is_active": value}` body used by the toggle endpoints
pub(crate) fn active_flag(value: bool) -> Value {
    serde_json::json!({ "is_active": value })
}
