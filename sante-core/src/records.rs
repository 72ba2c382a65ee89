//! Per-view domain records.
//!
//! These mirror backend documents; the client enforces nothing beyond
//! optional-field defaults. Unknown fields survive in `extra`.

use crate::{id::preferred_id, PlanTier, RecordId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

macro_rules! record_id_accessor {
    ($ty:ty) => {
        impl $ty {
            /// Id usable in a request path
            pub fn record_id(&self) -> Option<RecordId> {
                preferred_id(self.mongo_id.as_ref(), self.id.as_ref())
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Pending,
    Scheduled,
    Confirmed,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub mongo_id: Option<RecordId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doctor: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appointment_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<AppointmentStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clinic_id: Option<RecordId>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
record_id_accessor!(Appointment);

/// Booking request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAppointment {
    pub doctor: Value,
    pub appointment_date: String,
    #[serde(default)]
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clinic_id: Option<String>,
}

/// One vitals measurement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicalRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub mongo_id: Option<RecordId>,
    #[serde(default)]
    pub systolic: Option<f64>,
    #[serde(default)]
    pub diastolic: Option<f64>,
    #[serde(default)]
    pub glucose: Option<f64>,
    #[serde(default)]
    pub heart_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recorded_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
record_id_accessor!(MedicalRecord);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewMedicalRecord {
    pub systolic: f64,
    pub diastolic: f64,
    pub glucose: f64,
    pub heart_rate: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct VitalRange {
    #[serde(default)]
    pub avg: Option<f64>,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
}

/// Aggregates over a window of measurements
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VitalsSummary {
    #[serde(default)]
    pub systolic: VitalRange,
    #[serde(default)]
    pub diastolic: VitalRange,
    #[serde(default)]
    pub glucose: VitalRange,
    #[serde(default)]
    pub heart_rate: VitalRange,
}

impl VitalsSummary {
    /// The stats endpoint answers `{summary, series}` or the bare summary.
    pub fn from_reply(reply: Value) -> serde_json::Result<Self> {
        match reply {
            Value::Object(mut map) if map.contains_key("summary") => {
                serde_json::from_value(map.remove("summary").unwrap_or(Value::Null))
            }
            other => serde_json::from_value(other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub mongo_id: Option<RecordId>,
    pub message: String,
    #[serde(default, alias = "level", skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    #[serde(default)]
    pub is_read: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}
record_id_accessor!(Alert);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicalDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub mongo_id: Option<RecordId>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub document_type: Option<String>,
    #[serde(default)]
    pub uploaded_at: Option<String>,
    #[serde(default)]
    pub file_url: Option<String>,
    /// Size in bytes
    #[serde(default)]
    pub file_size: u64,
    #[serde(default)]
    pub status: Option<DocumentStatus>,
    #[serde(default)]
    pub doctor_username: Option<String>,
    #[serde(default)]
    pub patient_name: Option<String>,
    #[serde(default)]
    pub ai_summary: Option<String>,
    #[serde(default)]
    pub shared_with: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
record_id_accessor!(MedicalDocument);

/// Doctor verdict on a shared document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentReview {
    pub status: DocumentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabOrderStatus {
    Pending,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabOrder {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub mongo_id: Option<RecordId>,
    #[serde(default)]
    pub test_name: String,
    #[serde(default)]
    pub status: Option<LabOrderStatus>,
    #[serde(default)]
    pub patient_username: Option<String>,
    #[serde(default)]
    pub patient_name: Option<String>,
    #[serde(default, alias = "ordered_at")]
    pub requested_at: Option<String>,
    #[serde(default)]
    pub recommended_clinic_id: Option<String>,
    #[serde(default)]
    pub result_file: Option<String>,
    #[serde(default)]
    pub ai_summary: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
record_id_accessor!(LabOrder);

impl LabOrder {
    pub fn is_pending(&self) -> bool {
        self.status == Some(LabOrderStatus::Pending)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewLabOrder {
    pub patient_username: String,
    pub test_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommended_clinic_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabOrderUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<LabOrderStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub mongo_id: Option<RecordId>,
    #[serde(default)]
    pub invoice_number: Option<String>,
    #[serde(default)]
    pub patient_username: Option<String>,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub issued_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
record_id_accessor!(Invoice);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewInvoice {
    pub patient_username: String,
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Patient request waiting for clinic staff
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClinicRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub mongo_id: Option<RecordId>,
    #[serde(default)]
    pub patient_username: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
record_id_accessor!(ClinicRequest);

/// Link between a user account and a clinic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClinicStaffLink {
    pub clinic_id: String,
    pub user_username: String,
    /// admin, receptionist or billing
    pub role: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub mongo_id: Option<RecordId>,
    pub name: PlanTier,
    #[serde(default)]
    pub price_monthly: f64,
    #[serde(default)]
    pub price_yearly: f64,
    #[serde(default)]
    pub storage_limit: u64,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub max_users: u32,
    #[serde(default = "default_true")]
    pub is_active: bool,
}
record_id_accessor!(Plan);

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoctorDashboardStats {
    #[serde(default)]
    pub patient_count: u64,
    #[serde(default)]
    pub appointment_count: u64,
}
