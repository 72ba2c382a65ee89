//! Clinic (tenant) records and their normalization.
//!
//! The enter, staff-link and listing endpoints all return clinics with
//! different subsets of fields and two spellings for the branding keys.
//! Everything is funnelled through [`ClinicPayload::into_clinic`] so the
//! rest of the client only ever sees a fully populated [`Clinic`].

use crate::{id::preferred_id, RecordId};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PRIMARY_COLOR: &str = "#14b8a6";

/// A tenant clinic with every branding and location field resolved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clinic {
    pub id: String,
    pub name: String,
    pub logo_url: String,
    pub primary_color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_color: Option<String>,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub rating: f64,
    pub review_count: u64,
    pub is_active: bool,
    pub created_at: String,
}

impl Clinic {
    /// Accent color: the secondary color, or the primary when unset
    pub fn accent_color(&self) -> &str {
        self.secondary_color
            .as_deref()
            .filter(|c| !c.is_empty())
            .unwrap_or(&self.primary_color)
    }
}

/// Where a clinic payload came from; decides the defaults applied to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClinicOrigin {
    /// Reply of the patient "enter clinic" action
    Entered,
    /// Clinic linked to a staff account
    StaffLink,
    /// Item of a clinic list
    Listing,
}

impl ClinicOrigin {
    fn default_rating(self) -> f64 {
        match self {
            ClinicOrigin::Entered => 4.5,
            ClinicOrigin::StaffLink => 4.8,
            ClinicOrigin::Listing => 0.0,
        }
    }

    fn inherits_accent(self) -> bool {
        self == ClinicOrigin::StaffLink
    }
}

/// Clinic as it arrives on the wire, every field optional
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClinicPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,

    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub mongo_id: Option<RecordId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, alias = "logo", skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,

    #[serde(default, alias = "primaryColor", skip_serializing_if = "Option::is_none")]
    pub primary_color: Option<String>,

    #[serde(default, alias = "secondaryColor", skip_serializing_if = "Option::is_none")]
    pub secondary_color: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_count: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

impl ClinicPayload {
    /// Fill in defaults for everything the backend left out.
    ///
    /// `requested_id` is the id the caller asked for; it is used when the
    /// reply carries no id of its own.
    pub fn into_clinic(self, origin: ClinicOrigin, requested_id: Option<&str>) -> Clinic {
        let id = preferred_id(self.mongo_id.as_ref(), self.id.as_ref())
            .map(|id| id.to_string())
            .or_else(|| requested_id.map(str::to_string))
            .unwrap_or_default();

        let primary_color =
            non_empty(self.primary_color).unwrap_or_else(|| DEFAULT_PRIMARY_COLOR.to_string());
        let secondary_color = match non_empty(self.secondary_color) {
            Some(color) => Some(color),
            None if origin.inherits_accent() => Some(primary_color.clone()),
            None => None,
        };

        Clinic {
            id,
            name: self.name.unwrap_or_default(),
            logo_url: self.logo_url.unwrap_or_default(),
            primary_color,
            secondary_color,
            address: self.address.unwrap_or_default(),
            phone: non_empty(self.phone),
            latitude: self.latitude.unwrap_or(0.0),
            longitude: self.longitude.unwrap_or(0.0),
            rating: self.rating.unwrap_or_else(|| origin.default_rating()),
            review_count: self.review_count.unwrap_or(0),
            is_active: self.is_active.unwrap_or(true),
            created_at: non_empty(self.created_at)
                .unwrap_or_else(|| chrono::Utc::now().to_rfc3339()),
        }
    }
}

/// Fields an administrator or clinic staff member may set on a clinic
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClinicDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

/// Whether a clinic id supplied by a caller can be used at all.
///
/// Empty ids and the literal `"undefined"` (what a missing id stringifies
/// to in browser code) are rejected.
pub fn usable_clinic_id(id: Option<&str>) -> Option<&str> {
    id.map(str::trim)
        .filter(|id| !id.is_empty() && *id != "undefined")
}
