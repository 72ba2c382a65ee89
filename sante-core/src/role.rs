use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Portal role of the signed-in user.
///
/// A flat tag: it decides which route subtree and sidebar a user sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Patient,
    Doctor,
    ClinicStaff,
    ClinicAdmin,
    Admin,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Patient,
        Role::Doctor,
        Role::ClinicStaff,
        Role::ClinicAdmin,
        Role::Admin,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Patient => "patient",
            Role::Doctor => "doctor",
            Role::ClinicStaff => "clinic_staff",
            Role::ClinicAdmin => "clinic_admin",
            Role::Admin => "admin",
        }
    }

    /// Staff roles are bound to exactly one clinic.
    pub fn is_clinic_staff(&self) -> bool {
        matches!(self, Role::ClinicStaff | Role::ClinicAdmin)
    }

    /// Landing path for this role. The only role → home table in the crate;
    /// every guard redirect goes through it.
    pub fn home_path(&self) -> &'static str {
        match self {
            Role::Doctor => crate::routes::paths::DOCTOR_DASHBOARD,
            Role::Admin => crate::routes::paths::ADMIN_DASHBOARD,
            Role::ClinicStaff | Role::ClinicAdmin => crate::routes::paths::CLINIC_DASHBOARD,
            Role::Patient => crate::routes::paths::PATIENT_DASHBOARD,
        }
    }

    /// Short label shown under the product name.
    pub fn portal_label(&self) -> &'static str {
        match self {
            Role::Patient => "Patient Portal",
            Role::Doctor => "Doctor Portal",
            Role::ClinicStaff | Role::ClinicAdmin => "Clinic Portal",
            Role::Admin => "Admin Portal",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|r| r.as_str() == s.trim())
            .ok_or_else(|| CoreError::UnknownRole(s.to_string()))
    }
}
