//! Navigation guard.
//!
//! One pure function decides, for every navigation, whether the target
//! view renders or where the user is sent instead. Nothing here touches the
//! network or storage, so the whole policy is testable from tables.

use crate::routes::{paths, RouteEntry, RouteGroup, RouteTable, View};
use crate::Role;

/// Session and tenancy facts the guard needs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NavigationState {
    /// A bearer token is present
    pub authenticated: bool,
    /// The profile request for the current token has not finished yet
    pub loading: bool,
    /// Role from the profile, or the persisted role cache
    pub role: Option<Role>,
    /// A clinic is currently entered / linked
    pub in_clinic: bool,
}

impl NavigationState {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn signed_in(role: Role) -> Self {
        Self {
            authenticated: true,
            loading: false,
            role: Some(role),
            in_clinic: false,
        }
    }

    pub fn with_clinic(mut self, in_clinic: bool) -> Self {
        self.in_clinic = in_clinic;
        self
    }
}

/// Outcome of a navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Render(RouteEntry),
    Redirect(&'static str),
    /// The role is not known yet; show a loading state and ask again.
    Pending,
}

impl Decision {
    pub fn view(&self) -> Option<View> {
        match self {
            Decision::Render(entry) => Some(entry.view),
            _ => None,
        }
    }

    pub fn redirect_target(&self) -> Option<&'static str> {
        match self {
            Decision::Redirect(path) => Some(path),
            _ => None,
        }
    }
}

/// Tenancy split inside the patient portal.
///
/// A patient who has entered a clinic is kept in the branded subtree; one
/// who has not cannot open it.
pub fn tenancy_redirect(role: Role, in_clinic: bool, view: View) -> Option<&'static str> {
    if role != Role::Patient {
        return None;
    }
    match view {
        View::PatientDashboard | View::RecommendedClinics if in_clinic => {
            Some(paths::CLINIC_PATIENT_DASHBOARD)
        }
        View::ClinicPatientDashboard
        | View::ClinicDoctors
        | View::ClinicBooking
        | View::ClinicRecords
        | View::ClinicPatientInvoices
            if !in_clinic =>
        {
            Some(paths::PATIENT_DASHBOARD)
        }
        _ => None,
    }
}

/// Decide what a navigation to `path` shows.
pub fn resolve(table: &RouteTable, path: &str, state: &NavigationState) -> Decision {
    let Some(entry) = table.lookup(path) else {
        return Decision::Redirect(paths::LANDING);
    };

    if entry.group == RouteGroup::Public {
        return Decision::Render(*entry);
    }

    if !state.authenticated {
        return Decision::Redirect(paths::LOGIN);
    }

    let Some(role) = state.role else {
        return if state.loading {
            Decision::Pending
        } else {
            Decision::Redirect(paths::LOGIN)
        };
    };

    if !entry.group.allows(role) {
        return Decision::Redirect(role.home_path());
    }

    if let Some(target) = tenancy_redirect(role, state.in_clinic, entry.view) {
        return Decision::Redirect(target);
    }

    Decision::Render(*entry)
}
