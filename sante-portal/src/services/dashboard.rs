//! Landing pages that aggregate several endpoints.
//!
//! Each fetch keeps its own result: one failing card does not blank the
//! rest of the page.

use super::medical::DEFAULT_STATS_DAYS;
use super::{ClinicService, LabService, MedicalService};
use crate::api::ApiClient;
use crate::error::Result;
use sante_core::records::{Alert, LabOrder, Severity, VitalsSummary};
use sante_core::{rank_clinics, top_doctors, GeoPoint, RankedClinic, User};

pub const ALERT_LIMIT: usize = 5;
pub const TOP_DOCTOR_LIMIT: usize = 3;

#[derive(Debug)]
pub struct PatientDashboard {
    pub vitals: Result<VitalsSummary>,
    pub alerts: Result<Vec<Alert>>,
    pub clinics: Result<Vec<RankedClinic>>,
    pub doctors: Result<Vec<User>>,
}

/// Counters on the clinic staff landing page. `None` when a count could not
/// be fetched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StaffDashboard {
    pub appointments: Option<usize>,
    pub doctors: Option<usize>,
    pub invoices: Option<usize>,
    pub requests: Option<usize>,
}

#[derive(Clone)]
pub struct DashboardService {
    api: ApiClient,
    medical: MedicalService,
    lab: LabService,
    clinics: ClinicService,
}

/// Pending lab orders shown as dashboard alerts
fn lab_alerts(orders: Vec<LabOrder>) -> Vec<Alert> {
    orders
        .into_iter()
        .filter(LabOrder::is_pending)
        .take(ALERT_LIMIT)
        .map(|order| Alert {
            id: order.id,
            mongo_id: order.mongo_id,
            message: format!("Analyse prescrite : {}", order.test_name),
            severity: Some(Severity::Medium),
            is_read: false,
            created_at: order
                .requested_at
                .or_else(|| Some(chrono::Utc::now().to_rfc3339())),
        })
        .collect()
}

fn counted<T>(what: &str, result: Result<Vec<T>>) -> Option<usize> {
    match result {
        Ok(items) => Some(items.len()),
        Err(e) => {
            tracing::warn!(card = what, error = %e, "Dashboard count failed");
            None
        }
    }
}

impl DashboardService {
    pub fn new(api: ApiClient) -> Self {
        Self {
            medical: MedicalService::new(api.clone()),
            lab: LabService::new(api.clone()),
            clinics: ClinicService::new(api.clone()),
            api,
        }
    }

    /// General patient dashboard. With `origin` clinics are ranked by
    /// distance, otherwise by rating.
    pub async fn patient(&self, origin: Option<GeoPoint>) -> PatientDashboard {
        let (vitals, orders, clinics, doctors) = tokio::join!(
            self.medical.stats(DEFAULT_STATS_DAYS),
            self.lab.patient_orders(),
            self.clinics.list(),
            super::fetch_list::<User>(&self.api, "/auth/doctors/list/"),
        );

        PatientDashboard {
            vitals,
            alerts: orders.map(lab_alerts),
            clinics: clinics.map(|c| rank_clinics(c, origin)),
            doctors: doctors.map(|d| top_doctors(d, None, Some(TOP_DOCTOR_LIMIT))),
        }
    }

    /// Clinic staff dashboard for `clinic_id`
    pub async fn staff(&self, clinic_id: &str) -> StaffDashboard {
        let appointments = super::AppointmentService::new(self.api.clone());
        let (appts, doctors, invoices, requests) = tokio::join!(
            appointments.for_clinic(clinic_id),
            self.clinics.doctors(clinic_id),
            self.clinics.invoices(clinic_id),
            self.clinics.requests(clinic_id),
        );

        StaffDashboard {
            appointments: counted("appointments", appts),
            doctors: counted("doctors", doctors),
            invoices: counted("invoices", invoices),
            requests: counted("requests", requests),
        }
    }
}
