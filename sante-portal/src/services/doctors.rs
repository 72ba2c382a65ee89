use super::fetch_list;
use crate::api::{segment, ApiClient};
use crate::error::Result;
use sante_core::records::DoctorDashboardStats;
use sante_core::{top_doctors, RecordId, User};

/// Rating floor of the recommended doctors page
pub const RECOMMENDED_MIN_RATING: f64 = 4.0;

#[derive(Clone)]
pub struct DoctorService {
    api: ApiClient,
}

impl DoctorService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn dashboard_stats(&self) -> Result<DoctorDashboardStats> {
        Ok(self.api.get("/doctor/dashboard/").await?)
    }

    pub async fn profile(&self, username: &str) -> Result<User> {
        Ok(self.api.get(&format!("/doctors/profile/{}/", segment(username))).await?)
    }

    pub async fn patient_profile(&self, username: &str) -> Result<User> {
        Ok(self.api.get(&format!("/patients/profile/{}/", segment(username))).await?)
    }

    pub async fn patients(&self) -> Result<Vec<User>> {
        fetch_list(&self.api, "/patients/").await
    }

    pub async fn delete_patient(&self, id: &RecordId) -> Result<()> {
        self.api.delete(&format!("/patients/{}/", segment(id))).await?;
        tracing::info!(patient_id = %id, "Patient deleted");
        Ok(())
    }

    /// Doctors rated 4.0 and up, best first
    pub async fn recommended(&self) -> Result<Vec<User>> {
        let doctors = fetch_list(&self.api, "/auth/doctors/list/").await?;
        Ok(top_doctors(doctors, Some(RECOMMENDED_MIN_RATING), None))
    }
}
