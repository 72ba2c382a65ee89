use super::fetch_list;
use crate::api::{segment, with_query, ApiClient};
use crate::error::Result;
use sante_core::records::{Appointment, AppointmentStatus, NewAppointment};
use sante_core::RecordId;
use serde_json::json;

#[derive(Clone)]
pub struct AppointmentService {
    api: ApiClient,
}

impl AppointmentService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Appointments of the signed-in user, optionally within one clinic
    pub async fn mine(&self, clinic_id: Option<&str>) -> Result<Vec<Appointment>> {
        let path = with_query(
            "/medical/appointments/",
            &[("clinic_id", clinic_id.map(str::to_string))],
        );
        fetch_list(&self.api, &path).await
    }

    pub async fn book(&self, appointment: &NewAppointment) -> Result<Appointment> {
        let created = self.api.post("/medical/appointments/", appointment).await?;
        tracing::info!(date = %appointment.appointment_date, "Appointment booked");
        Ok(created)
    }

    pub async fn set_status(&self, id: &RecordId, status: AppointmentStatus) -> Result<Appointment> {
        let path = format!("/medical/appointments/{}/", segment(id));
        Ok(self.api.patch(&path, &json!({ "status": status })).await?)
    }

    /// Next appointments for the doctor dashboard
    pub async fn upcoming(&self, limit: usize) -> Result<Vec<Appointment>> {
        let path = format!("/medical/appointments/?limit={}&upcoming=true", limit);
        fetch_list(&self.api, &path).await
    }

    pub async fn all(&self) -> Result<Vec<Appointment>> {
        fetch_list(&self.api, "/all/appointments/").await
    }

    /// Administrative update of any appointment
    pub async fn update(&self, id: &RecordId, status: AppointmentStatus) -> Result<Appointment> {
        let path = format!("/appointments/{}/", segment(id));
        Ok(self.api.patch(&path, &json!({ "status": status })).await?)
    }

    pub async fn for_clinic(&self, clinic_id: &str) -> Result<Vec<Appointment>> {
        let path = format!("/clinics/{}/appointments/", segment(clinic_id));
        fetch_list(&self.api, &path).await
    }
}
