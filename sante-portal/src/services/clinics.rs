use super::{active_flag, fetch_list};
use crate::api::{segment, with_query, ApiClient};
use crate::error::Result;
use sante_core::records::{ClinicRequest, ClinicStaffLink, Invoice, NewInvoice};
use sante_core::{Clinic, ClinicDraft, ClinicOrigin, ClinicPayload, GeoPoint, User};
use serde_json::{json, Map, Value};

/// Clinic directory and the clinic-side operations of staff
#[derive(Clone)]
pub struct ClinicService {
    api: ApiClient,
}

fn normalize(payloads: Vec<ClinicPayload>) -> Vec<Clinic> {
    payloads
        .into_iter()
        .map(|p| p.into_clinic(ClinicOrigin::Listing, None))
        .collect()
}

impl ClinicService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list(&self) -> Result<Vec<Clinic>> {
        Ok(normalize(fetch_list(&self.api, "/clinics/").await?))
    }

    /// Clinics suggested to the patient, near `origin` when given
    pub async fn recommended(&self, origin: Option<GeoPoint>) -> Result<Vec<Clinic>> {
        let path = with_query(
            "/clinics/recommended/",
            &[
                ("lat", origin.map(|o| o.lat.to_string())),
                ("lng", origin.map(|o| o.lng.to_string())),
            ],
        );
        Ok(normalize(fetch_list(&self.api, &path).await?))
    }

    pub async fn create(&self, draft: &ClinicDraft) -> Result<Clinic> {
        let payload: ClinicPayload = self.api.post("/clinics/", draft).await?;
        let clinic = payload.into_clinic(ClinicOrigin::Listing, None);
        tracing::info!(clinic_id = %clinic.id, name = %clinic.name, "Clinic created");
        Ok(clinic)
    }

    pub async fn update(&self, id: &str, draft: &ClinicDraft) -> Result<Clinic> {
        let path = format!("/clinics/{}/", segment(id));
        let payload: ClinicPayload = self.api.patch(&path, draft).await?;
        Ok(payload.into_clinic(ClinicOrigin::Listing, Some(id)))
    }

    /// Flip the active flag, given the current one
    pub async fn toggle_active(&self, id: &str, currently_active: bool) -> Result<()> {
        let path = format!("/clinics/{}/", segment(id));
        let _: Value = self.api.patch(&path, &active_flag(!currently_active)).await?;
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.api.delete(&format!("/clinics/{}/", segment(id))).await?;
        tracing::info!(clinic_id = id, "Clinic deleted");
        Ok(())
    }

    pub async fn doctors(&self, clinic_id: &str) -> Result<Vec<User>> {
        fetch_list(&self.api, &format!("/clinics/{}/doctorslist/", segment(clinic_id))).await
    }

    pub async fn associate_doctor(&self, clinic_id: &str, doctor_id: &str) -> Result<()> {
        let path = format!("/clinics/{}/doctors/associate/", segment(clinic_id));
        let _: Value = self.api.post(&path, &json!({ "doctor_id": doctor_id })).await?;
        Ok(())
    }

    /// Create a doctor account already attached to the clinic.
    ///
    /// `profile` carries the account fields (username, password, names,
    /// specialty, ...); clinic, role and verification are set here.
    pub async fn create_doctor(&self, clinic_id: &str, mut profile: Map<String, Value>) -> Result<User> {
        profile.insert("clinic".to_string(), json!(clinic_id));
        profile.insert("role".to_string(), json!("doctor"));
        profile.insert("is_verified".to_string(), json!(false));
        profile.entry("rating").or_insert(json!(0.0));
        let doctor: User = self
            .api
            .post("/doctors/create-for-clinic/", &Value::Object(profile))
            .await?;
        tracing::info!(clinic_id, username = %doctor.username, "Doctor created for clinic");
        Ok(doctor)
    }

    pub async fn requests(&self, clinic_id: &str) -> Result<Vec<ClinicRequest>> {
        fetch_list(&self.api, &format!("/clinics/{}/requests/", segment(clinic_id))).await
    }

    /// Complete a request with its results
    pub async fn process_request(&self, clinic_id: &str, request_id: &str, results: Map<String, Value>) -> Result<()> {
        let path = format!(
            "/clinics/{}/requests/{}/process/",
            segment(clinic_id),
            segment(request_id)
        );
        let body = json!({ "results": results, "status": "completed" });
        let _: Value = self.api.post(&path, &body).await?;
        Ok(())
    }

    pub async fn invoices(&self, clinic_id: &str) -> Result<Vec<Invoice>> {
        fetch_list(&self.api, &format!("/clinics/{}/invoices/", segment(clinic_id))).await
    }

    pub async fn create_invoice(&self, clinic_id: &str, invoice: &NewInvoice) -> Result<Invoice> {
        let path = format!("/clinics/{}/invoices/create/", segment(clinic_id));
        let body = json!({
            "patient_username": invoice.patient_username,
            "amount": invoice.amount,
            "description": invoice.description,
            "status": "pending",
            "issued_at": chrono::Utc::now().to_rfc3339(),
        });
        Ok(self.api.post(&path, &body).await?)
    }

    /// Attach a user account to a clinic as staff
    pub async fn link_staff(&self, link: &ClinicStaffLink) -> Result<()> {
        let _: Value = self.api.post("/clinic/staff/", link).await?;
        tracing::info!(clinic_id = %link.clinic_id, username = %link.user_username, "Staff linked");
        Ok(())
    }
}
