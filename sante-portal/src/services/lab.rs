use super::fetch_list;
use crate::api::{segment, ApiClient};
use crate::error::Result;
use sante_core::records::{LabOrder, LabOrderUpdate, NewLabOrder};
use sante_core::RecordId;

#[derive(Clone)]
pub struct LabService {
    api: ApiClient,
}

impl LabService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn order(&self, order: &NewLabOrder) -> Result<LabOrder> {
        let created = self.api.post("/lab/order/", order).await?;
        tracing::info!(patient = %order.patient_username, test = %order.test_name, "Lab order placed");
        Ok(created)
    }

    /// Orders placed by the signed-in doctor
    pub async fn doctor_orders(&self) -> Result<Vec<LabOrder>> {
        fetch_list(&self.api, "/lab/my-orders/").await
    }

    /// Orders concerning the signed-in patient
    pub async fn patient_orders(&self) -> Result<Vec<LabOrder>> {
        fetch_list(&self.api, "/lab-orders/patient/").await
    }

    pub async fn clinic_orders(&self, clinic_id: &str) -> Result<Vec<LabOrder>> {
        fetch_list(&self.api, &format!("/clinics/{}/lab-orders/", segment(clinic_id))).await
    }

    pub async fn update(&self, id: &RecordId, update: &LabOrderUpdate) -> Result<LabOrder> {
        Ok(self.api.patch(&format!("/lab/order/{}/", segment(id)), update).await?)
    }
}
