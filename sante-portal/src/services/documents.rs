use super::fetch_list;
use crate::api::{segment, with_query, ApiClient};
use crate::error::Result;
use sante_core::records::{DocumentReview, MedicalDocument};
use sante_core::RecordId;
use serde_json::{json, Value};

#[derive(Clone)]
pub struct DocumentService {
    api: ApiClient,
}

impl DocumentService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn mine(&self, clinic_id: Option<&str>) -> Result<Vec<MedicalDocument>> {
        let path = with_query(
            "/patient/documents/",
            &[("clinic_id", clinic_id.map(str::to_string))],
        );
        fetch_list(&self.api, &path).await
    }

    pub async fn delete(&self, id: &RecordId) -> Result<()> {
        self.api
            .delete(&format!("/patient/document/{}/", segment(id)))
            .await?;
        tracing::info!(document_id = %id, "Document deleted");
        Ok(())
    }

    /// Share a document with a doctor for review
    pub async fn share(&self, id: &RecordId, doctor_id: &str) -> Result<()> {
        let path = format!("/patient/document/{}/share/", segment(id));
        let _: Value = self.api.post(&path, &json!({ "doctor_id": doctor_id })).await?;
        Ok(())
    }

    /// Documents shared with the signed-in doctor
    pub async fn review_queue(&self) -> Result<Vec<MedicalDocument>> {
        fetch_list(&self.api, "/doctor/documents/").await
    }

    pub async fn review(&self, id: &RecordId, review: &DocumentReview) -> Result<()> {
        let path = format!("/doctor/document/{}/review/", segment(id));
        let _: Value = self.api.patch(&path, review).await?;
        Ok(())
    }
}
