use super::fetch_list;
use crate::api::{segment, with_query, ApiClient};
use crate::error::{ApiError, Result};
use sante_core::records::{Alert, MedicalRecord, NewMedicalRecord, VitalsSummary};
use sante_core::RecordId;
use serde_json::{json, Value};

/// Stats window of the patient dashboard, in days
pub const DEFAULT_STATS_DAYS: u32 = 30;

/// Vitals measurements, their aggregates and the alerts raised on them
#[derive(Clone)]
pub struct MedicalService {
    api: ApiClient,
}

impl MedicalService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn records(&self, clinic_id: Option<&str>) -> Result<Vec<MedicalRecord>> {
        let path = with_query("/records/", &[("clinic_id", clinic_id.map(str::to_string))]);
        fetch_list(&self.api, &path).await
    }

    pub async fn add_record(&self, record: &NewMedicalRecord) -> Result<MedicalRecord> {
        Ok(self.api.post("/records/", record).await?)
    }

    /// Most recent measurement; `None` when the patient has none yet
    pub async fn latest(&self) -> Result<Option<MedicalRecord>> {
        match self.api.get::<Option<MedicalRecord>>("/records/latest/").await {
            Ok(record) => Ok(record),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn stats(&self, days: u32) -> Result<VitalsSummary> {
        let reply: Value = self.api.get(&format!("/records/stats/?days={}", days)).await?;
        Ok(VitalsSummary::from_reply(reply).map_err(ApiError::from)?)
    }

    pub async fn alerts(&self) -> Result<Vec<Alert>> {
        fetch_list(&self.api, "/alerts/").await
    }

    pub async fn acknowledge_alert(&self, id: &RecordId) -> Result<()> {
        let path = format!("/alerts/{}/acknowledge/", segment(id));
        let _: Value = self.api.post(&path, &json!({})).await?;
        Ok(())
    }
}
