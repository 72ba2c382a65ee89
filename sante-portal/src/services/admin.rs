use super::{active_flag, fetch_list};
use crate::api::{segment, with_query, ApiClient};
use crate::error::Result;
use sante_core::records::Plan;
use sante_core::{RecordId, Registration, Role, User};
use serde::Serialize;
use serde_json::Value;

/// Platform administration: accounts and subscription plans
#[derive(Clone)]
pub struct AdminService {
    api: ApiClient,
}

impl AdminService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn users(&self, role: Option<Role>) -> Result<Vec<User>> {
        let path = with_query("/admin/users/", &[("role", role.map(|r| r.as_str().to_string()))]);
        fetch_list(&self.api, &path).await
    }

    pub async fn update_user<B>(&self, id: &RecordId, patch: &B) -> Result<User>
    where
        B: Serialize + ?Sized,
    {
        Ok(self.api.patch(&format!("/admin/users/{}/", segment(id)), patch).await?)
    }

    pub async fn toggle_user(&self, id: &RecordId, currently_active: bool) -> Result<()> {
        let path = format!("/admin/users/{}/", segment(id));
        let _: Value = self.api.patch(&path, &active_flag(!currently_active)).await?;
        Ok(())
    }

    pub async fn delete_user(&self, id: &RecordId) -> Result<()> {
        self.api.delete(&format!("/admin/users/{}/", segment(id))).await?;
        tracing::info!(user_id = %id, "User deleted");
        Ok(())
    }

    /// Create an account on someone else's behalf; no sign-in follows
    pub async fn create_user(&self, registration: &Registration) -> Result<()> {
        let _: Value = self.api.post("/auth/register/", registration).await?;
        tracing::info!(username = %registration.username, "User created");
        Ok(())
    }

    pub async fn doctors(&self) -> Result<Vec<User>> {
        fetch_list(&self.api, "/auth/doctors/list/").await
    }

    pub async fn patients(&self) -> Result<Vec<User>> {
        fetch_list(&self.api, "/patients/").await
    }

    pub async fn plans(&self) -> Result<Vec<Plan>> {
        fetch_list(&self.api, "/plans/").await
    }

    pub async fn create_plan(&self, plan: &Plan) -> Result<Plan> {
        Ok(self.api.post("/plans/", plan).await?)
    }

    pub async fn update_plan(&self, id: &RecordId, plan: &Plan) -> Result<Plan> {
        Ok(self.api.patch(&format!("/plans/{}/", segment(id)), plan).await?)
    }

    pub async fn toggle_plan(&self, id: &RecordId, currently_active: bool) -> Result<()> {
        let path = format!("/plans/{}/", segment(id));
        let _: Value = self.api.patch(&path, &active_flag(!currently_active)).await?;
        Ok(())
    }

    pub async fn delete_plan(&self, id: &RecordId) -> Result<()> {
        self.api.delete(&format!("/plans/{}/", segment(id))).await?;
        Ok(())
    }
}
