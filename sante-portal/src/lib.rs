//! sante-portal - client layer of the Dawini health portals
//!
//! Session, clinic tenancy, role-gated navigation and the per-view API
//! calls of the patient, clinic staff, doctor and admin portals.

pub mod api;
pub mod config;
pub mod error;
pub mod scope;
pub mod services;
pub mod session;
pub mod tenancy;

use api::ApiClient;
use config::PortalConfig;
use error::{PortalError, Result};
use sante_core::{
    resolve, sidebar_links, Clinic, Credentials, Decision, NavLink, NavigationState, Registration,
    RouteTable, Theme, User,
};
use sante_store::{KeyValueStore, RedbStore};
use scope::ViewScope;
use services::{
    AdminService, AppointmentService, ChatService, ClinicService, DashboardService, DoctorService,
    DocumentService, LabService, MedicalService, UsageTracker,
};
use session::{AuthSession, SessionSnapshot};
use std::sync::Arc;
use tenancy::ClinicContext;
use tokio::task::JoinHandle;

/// Everything a portal host needs, wired to one API and one state store
pub struct Portal {
    pub config: PortalConfig,
    api: ApiClient,
    store: Arc<dyn KeyValueStore>,
    session: Arc<AuthSession>,
    clinic: Arc<ClinicContext>,
    routes: RouteTable,
}

impl Portal {
    /// Open the portal with its redb state file under the data directory
    pub fn open(config: PortalConfig) -> Result<Self> {
        std::fs::create_dir_all(&config.storage.data_dir).map_err(|e| {
            PortalError::Config(format!(
                "cannot create data dir {}: {}",
                config.storage.data_dir.display(),
                e
            ))
        })?;
        let store = RedbStore::open(config.state_db_path())?;
        Ok(Self::with_store(config, Arc::new(store)))
    }

    pub fn with_store(config: PortalConfig, store: Arc<dyn KeyValueStore>) -> Self {
        let api = ApiClient::new(config.api.base_url.clone());
        let session = Arc::new(AuthSession::new(
            api.clone(),
            store.clone(),
            config.session.clone(),
        ));
        let clinic = Arc::new(ClinicContext::new(
            api.clone(),
            store.clone(),
            config.branding.clone(),
        ));
        Self {
            config,
            api,
            store,
            session,
            clinic,
            routes: RouteTable::standard(),
        }
    }

    /// Restore persisted state and settle the session.
    ///
    /// The profile is fetched when a token exists; staff accounts then get
    /// their clinic resolved. Failures of either step are logged and the
    /// best known state is returned.
    pub async fn load(&self) -> Result<SessionSnapshot> {
        self.session.restore()?;
        self.clinic.restore();

        if let Err(e) = self.session.refresh_profile().await {
            tracing::warn!(error = %e, "Session not refreshed");
        }
        let snapshot = self.session.snapshot();
        self.clinic.resolve_for_session(&snapshot).await;
        Ok(snapshot)
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<User> {
        let user = self.session.login(credentials).await?;
        self.clinic.resolve_for_session(&self.session.snapshot()).await;
        Ok(user)
    }

    pub async fn register(&self, registration: &Registration) -> Result<User> {
        let user = self.session.register(registration).await?;
        self.clinic.resolve_for_session(&self.session.snapshot()).await;
        Ok(user)
    }

    /// End the session and leave any clinic
    pub fn logout(&self) -> Result<()> {
        self.session.logout();
        self.clinic.exit_clinic()
    }

    pub async fn enter_clinic(&self, id: Option<&str>) -> Result<Option<Clinic>> {
        self.clinic.enter_clinic(id).await
    }

    pub fn exit_clinic(&self) -> Result<()> {
        self.clinic.exit_clinic()
    }

    pub fn navigation_state(&self) -> NavigationState {
        self.session.snapshot().navigation(self.clinic.is_active())
    }

    /// Decide what navigating to `path` shows
    pub fn navigate(&self, path: &str) -> Decision {
        let state = self.navigation_state();
        let decision = resolve(&self.routes, path, &state);
        tracing::debug!(path, role = ?state.role, decision = ?decision, "Navigation");
        decision
    }

    /// Sidebar of the signed-in role; empty while the role is unknown
    pub fn sidebar(&self) -> &'static [NavLink] {
        match self.session.role() {
            Some(role) => sidebar_links(role, self.clinic.is_active()),
            None => &[],
        }
    }

    pub fn theme(&self) -> Theme {
        self.clinic.theme()
    }

    /// Keep tenancy following session changes in the background
    pub fn spawn_staff_resolver(&self) -> JoinHandle<()> {
        self.clinic.clone().spawn_staff_resolver(self.session.subscribe())
    }

    pub fn session(&self) -> &AuthSession {
        &self.session
    }

    pub fn clinic(&self) -> &ClinicContext {
        &self.clinic
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Fresh scope for the fetches of one view
    pub fn scope(&self) -> ViewScope {
        ViewScope::new()
    }

    /// Current clinic id, or `NoClinic`
    pub fn require_clinic(&self) -> Result<String> {
        self.clinic.clinic_id().ok_or(PortalError::NoClinic)
    }

    /// Storage counters of the signed-in user
    pub fn usage(&self) -> Result<UsageTracker> {
        let user = self.session.user().ok_or(PortalError::NotSignedIn)?;
        UsageTracker::load(self.store.clone(), user.username)
    }

    pub fn appointments(&self) -> AppointmentService {
        AppointmentService::new(self.api.clone())
    }

    pub fn medical(&self) -> MedicalService {
        MedicalService::new(self.api.clone())
    }

    pub fn documents(&self) -> DocumentService {
        DocumentService::new(self.api.clone())
    }

    pub fn lab(&self) -> LabService {
        LabService::new(self.api.clone())
    }

    pub fn clinics(&self) -> ClinicService {
        ClinicService::new(self.api.clone())
    }

    pub fn admin(&self) -> AdminService {
        AdminService::new(self.api.clone())
    }

    pub fn doctors(&self) -> DoctorService {
        DoctorService::new(self.api.clone())
    }

    pub fn chat(&self) -> ChatService {
        ChatService::new(self.api.clone())
    }

    pub fn dashboard(&self) -> DashboardService {
        DashboardService::new(self.api.clone())
    }
}
