//! Clinic tenancy.
//!
//! Tracks the clinic the user is working in. Patients enter a clinic
//! explicitly; staff accounts are linked to one and get it resolved from
//! their username. The active clinic's branding is published as a
//! [`Theme`] on a watch channel.

use crate::api::{segment, ApiClient};
use crate::error::{PortalError, Result};
use crate::session::SessionSnapshot;
use sante_core::{usable_clinic_id, Branding, Clinic, ClinicOrigin, ClinicPayload, Role, Theme, User};
use sante_store::{keys, read_json, write_json, KeyValueStore};
use serde_json::json;
use std::sync::{Arc, RwLock};
use tokio::sync::watch;
use tokio::task::JoinHandle;

pub struct ClinicContext {
    api: ApiClient,
    store: Arc<dyn KeyValueStore>,
    branding: Branding,
    current: RwLock<Tenancy>,
    theme_tx: watch::Sender<Theme>,
}

#[derive(Default)]
struct Tenancy {
    clinic: Option<Clinic>,
    /// Bumped on every exit; lookups started before one are not applied
    generation: u64,
}

impl ClinicContext {
    pub fn new(api: ApiClient, store: Arc<dyn KeyValueStore>, branding: Branding) -> Self {
        let (theme_tx, _) = watch::channel(Theme::neutral(&branding));
        Self {
            api,
            store,
            branding,
            current: RwLock::new(Tenancy::default()),
            theme_tx,
        }
    }

    /// Load the persisted clinic. Unreadable entries are ignored.
    pub fn restore(&self) -> Option<Clinic> {
        let clinic = match read_json::<Clinic>(self.store.as_ref(), keys::CURRENT_CLINIC) {
            Ok(clinic) => clinic,
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring persisted clinic");
                None
            }
        };
        if let Some(clinic) = &clinic {
            tracing::debug!(clinic_id = %clinic.id, "Clinic restored");
        }
        self.write_tenancy().clinic = clinic.clone();
        self.publish_theme();
        clinic
    }

    pub fn current(&self) -> Option<Clinic> {
        self.read_tenancy().clinic.clone()
    }

    pub fn clinic_id(&self) -> Option<String> {
        self.read_tenancy().clinic.as_ref().map(|c| c.id.clone())
    }

    pub fn is_active(&self) -> bool {
        self.read_tenancy().clinic.is_some()
    }

    /// Enter a clinic as a patient.
    ///
    /// A missing, blank or `"undefined"` id leaves tenancy untouched and
    /// returns the current clinic. On failure tenancy is also untouched, and
    /// a reply that arrives after [`ClinicContext::exit_clinic`] is dropped.
    pub async fn enter_clinic(&self, id: Option<&str>) -> Result<Option<Clinic>> {
        let Some(id) = usable_clinic_id(id) else {
            tracing::debug!(requested = ?id, "Ignoring enter without a clinic id");
            return Ok(self.current());
        };

        let generation = self.generation();
        let path = format!("/clinics/{}/enter/", segment(id));
        let payload: ClinicPayload = match self.api.post(&path, &json!({})).await {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!(clinic_id = id, error = %e, "Failed to enter clinic");
                return Err(e.into());
            }
        };

        let clinic = payload.into_clinic(ClinicOrigin::Entered, Some(id));
        self.apply(generation, clinic.clone())?;
        tracing::info!(clinic_id = %clinic.id, name = %clinic.name, "Entered clinic");
        Ok(Some(clinic))
    }

    /// Leave the current clinic
    pub fn exit_clinic(&self) -> Result<()> {
        {
            let mut tenancy = self.write_tenancy();
            tenancy.generation += 1;
            if let Some(clinic) = &tenancy.clinic {
                tracing::info!(clinic_id = %clinic.id, "Left clinic");
            }
        }
        self.set_current(None)
    }

    /// Fetch the clinic linked to a staff account.
    ///
    /// Non-staff users get `Ok(None)` and tenancy is left as is.
    pub async fn resolve_for_staff(&self, user: &User) -> Result<Option<Clinic>> {
        if !user.role.is_clinic_staff() {
            return Ok(None);
        }
        let generation = self.generation();
        let path = format!("/clinics/staff/{}/clinic/", segment(&user.username));
        let payload: ClinicPayload = self.api.get(&path).await?;
        let clinic = payload.into_clinic(ClinicOrigin::StaffLink, None);
        self.apply(generation, clinic.clone())?;
        tracing::info!(username = %user.username, clinic_id = %clinic.id, "Staff clinic resolved");
        Ok(Some(clinic))
    }

    /// Bring tenancy in line with a session change.
    ///
    /// Ended sessions clear tenancy. Staff sessions resolve their clinic;
    /// a failure is logged and leaves tenancy unset.
    pub async fn resolve_for_session(&self, session: &SessionSnapshot) -> Option<Clinic> {
        if !session.authenticated {
            if self.is_active()
                && let Err(e) = self.exit_clinic()
            {
                tracing::warn!(error = %e, "Failed to clear clinic");
            }
            return None;
        }

        match &session.user {
            Some(user) if user.role.is_clinic_staff() => {
                match self.resolve_for_staff(user).await {
                    Ok(clinic) => clinic,
                    Err(e) => {
                        tracing::warn!(username = %user.username, error = %e, "Staff clinic lookup failed");
                        None
                    }
                }
            }
            _ => self.current(),
        }
    }

    /// Follow session changes in the background.
    ///
    /// Staff lookups run once per signed-in identity, not on every snapshot.
    pub fn spawn_staff_resolver(
        self: Arc<Self>,
        mut sessions: watch::Receiver<SessionSnapshot>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut last: Option<(String, Role)> = None;
            loop {
                let snapshot = sessions.borrow_and_update().clone();
                let identity = snapshot
                    .user
                    .as_ref()
                    .filter(|_| snapshot.authenticated)
                    .map(|u| (u.username.clone(), u.role));

                if identity != last || !snapshot.authenticated {
                    self.resolve_for_session(&snapshot).await;
                    last = identity;
                }

                if sessions.changed().await.is_err() {
                    break;
                }
            }
            tracing::debug!("Staff clinic resolver stopped");
        })
    }

    /// Theme for the current tenancy
    pub fn theme(&self) -> Theme {
        self.theme_tx.borrow().clone()
    }

    pub fn subscribe_theme(&self) -> watch::Receiver<Theme> {
        self.theme_tx.subscribe()
    }

    fn generation(&self) -> u64 {
        self.read_tenancy().generation
    }

    /// Make `clinic` current unless tenancy was exited since `generation`
    fn apply(&self, generation: u64, clinic: Clinic) -> Result<()> {
        {
            let mut tenancy = self.write_tenancy();
            if tenancy.generation != generation {
                tracing::debug!(clinic_id = %clinic.id, "Dropping clinic reply after exit");
                return Err(PortalError::TenancyEnded);
            }
            write_json(self.store.as_ref(), keys::CURRENT_CLINIC, &clinic)?;
            tenancy.clinic = Some(clinic);
        }
        self.publish_theme();
        Ok(())
    }

    fn set_current(&self, clinic: Option<Clinic>) -> Result<()> {
        {
            let mut tenancy = self.write_tenancy();
            match &clinic {
                Some(clinic) => write_json(self.store.as_ref(), keys::CURRENT_CLINIC, clinic)?,
                None => {
                    self.store.remove(keys::CURRENT_CLINIC)?;
                }
            }
            tenancy.clinic = clinic;
        }
        self.publish_theme();
        Ok(())
    }

    fn publish_theme(&self) {
        let theme = Theme::resolve(self.read_tenancy().clinic.as_ref(), &self.branding);
        self.theme_tx.send_if_modified(|old| {
            if *old == theme {
                false
            } else {
                *old = theme;
                true
            }
        });
    }

    fn read_tenancy(&self) -> std::sync::RwLockReadGuard<'_, Tenancy> {
        self.current.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_tenancy(&self) -> std::sync::RwLockWriteGuard<'_, Tenancy> {
        self.current.write().unwrap_or_else(|e| e.into_inner())
    }
}
