//! Document storage accounting per user.
//!
//! Counters live in the local store only; the backend does not track them.

use crate::error::Result;
use sante_core::{PlanTier, StorageQuota};
use sante_store::{keys, KeyValueStore};
use std::sync::Arc;

pub struct UsageTracker {
    store: Arc<dyn KeyValueStore>,
    username: String,
    quota: StorageQuota,
}

impl UsageTracker {
    /// Load the persisted counters of `username`. Unreadable values fall
    /// back to the free plan and zero usage.
    pub fn load(store: Arc<dyn KeyValueStore>, username: impl Into<String>) -> Result<Self> {
        let username = username.into();
        let plan = match store.get(&keys::saas_plan(&username))? {
            Some(raw) => raw.parse::<PlanTier>().unwrap_or_else(|e| {
                tracing::warn!(username = %username, error = %e, "Ignoring persisted plan");
                PlanTier::default()
            }),
            None => PlanTier::default(),
        };
        let used = store
            .get(&keys::saas_usage(&username))?
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .unwrap_or(0);

        Ok(Self {
            store,
            username,
            quota: StorageQuota::new(plan, used),
        })
    }

    pub fn quota(&self) -> StorageQuota {
        self.quota
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Account for an upload of `size` bytes; refused when it does not fit
    pub fn upload(&mut self, size: u64) -> Result<()> {
        self.quota.reserve(size)?;
        self.save()
    }

    pub fn delete(&mut self, size: u64) -> Result<()> {
        self.quota.release(size);
        self.save()
    }

    pub fn upgrade(&mut self, plan: PlanTier) -> Result<()> {
        self.quota.upgrade(plan);
        tracing::info!(username = %self.username, plan = %plan, "Plan changed");
        self.save()
    }

    fn save(&self) -> Result<()> {
        self.store
            .set(&keys::saas_usage(&self.username), &self.quota.used.to_string())?;
        self.store
            .set(&keys::saas_plan(&self.username), self.quota.plan.as_str())?;
        Ok(())
    }
}
