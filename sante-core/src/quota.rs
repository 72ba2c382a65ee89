use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const MIB: u64 = 1024 * 1024;
const GIB: u64 = 1024 * MIB;

/// Subscription tier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    #[default]
    Free,
    Pro,
    Enterprise,
}

impl PlanTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanTier::Free => "free",
            PlanTier::Pro => "pro",
            PlanTier::Enterprise => "enterprise",
        }
    }

    /// Document storage allowance in bytes
    pub fn storage_limit(&self) -> u64 {
        match self {
            PlanTier::Free => 50 * MIB,
            PlanTier::Pro => GIB,
            PlanTier::Enterprise => 10 * GIB,
        }
    }
}

impl fmt::Display for PlanTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlanTier {
    type Err = CoreError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "free" => Ok(PlanTier::Free),
            "pro" => Ok(PlanTier::Pro),
            "enterprise" => Ok(PlanTier::Enterprise),
            other => Err(CoreError::UnknownPlan(other.to_string())),
        }
    }
}

/// Per-user document storage accounting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StorageQuota {
    pub plan: PlanTier,
    pub used: u64,
}

impl StorageQuota {
    pub fn new(plan: PlanTier, used: u64) -> Self {
        Self { plan, used }
    }

    pub fn limit(&self) -> u64 {
        self.plan.storage_limit()
    }

    pub fn available(&self) -> u64 {
        self.limit().saturating_sub(self.used)
    }

    /// Share of the allowance in use, capped at 100
    pub fn usage_percentage(&self) -> f64 {
        (self.used as f64 / self.limit() as f64 * 100.0).min(100.0)
    }

    /// Account for an upload. Fails without changing anything when the
    /// upload does not fit.
    pub fn reserve(&mut self, size: u64) -> Result<()> {
        if size > self.available() {
            return Err(CoreError::QuotaExceeded {
                requested: size,
                available: self.available(),
            });
        }
        self.used += size;
        Ok(())
    }

    /// Account for a deletion
    pub fn release(&mut self, size: u64) {
        self.used = self.used.saturating_sub(size);
    }

    pub fn upgrade(&mut self, plan: PlanTier) {
        self.plan = plan;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserve_within_limit() {
        let mut quota = StorageQuota::default();
        quota.reserve(10 * MIB).unwrap();
        assert_eq!(quota.used, 10 * MIB);
        assert_eq!(quota.usage_percentage(), 20.0);
    }

    #[test]
    fn test_reserve_over_limit_is_rejected() {
        let mut quota = StorageQuota::new(PlanTier::Free, 45 * MIB);
        let err = quota.reserve(6 * MIB).unwrap_err();
        assert!(matches!(err, CoreError::QuotaExceeded { available, .. } if available == 5 * MIB));
        assert_eq!(quota.used, 45 * MIB);

        // Exactly filling the allowance is fine
        quota.reserve(5 * MIB).unwrap();
        assert_eq!(quota.available(), 0);
    }

    #[test]
    fn test_release_saturates() {
        let mut quota = StorageQuota::new(PlanTier::Pro, 100);
        quota.release(1000);
        assert_eq!(quota.used, 0);
    }

    #[test]
    fn test_upgrade_and_percentage_cap() {
        let mut quota = StorageQuota::new(PlanTier::Free, 80 * MIB);
        assert_eq!(quota.usage_percentage(), 100.0);
        quota.upgrade(PlanTier::Pro);
        assert!(quota.usage_percentage() < 10.0);
        assert_eq!("enterprise".parse::<PlanTier>().unwrap().storage_limit(), 10 * GIB);
    }
}
