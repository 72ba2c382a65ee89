//! Names of the persisted client-state entries.

pub const ACCESS_TOKEN: &str = "access_token";
pub const REFRESH_TOKEN: &str = "refresh_token";
pub const USER_ROLE: &str = "user_role";
pub const CURRENT_CLINIC: &str = "currentClinic";

/// Subscription tier chosen by a user
pub fn saas_plan(username: &str) -> String {
    format!("saas_plan_{}", username)
}

/// Bytes of document storage used by a user
pub fn saas_usage(username: &str) -> String {
    format!("saas_usage_{}", username)
}

/// Entries removed when a session ends
pub const SESSION_KEYS: &[&str] = &[ACCESS_TOKEN, REFRESH_TOKEN, USER_ROLE];
