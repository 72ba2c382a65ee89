use crate::{id::preferred_id, RecordId, Role};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// User profile as returned by the profile and user-list endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,

    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub mongo_id: Option<RecordId>,

    pub username: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,

    pub role: Role,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specialty: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consultation_price: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    /// Profile fields this client does not interpret
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl User {
    pub fn new(username: impl Into<String>, role: Role) -> Self {
        Self {
            id: None,
            mongo_id: None,
            username: username.into(),
            email: None,
            first_name: None,
            last_name: None,
            role,
            is_active: None,
            phone: None,
            specialty: None,
            rating: None,
            consultation_price: None,
            address: None,
            extra: Map::new(),
        }
    }

    pub fn record_id(&self) -> Option<RecordId> {
        preferred_id(self.mongo_id.as_ref(), self.id.as_ref())
    }

    /// "First Last", falling back to the username
    pub fn display_name(&self) -> String {
        let full = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.trim().is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if full.is_empty() {
            self.username.clone()
        } else {
            full
        }
    }

    /// Avatar initial
    pub fn initial(&self) -> char {
        self.first_name
            .as_deref()
            .and_then(|s| s.chars().next())
            .or_else(|| self.username.chars().next())
            .unwrap_or('U')
    }

    pub fn active(&self) -> bool {
        self.is_active.unwrap_or(true)
    }
}

/// Username/password pair posted to the login endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Account creation payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Registration {
    pub username: String,
    pub password: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Registration {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            email: None,
            first_name: None,
            last_name: None,
            role: None,
            extra: Map::new(),
        }
    }

    /// The subset needed to sign in right after registering
    pub fn credentials(&self) -> Credentials {
        Credentials::new(&self.username, &self.password)
    }
}

/// Login reply.
///
/// Token endpoints answer either `{access, refresh}` or `{token, user}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub access: Option<String>,

    #[serde(default)]
    pub refresh: Option<String>,

    #[serde(default)]
    pub token: Option<String>,

    #[serde(default)]
    pub user: Option<User>,
}

impl AuthResponse {
    pub fn access_token(&self) -> Option<&str> {
        self.access
            .as_deref()
            .or(self.token.as_deref())
            .filter(|t| !t.is_empty())
    }
}

/// Reply of the token refresh endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenRefresh {
    pub access: String,

    #[serde(default)]
    pub refresh: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_profile_keeps_unknown_fields() {
        let json = r#"{
            "_id": "665f1c",
            "username": "amira",
            "email": "amira@example.com",
            "first_name": "Amira",
            "last_name": null,
            "role": "patient",
            "blood_type": "O+"
        }"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.role, Role::Patient);
        assert_eq!(user.record_id(), Some(RecordId::from("665f1c")));
        assert_eq!(user.display_name(), "Amira");
        assert_eq!(user.extra["blood_type"], "O+");
    }

    #[test]
    fn test_display_name_falls_back_to_username() {
        let user = User::new("staff1", Role::ClinicStaff);
        assert_eq!(user.display_name(), "staff1");
        assert_eq!(user.initial(), 's');
    }

    #[test]
    fn test_access_token_shapes() {
        let jwt: AuthResponse = serde_json::from_str(r#"{"access":"a1","refresh":"r1"}"#).unwrap();
        assert_eq!(jwt.access_token(), Some("a1"));

        let legacy: AuthResponse =
            serde_json::from_str(r#"{"token":"t1","user":{"username":"d","role":"doctor"}}"#)
                .unwrap();
        assert_eq!(legacy.access_token(), Some("t1"));
        assert_eq!(legacy.user.unwrap().role, Role::Doctor);

        let empty: AuthResponse = serde_json::from_str(r#"{"token":""}"#).unwrap();
        assert_eq!(empty.access_token(), None);
    }

    #[test]
    fn test_registration_credentials() {
        let mut reg = Registration::new("nour", "s3cret");
        reg.role = Some(Role::Patient);
        let body = serde_json::to_value(&reg).unwrap();
        assert_eq!(body["role"], "patient");
        assert!(body.get("email").is_none());
        assert_eq!(reg.credentials(), Credentials::new("nour", "s3cret"));
    }
}
