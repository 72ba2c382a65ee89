use sante_core::CoreError;
use sante_store::StoreError;
use serde_json::Value;
use thiserror::Error;

/// Failure of a single API call
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("API returned {status}: {}", message_of(.payload))]
    Status { status: u16, payload: Value },

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

fn message_of(payload: &Value) -> String {
    ["error", "detail", "message"]
        .iter()
        .find_map(|key| payload.get(*key).and_then(Value::as_str))
        .map(str::to_string)
        .or_else(|| payload.as_str().map(str::to_string))
        .unwrap_or_else(|| payload.to_string())
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Human readable message from the server payload
    pub fn message(&self) -> String {
        match self {
            ApiError::Status { payload, .. } => message_of(payload),
            other => other.to_string(),
        }
    }
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Sign-in rejected: {message}")]
    Rejected { status: u16, message: String },

    #[error("Login reply carried no access token")]
    MissingToken,

    #[error("No refresh token stored")]
    MissingRefreshToken,

    #[error("Session ended before the reply arrived")]
    SessionEnded,

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AuthError {
    /// Map a failed login/register call: credential problems become
    /// `Rejected`, everything else stays an API error.
    pub(crate) fn from_login(err: ApiError) -> Self {
        match err.status() {
            Some(status @ (400 | 401 | 403)) => AuthError::Rejected {
                status,
                message: err.message(),
            },
            _ => AuthError::Api(err),
        }
    }
}

#[derive(Error, Debug)]
pub enum PortalError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("No clinic is active")]
    NoClinic,

    #[error("Clinic was left before the reply arrived")]
    TenancyEnded,

    #[error("Not signed in")]
    NotSignedIn,

    #[error("Cancelled: the view that started this request is gone")]
    Cancelled,

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, PortalError>;
