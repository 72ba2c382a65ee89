use serde::{Deserialize, Serialize};
use std::fmt;

/// Backend record identifier.
///
/// Document-store records carry an object-id string, relational ones an
/// integer; both shapes reach the client.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Number(i64),
    Text(String),
}

impl RecordId {
    pub fn is_blank(&self) -> bool {
        matches!(self, RecordId::Text(s) if s.trim().is_empty())
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Number(n) => write!(f, "{}", n),
            RecordId::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        RecordId::Text(value.to_string())
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        RecordId::Text(value)
    }
}

impl From<i64> for RecordId {
    fn from(value: i64) -> Self {
        RecordId::Number(value)
    }
}

/// Picks the document-store id first, then the relational one.
pub fn preferred_id(mongo_id: Option<&RecordId>, id: Option<&RecordId>) -> Option<RecordId> {
    mongo_id
        .filter(|v| !v.is_blank())
        .or(id.filter(|v| !v.is_blank()))
        .cloned()
}
