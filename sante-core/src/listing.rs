use serde::de::DeserializeOwned;
use serde_json::Value;

/// Envelope keys list endpoints wrap their items in
pub const LIST_KEYS: &[&str] = &[
    "results",
    "data",
    "documents",
    "orders",
    "clinics",
    "doctors",
    "appointments",
    "patients",
    "users",
    "history",
];

/// Decode a list reply that may be bare (`[...]`) or wrapped
/// (`{"documents": [...]}` and friends). Any other shape is an empty list.
pub fn unwrap_list<T: DeserializeOwned>(reply: Value) -> serde_json::Result<Vec<T>> {
    match reply {
        Value::Array(_) => serde_json::from_value(reply),
        Value::Object(mut map) => {
            for key in LIST_KEYS {
                if let Some(items @ Value::Array(_)) = map.remove(*key) {
                    return serde_json::from_value(items);
                }
            }
            Ok(Vec::new())
        }
        _ => Ok(Vec::new()),
    }
}
