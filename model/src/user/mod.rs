use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// One user record decoded from an uploaded batch file.
///
/// `username` and `role` are the only fields this service requires to be
/// present. Every other key in the source record is carried through
/// untouched in `extra` and stored alongside them, so the item written to
/// the table is the full original record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub role: String,

    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl User {
    pub fn new(username: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            role: role.into(),
            extra: HashMap::new(),
        }
    }
}
