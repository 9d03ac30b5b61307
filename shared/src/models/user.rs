//! User Model

use serde::{Deserialize, Serialize};

/// User entity as seen by the access engine (no credentials)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub tenant_id: String,
    pub username: String,
    #[serde(default)]
    pub dept_id: Option<i64>,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// User → role assignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserRole {
    pub user_id: i64,
    pub role_id: i64,
}

fn default_true() -> bool {
    true
}
