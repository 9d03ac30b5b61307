//! Engine error taxonomy
//!
//! Every failure fails closed: callers must treat an error as "no access",
//! never fall back to the full tree or the full permission set.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::json;
use shared::error::{AppError, ErrorCode};
use thiserror::Error;

use crate::cascade::BlockingReference;
use crate::store::StoreError;
use crate::tree::TreeKind;

/// Kind of row an error points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Menu,
    Dept,
    Role,
    User,
    /// A whole tenant snapshot
    Snapshot,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Menu => "menu",
            EntityKind::Dept => "dept",
            EntityKind::Role => "role",
            EntityKind::User => "user",
            EntityKind::Snapshot => "snapshot",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<TreeKind> for EntityKind {
    fn from(kind: TreeKind) -> Self {
        match kind {
            TreeKind::Menu => EntityKind::Menu,
            TreeKind::Dept => EntityKind::Dept,
        }
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    /// Malformed hierarchy: a parent chain revisits a node
    #[error("Cycle detected in {kind} hierarchy at id {id}")]
    CycleDetected { kind: TreeKind, id: i64 },

    /// A role carries a data scope value that maps to no policy
    #[error("Invalid data scope policy {value:?} on role {role_id}")]
    InvalidScopePolicy { role_id: i64, value: String },

    /// Deletion would leave dangling references
    #[error("Deleting {kind} {target_id} is blocked by {} reference(s)", blocked_by.len())]
    ReferentialBlock {
        kind: TreeKind,
        target_id: i64,
        blocked_by: Vec<BlockingReference>,
    },

    /// A row in the snapshot belongs to another tenant
    #[error("Tenant mismatch: {entity} {id} belongs to {found:?}, expected {expected:?}")]
    TenantMismatch {
        entity: EntityKind,
        id: i64,
        expected: String,
        found: String,
    },

    #[error("{entity} {id} not found")]
    NotFound { entity: EntityKind, id: i64 },

    #[error("Duplicate {kind} id {id}")]
    DuplicateId { kind: TreeKind, id: i64 },

    /// Size/depth guard tripped
    #[error("{kind} hierarchy {limit} is {actual}, limit is {max}")]
    LimitExceeded {
        kind: TreeKind,
        limit: &'static str,
        actual: usize,
        max: usize,
    },

    #[error("Invalid menu {id}: {reason}")]
    InvalidMenu { id: i64, reason: &'static str },

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, EngineError>;

impl EngineError {
    /// Error code handed to the API layer
    pub fn code(&self) -> ErrorCode {
        match self {
            EngineError::CycleDetected { kind, .. } => match kind {
                TreeKind::Menu => ErrorCode::MenuCycle,
                TreeKind::Dept => ErrorCode::DeptCycle,
            },
            EngineError::InvalidScopePolicy { .. } => ErrorCode::InvalidScopePolicy,
            EngineError::ReferentialBlock { kind, .. } => match kind {
                TreeKind::Menu => ErrorCode::MenuInUse,
                TreeKind::Dept => ErrorCode::DeptInUse,
            },
            EngineError::TenantMismatch { .. } => ErrorCode::TenantMismatch,
            EngineError::NotFound { entity, .. } => match entity {
                EntityKind::Menu => ErrorCode::MenuNotFound,
                EntityKind::Dept => ErrorCode::DeptNotFound,
                EntityKind::Role => ErrorCode::RoleNotFound,
                EntityKind::User => ErrorCode::UserNotFound,
                EntityKind::Snapshot => ErrorCode::TenantNotFound,
            },
            EngineError::DuplicateId { .. } => ErrorCode::ValidationFailed,
            EngineError::LimitExceeded { .. } => ErrorCode::LimitExceeded,
            EngineError::InvalidMenu { .. } => ErrorCode::MenuInvalid,
            EngineError::PermissionDenied(_) => ErrorCode::PermissionDenied,
            EngineError::Store(StoreError::TenantNotFound(_)) => ErrorCode::TenantNotFound,
            EngineError::Store(_) => ErrorCode::DatabaseError,
        }
    }
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        let code = err.code();
        let message = err.to_string();
        let app = AppError::with_message(code, message);
        match err {
            EngineError::CycleDetected { id, .. } => app.with_detail("id", id),
            EngineError::InvalidScopePolicy { role_id, value } => app
                .with_detail("role_id", role_id)
                .with_detail("data_scope", value),
            EngineError::ReferentialBlock {
                target_id,
                blocked_by,
                ..
            } => app
                .with_detail("target_id", target_id)
                .with_detail("blocked_by", json!(blocked_by)),
            EngineError::TenantMismatch {
                entity,
                id,
                expected,
                found,
            } => app
                .with_detail("entity", entity.as_str())
                .with_detail("id", id)
                .with_detail("expected", expected)
                .with_detail("found", found),
            EngineError::NotFound { entity, id } => {
                app.with_detail("entity", entity.as_str()).with_detail("id", id)
            }
            EngineError::DuplicateId { id, .. } | EngineError::InvalidMenu { id, .. } => {
                app.with_detail("id", id)
            }
            _ => app,
        }
    }
}
