//! Shared types for the access engine
//!
//! Row models owned by the storage collaborator, the permission-code
//! matcher, and the error types handed to the API layer.

pub mod error;
pub mod models;
pub mod types;

// Re-exports
pub use error::{AppError, ErrorCode};
pub use http;
pub use serde::{Deserialize, Serialize};
pub use types::{TenantId, WILDCARD_PERMISSION, code_grants};
