//! Data models
//!
//! Flat rows handed over by the storage collaborator.
//! All IDs are `i64`; every entity row carries its `tenant_id`.

pub mod department;
pub mod menu;
pub mod role;
pub mod user;

// Re-exports
pub use department::*;
pub use menu::*;
pub use role::*;
pub use user::*;
