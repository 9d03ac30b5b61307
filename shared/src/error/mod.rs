//! Unified error system for the access engine
//!
//! This module provides:
//! - [`ErrorCode`]: Standardized error codes for all error types
//! - [`AppError`]: Rich error type with codes, messages, and details
//!
//! # Error Code Ranges
//!
//! - 0xxx: General errors
//! - 2xxx: Permission errors
//! - 3xxx: Tenant errors
//! - 4xxx: Menu errors
//! - 5xxx: Department errors
//! - 6xxx: Role errors
//! - 7xxx: User errors
//! - 9xxx: System errors
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorCode};
//!
//! let err = AppError::with_message(ErrorCode::MenuInUse, "Menu 42 is assigned to roles")
//!     .with_detail("menu_id", 42);
//! assert_eq!(err.code.code(), 4003);
//! ```

mod codes;
mod http;
mod types;

pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::AppError;
