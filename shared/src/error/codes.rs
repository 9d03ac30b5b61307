//! Unified error codes for the access engine
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 2xxx: Permission errors
//! - 3xxx: Tenant errors
//! - 4xxx: Menu errors
//! - 5xxx: Department errors
//! - 6xxx: Role errors
//! - 7xxx: User errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Validation failed (e.g. duplicate row ids)
    ValidationFailed = 2,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Data scope policy on a role is not recognized
    InvalidScopePolicy = 2002,

    // ==================== 3xxx: Tenant ====================
    /// Tenant not found
    TenantNotFound = 3002,
    /// Row belongs to a different tenant than requested
    TenantMismatch = 3003,

    // ==================== 4xxx: Menu ====================
    /// Menu not found
    MenuNotFound = 4001,
    /// Menu row is malformed (e.g. button without permission code)
    MenuInvalid = 4002,
    /// Menu is still assigned to roles
    MenuInUse = 4003,
    /// Menu hierarchy contains a cycle
    MenuCycle = 4004,

    // ==================== 5xxx: Department ====================
    /// Department not found
    DeptNotFound = 5001,
    /// Department is still referenced by users or roles
    DeptInUse = 5002,
    /// Department hierarchy contains a cycle
    DeptCycle = 5003,

    // ==================== 6xxx: Role ====================
    /// Role not found
    RoleNotFound = 6001,

    // ==================== 7xxx: User ====================
    /// User not found
    UserNotFound = 7001,

    // ==================== 9xxx: System ====================
    /// Storage error
    DatabaseError = 9002,
    /// Tree exceeds configured size or depth limits
    LimitExceeded = 9006,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            2 => Ok(ErrorCode::ValidationFailed),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2002 => Ok(ErrorCode::InvalidScopePolicy),

            // Tenant
            3002 => Ok(ErrorCode::TenantNotFound),
            3003 => Ok(ErrorCode::TenantMismatch),

            // Menu
            4001 => Ok(ErrorCode::MenuNotFound),
            4002 => Ok(ErrorCode::MenuInvalid),
            4003 => Ok(ErrorCode::MenuInUse),
            4004 => Ok(ErrorCode::MenuCycle),

            // Department
            5001 => Ok(ErrorCode::DeptNotFound),
            5002 => Ok(ErrorCode::DeptInUse),
            5003 => Ok(ErrorCode::DeptCycle),

            // Role
            6001 => Ok(ErrorCode::RoleNotFound),

            // User
            7001 => Ok(ErrorCode::UserNotFound),

            // System
            9002 => Ok(ErrorCode::DatabaseError),
            9006 => Ok(ErrorCode::LimitExceeded),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
