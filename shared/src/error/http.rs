//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            Self::ValidationFailed | Self::MenuInvalid => StatusCode::BAD_REQUEST,

            // 404 Not Found
            Self::TenantNotFound
            | Self::MenuNotFound
            | Self::DeptNotFound
            | Self::RoleNotFound
            | Self::UserNotFound => StatusCode::NOT_FOUND,

            // 409 Conflict
            Self::MenuInUse | Self::DeptInUse => StatusCode::CONFLICT,

            // 403 Forbidden
            Self::PermissionDenied => StatusCode::FORBIDDEN,

            // 500 Internal Server Error (data integrity problems are not the caller's fault)
            Self::DatabaseError
            | Self::TenantMismatch
            | Self::InvalidScopePolicy
            | Self::MenuCycle
            | Self::DeptCycle
            | Self::LimitExceeded => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_mapping() {
        assert_eq!(ErrorCode::UserNotFound.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::MenuInUse.http_status(), StatusCode::CONFLICT);
        assert_eq!(ErrorCode::DeptInUse.http_status(), StatusCode::CONFLICT);
        assert_eq!(
            ErrorCode::PermissionDenied.http_status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ErrorCode::TenantMismatch.http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ErrorCode::MenuInvalid.http_status(),
            StatusCode::BAD_REQUEST
        );
    }
}
