//! Common types for the shared crate
//!
//! Identifiers and the permission-code matcher used across the engine

/// Tenant partition identifier
pub type TenantId = String;

/// Permission code carried by super-admin contexts.
///
/// It is never matched as a pattern: only the `is_super_admin` flag on a
/// resolved context bypasses checks.
pub const WILDCARD_PERMISSION: &str = "*:*:*";

/// Check if a granted permission code covers the requested action
///
/// - `system:user:*` covers `system:user:list`, `system:user:remove`, ...
/// - anything else must match exactly, including `*` and `*:*:*`
pub fn code_grants(granted: &str, action: &str) -> bool {
    if let Some(prefix) = granted.strip_suffix(":*")
        && !prefix.is_empty()
        && prefix != "*"
        && !prefix.ends_with(":*")
    {
        return action
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with(':'));
    }
    granted == action
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match() {
        assert!(code_grants("system:user:list", "system:user:list"));
        assert!(!code_grants("system:user:list", "system:user:remove"));
    }

    #[test]
    fn test_bare_wildcards_are_literal() {
        assert!(!code_grants("*", "system:user:remove"));
        assert!(!code_grants(WILDCARD_PERMISSION, "system:menu:remove"));
        assert!(!code_grants("*:*", "system:user:remove"));
        assert!(!code_grants(":*", ":system"));
        assert!(code_grants("*", "*"));
    }

    #[test]
    fn test_prefix_wildcard_respects_segments() {
        assert!(code_grants("system:user:*", "system:user:list"));
        assert!(!code_grants("system:user:*", "system:users:list"));
        assert!(!code_grants("system:user:*", "system:user"));
    }
}
