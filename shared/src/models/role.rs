//! Role Model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role keys that bypass all pruning
pub const SUPER_ADMIN_ROLE_KEYS: &[&str] = &["superadmin", "admin"];

/// Role entity (RBAC 角色)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: i64,
    pub tenant_id: String,
    /// Stable code used by programs, e.g. `admin`, `dept_manager`
    pub key: String,
    pub name: String,
    /// Raw data scope value as stored (`"1"`..`"6"` or a symbolic name).
    /// Parsed with [`DataScope::from_str`]; unknown values must fail closed.
    pub data_scope: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}

impl Role {
    pub fn is_super_admin_key(&self) -> bool {
        SUPER_ADMIN_ROLE_KEYS.contains(&self.key.as_str())
    }

    pub fn parsed_data_scope(&self) -> Result<DataScope, UnknownDataScope> {
        self.data_scope.parse()
    }
}

/// Role → menu grant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoleMenu {
    pub role_id: i64,
    pub menu_id: i64,
}

/// Role → department grant (only meaningful for [`DataScope::Custom`])
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoleDept {
    pub role_id: i64,
    pub dept_id: i64,
}

/// Department-based row visibility policy (数据权限)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataScope {
    /// Every department in the tenant
    All,
    /// Exactly the role's RoleDept ids
    Custom,
    /// The user's own department
    SelfDept,
    /// The user's department and everything below it
    SelfDeptAndBelow,
    /// Only rows owned by the user
    SelfOnly,
    /// The user's department subtree, or rows owned by the user
    DeptAndBelowOrSelf,
}

impl DataScope {
    /// Storage code (`1`..`6`)
    pub fn code(&self) -> &'static str {
        match self {
            DataScope::All => "1",
            DataScope::Custom => "2",
            DataScope::SelfDept => "3",
            DataScope::SelfDeptAndBelow => "4",
            DataScope::SelfOnly => "5",
            DataScope::DeptAndBelowOrSelf => "6",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DataScope::All => "ALL",
            DataScope::Custom => "CUSTOM",
            DataScope::SelfDept => "SELF_DEPT",
            DataScope::SelfDeptAndBelow => "SELF_DEPT_AND_BELOW",
            DataScope::SelfOnly => "SELF_ONLY",
            DataScope::DeptAndBelowOrSelf => "DEPT_AND_BELOW_OR_SELF",
        }
    }
}

impl fmt::Display for DataScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A stored data scope value that maps to no known policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownDataScope(pub String);

impl fmt::Display for UnknownDataScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown data scope: {:?}", self.0)
    }
}

impl std::error::Error for UnknownDataScope {}

impl FromStr for DataScope {
    type Err = UnknownDataScope;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "1" | "ALL" => Ok(DataScope::All),
            "2" | "CUSTOM" => Ok(DataScope::Custom),
            "3" | "SELF_DEPT" => Ok(DataScope::SelfDept),
            "4" | "SELF_DEPT_AND_BELOW" => Ok(DataScope::SelfDeptAndBelow),
            "5" | "SELF_ONLY" => Ok(DataScope::SelfOnly),
            "6" | "DEPT_AND_BELOW_OR_SELF" => Ok(DataScope::DeptAndBelowOrSelf),
            _ => Err(UnknownDataScope(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_codes_and_names() {
        assert_eq!("1".parse::<DataScope>(), Ok(DataScope::All));
        assert_eq!("4".parse::<DataScope>(), Ok(DataScope::SelfDeptAndBelow));
        assert_eq!("custom".parse::<DataScope>(), Ok(DataScope::Custom));
        assert_eq!(
            " DEPT_AND_BELOW_OR_SELF ".parse::<DataScope>(),
            Ok(DataScope::DeptAndBelowOrSelf)
        );
    }

    #[test]
    fn test_unknown_values_are_rejected() {
        assert!("0".parse::<DataScope>().is_err());
        assert!("7".parse::<DataScope>().is_err());
        assert!("".parse::<DataScope>().is_err());
        assert_eq!(
            "everything".parse::<DataScope>(),
            Err(UnknownDataScope("everything".into()))
        );
    }

    #[test]
    fn test_code_round_trips_through_parse() {
        for scope in [
            DataScope::All,
            DataScope::Custom,
            DataScope::SelfDept,
            DataScope::SelfDeptAndBelow,
            DataScope::SelfOnly,
            DataScope::DeptAndBelowOrSelf,
        ] {
            assert_eq!(scope.code().parse::<DataScope>(), Ok(scope));
            assert_eq!(scope.name().parse::<DataScope>(), Ok(scope));
        }
    }

    #[test]
    fn test_super_admin_keys() {
        let mut role = Role {
            id: 1,
            tenant_id: "t1".into(),
            key: "admin".into(),
            name: "Administrator".into(),
            data_scope: "1".into(),
            enabled: true,
        };
        assert!(role.is_super_admin_key());
        role.key = "superadmin".into();
        assert!(role.is_super_admin_key());
        role.key = "Admin".into();
        assert!(!role.is_super_admin_key());
    }
}
