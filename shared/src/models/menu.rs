//! Menu Model

use serde::{Deserialize, Serialize};

/// Menu node type
///
/// Storage may carry either the symbolic name or the single-letter code
/// used by the admin console (`M` directory, `C` page, `F` button).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuType {
    #[serde(alias = "M")]
    Directory,
    #[serde(alias = "C")]
    Page,
    #[serde(alias = "F")]
    Button,
}

impl MenuType {
    /// Directories and pages can be kept alive by a visible descendant
    pub fn is_container(&self) -> bool {
        matches!(self, MenuType::Directory | MenuType::Page)
    }
}

/// Menu entity (菜单 / 按钮权限)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Menu {
    pub id: i64,
    pub tenant_id: String,
    /// `None` or `Some(0)` marks a root menu
    #[serde(default)]
    pub parent_id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub path: String,
    pub menu_type: MenuType,
    /// Required for buttons; optional group permission for directories and pages
    #[serde(default)]
    pub permission_code: Option<String>,
    #[serde(default)]
    pub order_num: i32,
    #[serde(default = "default_true")]
    pub visible: bool,
    /// External link opened outside the console frame
    #[serde(default)]
    pub is_frame: bool,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}

impl Menu {
    /// Non-empty permission code, if any
    pub fn code(&self) -> Option<&str> {
        self.permission_code
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }

    /// Describe why this row is malformed, `None` when it is well-formed
    pub fn validation_error(&self) -> Option<&'static str> {
        if self.menu_type == MenuType::Button && self.code().is_none() {
            return Some("button menu requires a permission code");
        }
        if self.parent_id == Some(self.id) {
            return Some("menu cannot be its own parent");
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn button(code: Option<&str>) -> Menu {
        Menu {
            id: 7,
            tenant_id: "t1".into(),
            parent_id: Some(3),
            name: "Delete".into(),
            path: String::new(),
            menu_type: MenuType::Button,
            permission_code: code.map(String::from),
            order_num: 1,
            visible: true,
            is_frame: false,
            enabled: true,
        }
    }

    #[test]
    fn test_button_requires_code() {
        assert!(button(None).validation_error().is_some());
        assert!(button(Some("   ")).validation_error().is_some());
        assert!(button(Some("system:user:remove")).validation_error().is_none());
    }

    #[test]
    fn test_menu_type_aliases() {
        let t: MenuType = serde_json::from_str("\"F\"").unwrap();
        assert_eq!(t, MenuType::Button);
        let t: MenuType = serde_json::from_str("\"directory\"").unwrap();
        assert_eq!(t, MenuType::Directory);
        assert!(MenuType::Page.is_container());
        assert!(!MenuType::Button.is_container());
    }

    #[test]
    fn test_deserialize_defaults() {
        let menu: Menu = serde_json::from_str(
            r#"{"id":1,"tenant_id":"t1","name":"System","menu_type":"M"}"#,
        )
        .unwrap();
        assert_eq!(menu.parent_id, None);
        assert!(menu.visible);
        assert!(menu.enabled);
        assert_eq!(menu.code(), None);
    }
}
