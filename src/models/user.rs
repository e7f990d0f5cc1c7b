use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Default,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum UserRole {
    Admin,
    Warehouse,
    Mechanic,
    Accountant,
    #[default]
    Viewer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PermissionAction {
    Create,
    Read,
    Update,
    Delete,
}

/// Per-module permission grant, optionally restricted to warehouses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Permission {
    pub module: String,
    pub actions: Vec<PermissionAction>,
    #[serde(default)]
    pub warehouse_restrictions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    #[serde(default)]
    pub permissions: Vec<Permission>,
    #[serde(default)]
    pub last_login: Option<DateTime<Utc>>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub created_by: String,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_by: Option<String>,
}

impl User {
    /// Whether the user may perform `action` on `module`. Admins always may.
    pub fn can(&self, module: &str, action: PermissionAction) -> bool {
        if self.role == UserRole::Admin {
            return true;
        }
        self.permissions
            .iter()
            .any(|p| p.module == module && p.actions.contains(&action))
    }
}

super::impl_record!(User);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_bypasses_permission_checks() {
        let user = User {
            id: "u-1".into(),
            name: "Ana".into(),
            email: "ana@example.com".into(),
            role: UserRole::Admin,
            permissions: vec![],
            last_login: None,
            created_at: Utc::now(),
            created_by: "admin".into(),
            updated_at: None,
            updated_by: None,
        };
        assert!(user.can("machinery", PermissionAction::Delete));
    }

    #[test]
    fn viewer_needs_an_explicit_grant() {
        let user = User {
            id: "u-2".into(),
            name: "Luis".into(),
            email: "luis@example.com".into(),
            role: UserRole::Viewer,
            permissions: vec![Permission {
                module: "rentals".into(),
                actions: vec![PermissionAction::Read],
                warehouse_restrictions: vec![],
            }],
            last_login: None,
            created_at: Utc::now(),
            created_by: "admin".into(),
            updated_at: None,
            updated_by: None,
        };
        assert!(user.can("rentals", PermissionAction::Read));
        assert!(!user.can("rentals", PermissionAction::Update));
        assert!(!user.can("machinery", PermissionAction::Read));
    }
}
