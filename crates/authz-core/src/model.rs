//! Entities as the authorization store represents them, and the payloads
//! sent to create or update them.
//!
//! Field names follow the store's JSON (`_id`, `applicationId`, ...).

use serde::{Deserialize, Serialize};

/// The `applicationType` used when a declared application does not name one.
pub const DEFAULT_APPLICATION_TYPE: &str = "client";

/// A permission as stored, identified by `(application_id, name)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub application_type: String,
    pub application_id: String,
}

/// A role as stored, identified by `(application_id, name)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub application_type: String,
    pub application_id: String,
    /// Identifiers of the permissions granted by this role.
    #[serde(default)]
    pub permissions: Vec<String>,
}

impl Role {
    /// Builds the full replacement body for this role with `permissions`
    /// as its new permission set. The identifier is not part of the body.
    #[must_use]
    pub fn to_update(&self, permissions: Vec<String>) -> RoleUpdate {
        RoleUpdate {
            name: self.name.clone(),
            description: self.description.clone(),
            application_type: self.application_type.clone(),
            application_id: self.application_id.clone(),
            permissions,
        }
    }
}

/// A group as stored, identified by `name` alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Identifiers of the groups nested in this one.
    #[serde(default)]
    pub nested: Vec<String>,
}

/// Body of a create-permission call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPermission {
    pub name: String,
    pub description: String,
    pub application_type: String,
    pub application_id: String,
}

/// Body of a create-role call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRole {
    pub name: String,
    pub description: String,
    pub application_type: String,
    pub application_id: String,
}

/// Body of a create-group call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewGroup {
    pub name: String,
    pub description: String,
}

/// Full replacement body of a role; the identifier travels in the path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleUpdate {
    pub name: String,
    pub description: String,
    pub application_type: String,
    pub application_id: String,
    pub permissions: Vec<String>,
}

/// Wrapper of the list-permissions response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PermissionList {
    #[serde(default)]
    pub permissions: Vec<Permission>,
}

/// Wrapper of the list-roles response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoleList {
    #[serde(default)]
    pub roles: Vec<Role>,
}

/// Wrapper of the list-groups response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GroupList {
    #[serde(default)]
    pub groups: Vec<Group>,
}
