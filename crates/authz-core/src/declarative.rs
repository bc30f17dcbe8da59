//! The declarative authorization model: the desired state a run provisions.
//!
//! A model is read from JSON or TOML:
//!
//! ```json
//! {
//!   "applications": [{
//!     "id": "app1",
//!     "name": "Back office",
//!     "permissions": ["read:users", "write:users"],
//!     "roles": [{ "name": "admin", "description": "Admins", "permissions": ["read:users"] }]
//!   }],
//!   "groups": [
//!     { "name": "ops", "description": "Operations" },
//!     { "name": "admins", "description": "Admins", "nested": ["ops"] }
//!   ]
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::model::DEFAULT_APPLICATION_TYPE;

/// Desired applications and groups. Read-only during a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthzModel {
    #[serde(default)]
    pub applications: Vec<DeclaredApplication>,
    #[serde(default)]
    pub groups: Vec<DeclaredGroup>,
}

/// Scopes permissions and roles; not itself an entity in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclaredApplication {
    /// Client id, used as `applicationId` of everything declared below it.
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default = "default_application_type")]
    pub application_type: String,
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(default)]
    pub roles: Vec<DeclaredRole>,
}

impl DeclaredApplication {
    /// Name for diagnostics: the declared name, or the id when unnamed.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }
}

fn default_application_type() -> String {
    DEFAULT_APPLICATION_TYPE.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclaredRole {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Permission names declared under the same application.
    #[serde(default)]
    pub permissions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclaredGroup {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub nested: Vec<NestedGroupRef>,
}

/// Reference to a group nested in another.
///
/// Accepts either a bare name or `{ name, description }`. The description only
/// matters when several stored groups share the name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "NestedGroupRefRepr")]
pub struct NestedGroupRef {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl NestedGroupRef {
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NestedGroupRefRepr {
    Name(String),
    Full {
        name: String,
        #[serde(default)]
        description: Option<String>,
    },
}

impl From<NestedGroupRefRepr> for NestedGroupRef {
    fn from(repr: NestedGroupRefRepr) -> Self {
        match repr {
            NestedGroupRefRepr::Name(name) => Self::named(name),
            NestedGroupRefRepr::Full { name, description } => Self { name, description },
        }
    }
}

/// Counts of declared entities, for reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ModelSummary {
    pub applications: usize,
    pub permissions: usize,
    pub roles: usize,
    pub groups: usize,
    pub nested_refs: usize,
}

impl AuthzModel {
    /// Loads a model, choosing the format by file extension.
    pub fn from_path(path: &Path) -> Result<Self, ModelError> {
        let content = std::fs::read_to_string(path)?;
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        match extension.as_str() {
            "json" => Self::from_json_str(&content),
            "toml" => Self::from_toml_str(&content),
            other => Err(ModelError::UnsupportedFormat(other.to_string())),
        }
    }

    pub fn from_json_str(content: &str) -> Result<Self, ModelError> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ModelError> {
        Ok(toml::from_str(content)?)
    }

    #[must_use]
    pub fn summary(&self) -> ModelSummary {
        ModelSummary {
            applications: self.applications.len(),
            permissions: self.applications.iter().map(|a| a.permissions.len()).sum(),
            roles: self.applications.iter().map(|a| a.roles.len()).sum(),
            groups: self.groups.len(),
            nested_refs: self.groups.iter().map(|g| g.nested.len()).sum(),
        }
    }
}
