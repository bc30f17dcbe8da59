//! # authz-core
//!
//! Declarative authorization model and the engine that provisions it into a
//! remote authorization store.
//!
//! ## Overview
//!
//! - [`AuthzModel`] describes the desired applications, permissions, roles and
//!   groups.
//! - [`DirectoryStore`] is the contract of the remote store. The HTTP
//!   implementation lives in `authz-client`.
//! - [`Provisioner`] reconciles the model against the store, creating only
//!   what is missing and attaching role permissions and nested groups.
//!
//! ## Example
//!
//! ```ignore
//! use authz_core::{AuthzModel, Provisioner};
//!
//! let model = AuthzModel::from_path(Path::new("authz.json"))?;
//! let report = Provisioner::new(&client).provision(&model).await?;
//! println!("created {} entities", report.total_created());
//! ```

pub mod declarative;
pub mod engine;
mod error;
pub mod model;
pub mod resolver;
mod store;

pub use declarative::{
    AuthzModel, DeclaredApplication, DeclaredGroup, DeclaredRole, ModelSummary, NestedGroupRef,
};
pub use engine::{
    Outcome, PassReport, ProvisionReport, Provisioner, StoreState, permission_description,
};
pub use error::{EntityKind, ModelError, ProvisionError, StoreError};
pub use model::{
    Group, GroupList, NewGroup, NewPermission, NewRole, Permission, PermissionList, Role,
    RoleList, RoleUpdate,
};
pub use resolver::{AppScopedKey, Keyed, Snapshot, find};
pub use store::{DirectoryStore, StoreResult};
