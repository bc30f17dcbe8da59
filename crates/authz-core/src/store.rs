//! The remote authorization store, as seen by the provisioning engine.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::model::{Group, NewGroup, NewPermission, NewRole, Permission, Role, RoleUpdate};

/// Result of a single store call.
pub type StoreResult<T> = Result<T, StoreError>;

/// Point-in-time reads and writes against the authorization store.
///
/// No two calls are transactional with each other. Implementations must be
/// thread-safe (`Send + Sync`) so the initial listings can run concurrently.
#[async_trait]
pub trait DirectoryStore: Send + Sync {
    // ==================== Listings ====================

    /// Every permission currently in the store.
    async fn list_permissions(&self) -> StoreResult<Vec<Permission>>;

    /// Every role currently in the store.
    async fn list_roles(&self) -> StoreResult<Vec<Role>>;

    /// Every group currently in the store.
    async fn list_groups(&self) -> StoreResult<Vec<Group>>;

    // ==================== Creation ====================

    /// Creates a permission and returns it with its store-assigned id.
    async fn create_permission(&self, permission: &NewPermission) -> StoreResult<Permission>;

    /// Creates a role and returns it with its store-assigned id.
    async fn create_role(&self, role: &NewRole) -> StoreResult<Role>;

    /// Creates a group and returns it with its store-assigned id.
    async fn create_group(&self, group: &NewGroup) -> StoreResult<Group>;

    // ==================== Attachment ====================

    /// Replaces the role identified by `role_id` with `role`, including its
    /// complete permission set. Not a merge.
    async fn set_role_permissions(&self, role_id: &str, role: &RoleUpdate) -> StoreResult<()>;

    /// Replaces the nested-group list of `group_id` with `nested_group_ids`.
    async fn set_group_nesting(&self, group_id: &str, nested_group_ids: &[String])
    -> StoreResult<()>;
}
