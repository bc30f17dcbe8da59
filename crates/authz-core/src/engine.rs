//! The provisioning engine.
//!
//! A run loads the current permissions, roles and groups once, then walks the
//! declarative model in three passes:
//!
//! 1. permissions of every application,
//! 2. roles of every application, each followed by attaching its permissions,
//! 3. groups, each followed by attaching its nested groups.
//!
//! Entities that already exist are skipped. Everything created is appended to
//! the run's snapshots so that later steps resolve references against it.
//! Calls inside a pass are issued one at a time in declared order.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::declarative::{AuthzModel, DeclaredApplication, DeclaredGroup, DeclaredRole, NestedGroupRef};
use crate::error::{EntityKind, ProvisionError};
use crate::model::{Group, NewGroup, NewPermission, NewRole, Permission, Role};
use crate::resolver::{AppScopedKey, Snapshot, find};
use crate::store::DirectoryStore;

/// What a create step did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The entity was missing and has been created.
    Created,
    /// An entity with the same identity already existed; no call was issued.
    Existing,
}

/// Counters for one pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PassReport {
    pub created: usize,
    pub existing: usize,
    /// Attach calls issued (role permissions or group nesting).
    pub attached: usize,
}

impl PassReport {
    fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Created => self.created += 1,
            Outcome::Existing => self.existing += 1,
        }
    }
}

/// Summary of a run that completed every step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProvisionReport {
    pub permissions: PassReport,
    pub roles: PassReport,
    pub groups: PassReport,
}

impl ProvisionReport {
    #[must_use]
    pub fn total_created(&self) -> usize {
        self.permissions.created + self.roles.created + self.groups.created
    }
}

/// The store's current entities, owned by a single run.
#[derive(Debug, Default)]
pub struct StoreState {
    pub permissions: Snapshot<Permission>,
    pub roles: Snapshot<Role>,
    pub groups: Snapshot<Group>,
}

/// Reconciles a declarative model against a [`DirectoryStore`].
pub struct Provisioner<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S: DirectoryStore + ?Sized> Provisioner<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Creates whatever `model` declares that the store is missing.
    ///
    /// Stops at the first failure; entities created before it stay in the store.
    pub async fn provision(&self, model: &AuthzModel) -> Result<ProvisionReport, ProvisionError> {
        let mut state = self.load_state().await?;
        let mut report = ProvisionReport::default();

        let result = self.run_passes(model, &mut state, &mut report).await;
        if let Err(e) = &result {
            warn!(
                error = %e,
                created = report.total_created(),
                "Provisioning stopped; entities created so far remain in the store"
            );
        }
        result?;

        info!(
            permissions_created = report.permissions.created,
            roles_created = report.roles.created,
            groups_created = report.groups.created,
            "Provisioning completed"
        );
        Ok(report)
    }

    async fn run_passes(
        &self,
        model: &AuthzModel,
        state: &mut StoreState,
        report: &mut ProvisionReport,
    ) -> Result<(), ProvisionError> {
        // Roles may reference permissions of any application, so this pass
        // completes for all of them first.
        for app in &model.applications {
            for name in &app.permissions {
                let outcome = self.ensure_permission(&mut state.permissions, app, name).await?;
                report.permissions.record(outcome);
            }
        }

        for app in &model.applications {
            for role in &app.roles {
                let outcome = self.ensure_role(&mut state.roles, app, role).await?;
                report.roles.record(outcome);
                if self
                    .attach_role_permissions(&state.permissions, &mut state.roles, app, role)
                    .await?
                    .is_some()
                {
                    report.roles.attached += 1;
                }
            }
        }

        for group in &model.groups {
            let outcome = self.ensure_group(&mut state.groups, group).await?;
            report.groups.record(outcome);
            if self
                .attach_nested_groups(&mut state.groups, group)
                .await?
                .is_some()
            {
                report.groups.attached += 1;
            }
        }

        Ok(())
    }

    /// Fetches the three snapshots concurrently and waits for all of them.
    pub async fn load_state(&self) -> Result<StoreState, ProvisionError> {
        let (permissions, roles, groups) = tokio::try_join!(
            async {
                self.store
                    .list_permissions()
                    .await
                    .map_err(|e| ProvisionError::store_read(EntityKind::Permission, e))
            },
            async {
                self.store
                    .list_roles()
                    .await
                    .map_err(|e| ProvisionError::store_read(EntityKind::Role, e))
            },
            async {
                self.store
                    .list_groups()
                    .await
                    .map_err(|e| ProvisionError::store_read(EntityKind::Group, e))
            },
        )?;

        info!(count = permissions.len(), "Loaded permissions");
        info!(count = roles.len(), "Loaded roles");
        info!(count = groups.len(), "Loaded groups");

        Ok(StoreState {
            permissions: Snapshot::new(permissions),
            roles: Snapshot::new(roles),
            groups: Snapshot::new(groups),
        })
    }

    pub async fn ensure_permission(
        &self,
        permissions: &mut Snapshot<Permission>,
        app: &DeclaredApplication,
        name: &str,
    ) -> Result<Outcome, ProvisionError> {
        let key = AppScopedKey::new(&app.id, name);
        if permissions.contains(&key) {
            debug!(application = %app.id, permission = %name, "Permission exists");
            return Ok(Outcome::Existing);
        }

        let payload = NewPermission {
            name: name.to_string(),
            description: permission_description(name),
            application_type: app.application_type.clone(),
            application_id: app.id.clone(),
        };
        let created = self
            .store
            .create_permission(&payload)
            .await
            .map_err(|e| ProvisionError::store_write(format!("create permission '{name}'"), e))?;
        permissions.push(created);

        info!(application = %app.id, permission = %name, "Created permission");
        Ok(Outcome::Created)
    }

    pub async fn ensure_role(
        &self,
        roles: &mut Snapshot<Role>,
        app: &DeclaredApplication,
        role: &DeclaredRole,
    ) -> Result<Outcome, ProvisionError> {
        let key = AppScopedKey::new(&app.id, &role.name);
        if roles.contains(&key) {
            debug!(application = %app.id, role = %role.name, "Role exists");
            return Ok(Outcome::Existing);
        }

        let payload = NewRole {
            name: role.name.clone(),
            description: role.description.clone(),
            application_type: app.application_type.clone(),
            application_id: app.id.clone(),
        };
        let created = self
            .store
            .create_role(&payload)
            .await
            .map_err(|e| ProvisionError::store_write(format!("create role '{}'", role.name), e))?;
        roles.push(created);

        info!(application = %app.id, role = %role.name, "Created role");
        Ok(Outcome::Created)
    }

    /// Replaces the role's permission set with the declared one.
    ///
    /// Returns the number of attached permissions, or `None` when the role
    /// declares none and no call was issued. Every name is resolved before the
    /// call, so an unresolvable name means nothing is sent.
    pub async fn attach_role_permissions(
        &self,
        permissions: &Snapshot<Permission>,
        roles: &mut Snapshot<Role>,
        app: &DeclaredApplication,
        role: &DeclaredRole,
    ) -> Result<Option<usize>, ProvisionError> {
        if role.permissions.is_empty() {
            return Ok(None);
        }

        let scope = format!("role '{}' of application '{}'", role.name, app.display_name());
        let permission_ids = role
            .permissions
            .iter()
            .map(|name| {
                permissions
                    .id_of(&AppScopedKey::new(&app.id, name))
                    .map(str::to_string)
                    .ok_or_else(|| ProvisionError::unresolvable(EntityKind::Permission, name, &scope))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let stored = roles
            .get_mut(&AppScopedKey::new(&app.id, &role.name))
            .ok_or_else(|| ProvisionError::unresolvable(EntityKind::Role, &role.name, &scope))?;
        let update = stored.to_update(permission_ids);

        debug!(role = %role.name, role_id = %stored.id, "Adding permissions to role");
        self.store
            .set_role_permissions(&stored.id, &update)
            .await
            .map_err(|e| {
                ProvisionError::store_write(format!("set permissions of role '{}'", role.name), e)
            })?;

        let count = update.permissions.len();
        stored.permissions = update.permissions;
        info!(role = %role.name, count, "Attached permissions to role");
        Ok(Some(count))
    }

    pub async fn ensure_group(
        &self,
        groups: &mut Snapshot<Group>,
        group: &DeclaredGroup,
    ) -> Result<Outcome, ProvisionError> {
        if groups.contains(&group.name) {
            debug!(group = %group.name, "Group exists");
            return Ok(Outcome::Existing);
        }

        let payload = NewGroup {
            name: group.name.clone(),
            description: group.description.clone(),
        };
        let created = self
            .store
            .create_group(&payload)
            .await
            .map_err(|e| ProvisionError::store_write(format!("create group '{}'", group.name), e))?;
        groups.push(created);

        info!(group = %group.name, "Created group");
        Ok(Outcome::Created)
    }

    /// Replaces the group's nested-group list with the declared one.
    ///
    /// Returns the number of nested groups, or `None` when the group declares
    /// none and no call was issued.
    pub async fn attach_nested_groups(
        &self,
        groups: &mut Snapshot<Group>,
        group: &DeclaredGroup,
    ) -> Result<Option<usize>, ProvisionError> {
        if group.nested.is_empty() {
            return Ok(None);
        }

        let scope = format!("group '{}'", group.name);
        let nested_ids = group
            .nested
            .iter()
            .map(|reference| resolve_nested_group(groups, reference, &scope))
            .collect::<Result<Vec<_>, _>>()?;

        let stored = groups
            .get_mut(&group.name)
            .ok_or_else(|| ProvisionError::unresolvable(EntityKind::Group, &group.name, &scope))?;

        self.store
            .set_group_nesting(&stored.id, &nested_ids)
            .await
            .map_err(|e| {
                ProvisionError::store_write(format!("set nested groups of '{}'", group.name), e)
            })?;

        let count = nested_ids.len();
        stored.nested = nested_ids;
        let names: Vec<&str> = group.nested.iter().map(|r| r.name.as_str()).collect();
        info!(group = %group.name, nested = %names.join(", "), "Attached nested groups");
        Ok(Some(count))
    }
}

/// Resolves a nested-group reference to a group id.
///
/// Groups are matched by name. When several share the name, the reference's
/// description must narrow them down to exactly one.
pub fn resolve_nested_group(
    groups: &Snapshot<Group>,
    reference: &NestedGroupRef,
    scope: &str,
) -> Result<String, ProvisionError> {
    let unresolvable = || ProvisionError::unresolvable(EntityKind::Group, &reference.name, scope);

    let candidates = groups.get_all(&reference.name);
    let matched = match (candidates.as_slice(), &reference.description) {
        ([], _) => None,
        ([only], _) => Some(*only),
        (many, Some(description)) => {
            let described = |g: &&&Group| &g.description == description;
            if many.iter().filter(|g| described(g)).count() == 1 {
                find(many, described).copied()
            } else {
                None
            }
        }
        (_, None) => None,
    };

    matched.map(|g| g.id.clone()).ok_or_else(unresolvable)
}

/// Human-readable description of a permission name: every word title-cased,
/// `:` and `-` turned into spaces. `read:users` becomes `Read Users`.
#[must_use]
pub fn permission_description(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut word_start = true;
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() || ch == '_' {
            if word_start {
                out.push(ch.to_ascii_uppercase());
            } else {
                out.push(ch.to_ascii_lowercase());
            }
            word_start = false;
        } else {
            word_start = true;
            out.push(if matches!(ch, ':' | '-') { ' ' } else { ch });
        }
    }
    out
}
