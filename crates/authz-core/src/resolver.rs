//! Lookup of entities by identity against an in-memory snapshot.
//!
//! A [`Snapshot`] is loaded once per run and only ever appended to, so the key
//! index is built once and then kept in step with each append. Lookups return
//! the first match in insertion order; duplicates are tolerated.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use crate::model::{Group, Permission, Role};

/// Returns the first element of `collection` matching `predicate`.
pub fn find<'a, T, P>(collection: &'a [T], predicate: P) -> Option<&'a T>
where
    P: FnMut(&&T) -> bool,
{
    collection.iter().find(predicate)
}

/// Composite identity key of a permission or role.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AppScopedKey {
    pub application_id: String,
    pub name: String,
}

impl AppScopedKey {
    pub fn new(application_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            application_id: application_id.into(),
            name: name.into(),
        }
    }
}

/// An entity with an identity within its store.
pub trait Keyed {
    type Key: Eq + Hash + Clone + fmt::Debug;

    fn key(&self) -> Self::Key;

    /// Identifier assigned by the store.
    fn id(&self) -> &str;
}

impl Keyed for Permission {
    type Key = AppScopedKey;

    fn key(&self) -> AppScopedKey {
        AppScopedKey::new(&self.application_id, &self.name)
    }

    fn id(&self) -> &str {
        &self.id
    }
}

impl Keyed for Role {
    type Key = AppScopedKey;

    fn key(&self) -> AppScopedKey {
        AppScopedKey::new(&self.application_id, &self.name)
    }

    fn id(&self) -> &str {
        &self.id
    }
}

impl Keyed for Group {
    type Key = String;

    fn key(&self) -> String {
        self.name.clone()
    }

    fn id(&self) -> &str {
        &self.id
    }
}

/// Entities of one kind, indexed by identity key.
#[derive(Debug, Clone)]
pub struct Snapshot<T: Keyed> {
    items: Vec<T>,
    index: HashMap<T::Key, Vec<usize>>,
}

impl<T: Keyed> Default for Snapshot<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T: Keyed> Snapshot<T> {
    pub fn new(items: Vec<T>) -> Self {
        let mut index: HashMap<T::Key, Vec<usize>> = HashMap::with_capacity(items.len());
        for (pos, item) in items.iter().enumerate() {
            index.entry(item.key()).or_default().push(pos);
        }
        Self { items, index }
    }

    /// Appends an entity created during the run and returns it.
    pub fn push(&mut self, item: T) -> &T {
        let pos = self.items.len();
        self.index.entry(item.key()).or_default().push(pos);
        self.items.push(item);
        &self.items[pos]
    }

    /// First entity with `key`, if any.
    pub fn get(&self, key: &T::Key) -> Option<&T> {
        let pos = *self.index.get(key)?.first()?;
        self.items.get(pos)
    }

    pub fn get_mut(&mut self, key: &T::Key) -> Option<&mut T> {
        let pos = *self.index.get(key)?.first()?;
        self.items.get_mut(pos)
    }

    /// Every entity with `key`, in insertion order.
    pub fn get_all(&self, key: &T::Key) -> Vec<&T> {
        self.index
            .get(key)
            .map(|positions| positions.iter().filter_map(|&p| self.items.get(p)).collect())
            .unwrap_or_default()
    }

    pub fn contains(&self, key: &T::Key) -> bool {
        self.index.contains_key(key)
    }

    /// Identifier of the first entity with `key`.
    pub fn id_of(&self, key: &T::Key) -> Option<&str> {
        self.get(key).map(Keyed::id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn permission(id: &str, app: &str, name: &str) -> Permission {
        Permission {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            application_type: "client".into(),
            application_id: app.into(),
        }
    }

    fn group(id: &str, name: &str, description: &str) -> Group {
        Group {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            nested: Vec::new(),
        }
    }

    #[test]
    fn test_find_returns_first_match() {
        let items = vec![
            permission("p-1", "app1", "read"),
            permission("p-2", "app1", "read"),
        ];
        let hit = find(&items, |p| p.name == "read").unwrap();
        assert_eq!(hit.id, "p-1");
        assert!(find(&items, |p| p.name == "write").is_none());
    }

    #[test]
    fn test_key_is_scoped_by_application() {
        let snapshot = Snapshot::new(vec![
            permission("p-1", "app1", "read:users"),
            permission("p-2", "app2", "read:users"),
        ]);

        assert_eq!(snapshot.id_of(&AppScopedKey::new("app1", "read:users")), Some("p-1"));
        assert_eq!(snapshot.id_of(&AppScopedKey::new("app2", "read:users")), Some("p-2"));
        assert!(!snapshot.contains(&AppScopedKey::new("app3", "read:users")));
    }

    #[test]
    fn test_push_is_visible_to_later_lookups() {
        let mut snapshot = Snapshot::default();
        assert!(snapshot.is_empty());

        snapshot.push(permission("p-9", "app1", "write:users"));
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.id_of(&AppScopedKey::new("app1", "write:users")), Some("p-9"));
    }

    #[test]
    fn test_duplicates_keep_first_match_and_are_all_listed() {
        let mut snapshot = Snapshot::new(vec![group("g-1", "ops", "Operations")]);
        snapshot.push(group("g-2", "ops", "Ops contractors"));

        assert_eq!(snapshot.id_of(&"ops".to_string()), Some("g-1"));
        let all: Vec<&str> = snapshot
            .get_all(&"ops".to_string())
            .into_iter()
            .map(|g| g.id.as_str())
            .collect();
        assert_eq!(all, vec!["g-1", "g-2"]);
        assert!(snapshot.get_all(&"dev".to_string()).is_empty());
    }

    #[test]
    fn test_get_mut_updates_in_place() {
        let mut snapshot = Snapshot::new(vec![group("g-1", "ops", "Operations")]);
        snapshot
            .get_mut(&"ops".to_string())
            .unwrap()
            .nested
            .push("g-7".into());
        assert_eq!(snapshot.as_slice()[0].nested, vec!["g-7".to_string()]);
    }
}
