use std::sync::Arc;

use crate::{
    access::{PageId, Role, RoleAccessTable},
    registry::{PageEntry, PageRegistry},
};

/// AccessibleSet
///
/// The registry entries a role may open, in registry order. Derived per call and
/// never cached, so a role change is reflected on the next render cycle.
#[derive(Debug, Default)]
pub struct AccessibleSet<'r> {
    entries: Vec<&'r PageEntry>,
}

impl<'r> AccessibleSet<'r> {
    pub fn contains(&self, id: &PageId) -> bool {
        self.entries.iter().any(|entry| &entry.id == id)
    }

    pub fn get(&self, id: &PageId) -> Option<&'r PageEntry> {
        self.entries.iter().copied().find(|entry| &entry.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &'r PageEntry> + '_ {
        self.entries.iter().copied()
    }

    pub fn ids(&self) -> Vec<&'r PageId> {
        self.entries.iter().map(|entry| &entry.id).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Target
///
/// Where a render cycle lands for the session's selected page.
#[derive(Debug)]
pub enum Target<'r> {
    /// Registered and allowed for the role.
    Permitted(&'r PageEntry),
    /// Registered, but the role may not open it.
    Denied(&'r PageEntry),
    /// Not in the registry at all; treated as "nothing selected".
    Unknown,
}

/// AccessFilter
///
/// Narrows a page registry down to what one role may see.
#[derive(Debug, Clone)]
pub struct AccessFilter {
    table: Arc<RoleAccessTable>,
}

impl AccessFilter {
    pub fn new(table: Arc<RoleAccessTable>) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &RoleAccessTable {
        &self.table
    }

    /// Keeps every registry entry whose id the role declares. The result follows
    /// registry order, not the role's declared order.
    pub fn filter_accessible<'r>(&self, registry: &'r PageRegistry, role: &Role) -> AccessibleSet<'r> {
        if !self.table.contains_role(role) {
            return AccessibleSet::default();
        }
        AccessibleSet {
            entries: registry
                .iter()
                .filter(|entry| self.table.allows(role, &entry.id))
                .collect(),
        }
    }

    /// Single-page check, equivalent to `filter_accessible(..).contains(page)`.
    pub fn has_access(&self, registry: &PageRegistry, page: &PageId, role: &Role) -> bool {
        registry.contains(page) && self.table.allows(role, page)
    }

    pub fn resolve_target<'r>(&self, registry: &'r PageRegistry, role: &Role, selected: &PageId) -> Target<'r> {
        match registry.get(selected) {
            None => Target::Unknown,
            Some(entry) if self.table.allows(role, selected) => Target::Permitted(entry),
            Some(entry) => Target::Denied(entry),
        }
    }
}
