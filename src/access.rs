use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use ts_rs::TS;
use utoipa::ToSchema;

use crate::error::AccessTableError;

/// Landing page every fresh or logged-out session points at.
pub const LANDING_PAGE: &str = "Dashboard";

/// Role
///
/// Identifier classifying a user's permission level. Kept as an open string key:
/// the built-in roles are just the entries of [`RoleAccessTable::standard`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS, ToSchema)]
#[serde(transparent)]
#[ts(export)]
pub struct Role(String);

impl Role {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Role {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// PageId
///
/// Stable identifier of a navigable page. Matching is exact and case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS, ToSchema)]
#[serde(transparent)]
#[ts(export)]
pub struct PageId(String);

impl PageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn landing() -> Self {
        Self::new(LANDING_PAGE)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PageId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for PageId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, Default)]
struct RoleEntry {
    // Declared menu order.
    pages: Vec<PageId>,
    index: HashSet<PageId>,
}

/// RoleAccessTable
///
/// Flat mapping from role to the ordered set of pages it may view. Built once at
/// startup and never mutated; share it behind an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct RoleAccessTable {
    entries: HashMap<Role, RoleEntry>,
}

impl RoleAccessTable {
    /// Builds a table from `(role, pages)` pairs. Repeated pages inside one role
    /// keep their first position; a repeated role replaces the earlier entry.
    pub fn from_entries<R, I, P>(entries: I) -> Self
    where
        I: IntoIterator<Item = (R, Vec<P>)>,
        R: Into<Role>,
        P: Into<PageId>,
    {
        let entries = entries
            .into_iter()
            .map(|(role, pages)| {
                let mut entry = RoleEntry::default();
                for page in pages.into_iter().map(Into::into) {
                    if entry.index.insert(page.clone()) {
                        entry.pages.push(page);
                    }
                }
                (role.into(), entry)
            })
            .collect();

        Self { entries }
    }

    /// The dealership profiles and the dashboards each of them may open.
    pub fn standard() -> Self {
        Self::from_entries([
            (
                "diretor",
                vec!["Dashboard", "Comercial", "Carros", "Yamaha", "Gsv", "Adm", "Venda"],
            ),
            (
                "gestor_comercial",
                vec!["Dashboard", "Comercial", "Carros", "Yamaha"],
            ),
            ("gestor_posvenda", vec!["Dashboard", "Gsv", "Yamaha"]),
            ("vendedor", vec!["Dashboard", "Venda"]),
            ("adm_cnhc", vec!["Dashboard", "Adm"]),
        ])
    }

    /// Reads a JSON object of the form `{ "role": ["Page", ...] }`.
    pub fn from_json_file(path: &str) -> Result<Self, AccessTableError> {
        let raw = std::fs::read_to_string(path).map_err(|source| AccessTableError::Io {
            path: path.to_string(),
            source,
        })?;
        Self::from_json_str(&raw).map_err(|source| AccessTableError::Parse {
            path: path.to_string(),
            source,
        })
    }

    pub fn from_json_str(raw: &str) -> Result<Self, serde_json::Error> {
        let parsed: HashMap<String, Vec<String>> = serde_json::from_str(raw)?;
        Ok(Self::from_entries(
            parsed.into_iter().map(|(role, pages)| (Role::new(role), pages)),
        ))
    }

    /// Pages declared for `role`, in declared order. Unknown roles get an empty
    /// slice: deny-all, not a fault.
    pub fn lookup(&self, role: &Role) -> &[PageId] {
        self.entries
            .get(role)
            .map(|entry| entry.pages.as_slice())
            .unwrap_or(&[])
    }

    /// O(1) membership check against the role's declared pages.
    pub fn allows(&self, role: &Role, page: &PageId) -> bool {
        self.entries
            .get(role)
            .is_some_and(|entry| entry.index.contains(page))
    }

    pub fn contains_role(&self, role: &Role) -> bool {
        self.entries.contains_key(role)
    }

    /// Declared roles, sorted for stable output.
    pub fn roles(&self) -> Vec<&Role> {
        let mut roles: Vec<&Role> = self.entries.keys().collect();
        roles.sort();
        roles
    }
}
