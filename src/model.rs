//! Domain entities shared by the panes, the executor and the startup code.

use std::fmt;
use std::sync::Arc;

use crate::backend::{Backend, PackageUpdate};

/// Name of a package manager, e.g. `apt` or `homebrew`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ManagerId(String);

impl ManagerId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ManagerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ManagerId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// One enabled package manager. Built once at startup.
#[derive(Clone)]
pub struct ManagerEntry {
    pub id: ManagerId,
    pub icon: char,
    pub backend: Arc<dyn Backend>,
}

impl fmt::Debug for ManagerEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagerEntry")
            .field("id", &self.id)
            .field("icon", &self.icon)
            .finish_non_exhaustive()
    }
}

/// A pending update as shown in a packages pane.
///
/// `selected` and `updating` only live until the next refresh replaces the list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageItem {
    pub name: String,
    pub old_version: String,
    pub new_version: String,
    pub selected: bool,
    pub updating: bool,
}

impl From<PackageUpdate> for PackageItem {
    fn from(update: PackageUpdate) -> Self {
        Self {
            name: update.name,
            old_version: update.old_version,
            new_version: update.new_version,
            selected: false,
            updating: false,
        }
    }
}
