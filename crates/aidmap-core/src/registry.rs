//! Fixed platform identity table.

use std::collections::HashSet;

use aidmap_types::IdentityEntry;

/// Name ↔ id table for platform-reserved identities.
///
/// Lookups are linear scans in table order; the table has a few dozen rows
/// and callers rely on "first entry wins". Names and ids are expected to be
/// unique. A duplicate is a configuration bug and is logged, not rejected.
#[derive(Clone, Debug, Default)]
pub struct Registry {
    entries: Vec<IdentityEntry>,
}

impl Registry {
    pub fn new(entries: Vec<IdentityEntry>) -> Self {
        let mut names = HashSet::new();
        let mut ids = HashSet::new();
        for entry in &entries {
            if !names.insert(entry.name.as_str()) {
                tracing::warn!(name = %entry.name, "duplicate registry name; first entry wins");
            }
            if !ids.insert(entry.id) {
                tracing::warn!(id = entry.id, name = %entry.name, "duplicate registry id; first entry wins");
            }
        }
        Self { entries }
    }

    pub fn by_id(&self, id: u32) -> Option<&IdentityEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn by_name(&self, name: &str) -> Option<&IdentityEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn contains_id(&self, id: u32) -> bool {
        self.by_id(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &IdentityEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
