//! Filesystem ownership rules and their resolved metadata.

use serde::{Deserialize, Serialize};

/// Marks a file rule prefix as a wildcard.
pub const WILDCARD: char = '*';

/// One row of a path rule table.
///
/// Tables are scanned first-match-wins, so a rule's position is part of its
/// meaning. An empty `prefix` is the table's catch-all and belongs last.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathRule {
    /// Permission bits, including setuid/setgid/sticky (e.g. `0o4750`).
    pub mode: u32,
    pub uid: u32,
    pub gid: u32,
    /// Linux capability mask applied to the file.
    pub capabilities: u64,
    pub prefix: String,
}

impl PathRule {
    pub fn new(mode: u32, uid: u32, gid: u32, prefix: impl Into<String>) -> Self {
        Self {
            mode,
            uid,
            gid,
            capabilities: 0,
            prefix: prefix.into(),
        }
    }

    pub fn with_capabilities(mut self, capabilities: u64) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// The empty-prefix default rule.
    pub fn is_catch_all(&self) -> bool {
        self.prefix.is_empty()
    }

    /// For a `*`-terminated prefix, the literal part before the marker.
    pub fn wildcard_stem(&self) -> Option<&str> {
        self.prefix.strip_suffix(WILDCARD)
    }

    pub fn metadata(&self) -> FsMetadata {
        FsMetadata {
            uid: self.uid,
            gid: self.gid,
            mode: self.mode,
            capabilities: self.capabilities,
        }
    }
}

/// Ownership and permissions assigned to a filesystem entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FsMetadata {
    pub uid: u32,
    pub gid: u32,
    pub mode: u32,
    pub capabilities: u64,
}

impl std::fmt::Display for FsMetadata {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{} {:04o}", self.uid, self.gid, self.mode)?;
        if self.capabilities != 0 {
            write!(f, " caps={:#x}", self.capabilities)?;
        }
        Ok(())
    }
}
