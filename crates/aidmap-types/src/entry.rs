//! Identity records: registry entries and passwd/group results.

use serde::{Deserialize, Serialize};

/// A platform-reserved identity: `"system" ↔ 1000`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdentityEntry {
    pub name: String,
    pub id: u32,
}

impl IdentityEntry {
    pub fn new(name: impl Into<String>, id: u32) -> Self {
        Self {
            name: name.into(),
            id,
        }
    }
}

impl std::fmt::Display for IdentityEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

/// A resolved user account, shaped like `struct passwd`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passwd {
    /// Login name.
    pub name: String,
    pub uid: u32,
    /// Primary group; always equal to `uid` on Android.
    pub gid: u32,
    /// Initial working directory.
    pub dir: String,
    /// Login shell.
    pub shell: String,
}

/// A resolved group, shaped like `struct group` without a member list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub name: String,
    pub gid: u32,
}

impl Group {
    pub fn new(name: impl Into<String>, gid: u32) -> Self {
        Self {
            name: name.into(),
            gid,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_entry_display() {
        assert_eq!(IdentityEntry::new("shell", 2000).to_string(), "shell (2000)");
    }

    #[test]
    fn test_passwd_serde_json_roundtrip() {
        let pw = Passwd {
            name: "u0_a5".into(),
            uid: 10005,
            gid: 10005,
            dir: "/data".into(),
            shell: "/system/bin/sh".into(),
        };
        let json = serde_json::to_string(&pw).unwrap();
        let parsed: Passwd = serde_json::from_str(&json).unwrap();
        assert_eq!(pw, parsed);
    }

    #[test]
    fn test_group_new() {
        let g = Group::new("inet", 3003);
        assert_eq!(g.name, "inet");
        assert_eq!(g.gid, 3003);
    }
}
