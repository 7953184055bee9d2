//! RON configuration: identity tables and path rules.
//!
//! Defaults are compiled in from `assets/defaults/`. An override file may
//! replace either section wholesale:
//!
//! ```ron
//! (
//!     identity: Some((registry: [(name: "root", id: 0)], first_api_level: Some(28))),
//!     fs: None,
//! )
//! ```
//!
//! Rules and the secondary-user allow-list name identities either by
//! registry name (`"system"`) or by number (`10000`).

use std::path::Path;

use aidmap_types::aid::{
    AID_EVERYBODY, AID_OEM_RESERVED_2_END, AID_OEM_RESERVED_2_START, AID_OEM_RESERVED_END,
    AID_OEM_RESERVED_START,
};
use aidmap_types::{IdBands, IdRange, IdentityEntry, PathRule};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::registry::Registry;

/// Default identity table.
pub const DEFAULT_ANDROID_IDS: &str = include_str!("../../../assets/defaults/android_ids.ron");

/// Default path rule tables.
pub const DEFAULT_FS_CONFIG: &str = include_str!("../../../assets/defaults/fs_config.ron");

/// An identity referenced from config, by number or registry name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IdRef {
    Id(u32),
    Name(String),
}

impl IdRef {
    pub fn resolve(&self, registry: &Registry) -> ConfigResult<u32> {
        match self {
            IdRef::Id(id) => Ok(*id),
            IdRef::Name(name) => registry
                .by_name(name)
                .map(|entry| entry.id)
                .ok_or_else(|| ConfigError::UnknownIdentity(name.clone())),
        }
    }
}

/// A path rule as written in config.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleEntry {
    pub mode: u32,
    pub uid: IdRef,
    pub gid: IdRef,
    #[serde(default)]
    pub capabilities: u64,
    pub prefix: String,
}

impl RuleEntry {
    pub fn resolve(&self, registry: &Registry) -> ConfigResult<PathRule> {
        Ok(PathRule::new(
            self.mode,
            self.uid.resolve(registry)?,
            self.gid.resolve(registry)?,
            self.prefix.clone(),
        )
        .with_capabilities(self.capabilities))
    }
}

/// OEM band layout.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OemConfig {
    pub reserved: Vec<IdRange>,
    /// Extra band honored on devices that launched before API 29.
    pub legacy: IdRange,
}

impl Default for OemConfig {
    fn default() -> Self {
        Self {
            reserved: vec![
                IdRange::new(AID_OEM_RESERVED_START, AID_OEM_RESERVED_END),
                IdRange::new(AID_OEM_RESERVED_2_START, AID_OEM_RESERVED_2_END),
            ],
            legacy: IdRange::new(AID_OEM_RESERVED_START, AID_EVERYBODY - 1),
        }
    }
}

/// Everything the identity namespace is built from.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    pub registry: Vec<IdentityEntry>,
    pub bands: IdBands,
    pub secondary_user_platform_ids: Vec<IdRef>,
    pub oem: OemConfig,
    /// Device launch API level; `None` when unknown.
    pub first_api_level: Option<u32>,
}

/// Directory and file rule tables.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FsRulesConfig {
    pub dirs: Vec<RuleEntry>,
    pub files: Vec<RuleEntry>,
}

impl FsRulesConfig {
    pub fn resolve(&self, registry: &Registry) -> ConfigResult<(Vec<PathRule>, Vec<PathRule>)> {
        let dirs = self.dirs.iter().map(|r| r.resolve(registry)).collect::<ConfigResult<_>>()?;
        let files = self.files.iter().map(|r| r.resolve(registry)).collect::<ConfigResult<_>>()?;
        Ok((dirs, files))
    }
}

/// Shape of an override file. Absent sections keep their defaults.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigOverride {
    identity: Option<IdentityConfig>,
    fs: Option<FsRulesConfig>,
}

/// Complete configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AidConfig {
    pub identity: IdentityConfig,
    pub fs: FsRulesConfig,
}

impl AidConfig {
    /// The compiled-in defaults.
    pub fn builtin() -> ConfigResult<Self> {
        Ok(Self {
            identity: ron::from_str(DEFAULT_ANDROID_IDS)?,
            fs: ron::from_str(DEFAULT_FS_CONFIG)?,
        })
    }

    /// Apply an override document on top of this config.
    pub fn with_override(mut self, text: &str) -> ConfigResult<Self> {
        let ov: ConfigOverride = ron::from_str(text)?;
        if let Some(identity) = ov.identity {
            self.identity = identity;
        }
        if let Some(fs) = ov.fs {
            self.fs = fs;
        }
        Ok(self)
    }

    /// Defaults overlaid with the file at `path`.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        tracing::info!(path = %path.display(), "loading config override");
        Self::builtin()?.with_override(&text)
    }

    pub fn with_first_api_level(mut self, level: Option<u32>) -> Self {
        self.identity.first_api_level = level;
        self
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_builtin_parses() {
        let cfg = AidConfig::builtin().unwrap();
        let reg = Registry::new(cfg.identity.registry.clone());
        assert_eq!(reg.by_name("system").map(|e| e.id), Some(1000));
        assert_eq!(reg.by_name("shell").map(|e| e.id), Some(2000));
        assert_eq!(reg.by_name("nobody").map(|e| e.id), Some(9999));
        assert_eq!(cfg.identity.bands, IdBands::default());
        assert_eq!(cfg.identity.oem, OemConfig::default());
        assert_eq!(cfg.identity.first_api_level, None);
        assert_eq!(cfg.identity.secondary_user_platform_ids.len(), 8);
        assert!(cfg.fs.dirs.last().is_some_and(|r| r.prefix.is_empty()));
        assert!(cfg.fs.files.last().is_some_and(|r| r.prefix.is_empty()));
    }

    #[test]
    fn test_builtin_rules_resolve() {
        let cfg = AidConfig::builtin().unwrap();
        let reg = Registry::new(cfg.identity.registry.clone());
        let (dirs, files) = cfg.fs.resolve(&reg).unwrap();
        assert_eq!(dirs.len(), cfg.fs.dirs.len());
        let app = files.iter().find(|r| r.prefix == "data/data/*").unwrap();
        assert_eq!((app.uid, app.gid), (10000, 10000));
    }

    #[test]
    fn test_id_ref_forms() {
        let reg = Registry::new(vec![IdentityEntry::new("shell", 2000)]);
        let refs: Vec<IdRef> = ron::from_str(r#"[2000, "shell", "nosuch"]"#).unwrap();
        assert_eq!(refs[0], IdRef::Id(2000));
        assert_eq!(refs[1].resolve(&reg).unwrap(), 2000);
        assert!(matches!(refs[2].resolve(&reg), Err(ConfigError::UnknownIdentity(n)) if n == "nosuch"));
    }

    #[test]
    fn test_rule_entry_capabilities_default() {
        let row: RuleEntry =
            ron::from_str(r#"(mode: 0o755, uid: 0, gid: "root", prefix: "x")"#).unwrap();
        assert_eq!(row.capabilities, 0);
        let reg = Registry::new(vec![IdentityEntry::new("root", 0)]);
        assert_eq!(row.resolve(&reg).unwrap(), PathRule::new(0o755, 0, 0, "x"));
    }

    #[test]
    fn test_override_replaces_one_section() {
        let cfg = AidConfig::builtin()
            .unwrap()
            .with_override(r#"(identity: Some((registry: [(name: "root", id: 0)], first_api_level: Some(28))))"#)
            .unwrap();
        assert_eq!(cfg.identity.registry.len(), 1);
        assert_eq!(cfg.identity.first_api_level, Some(28));
        assert_eq!(cfg.identity.bands, IdBands::default());
        assert_eq!(cfg.fs, AidConfig::builtin().unwrap().fs);
    }

    #[test]
    fn test_override_parse_error() {
        let err = AidConfig::builtin().unwrap().with_override("(identity: [").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"(fs: Some((dirs: [(mode: 0o700, uid: "root", gid: "root", prefix: "")], files: [(mode: 0o600, uid: 0, gid: 0, prefix: "")])))"#
        )
        .unwrap();
        let cfg = AidConfig::load(file.path()).unwrap();
        assert_eq!(cfg.fs.dirs.len(), 1);
        assert_eq!(cfg.identity, AidConfig::builtin().unwrap().identity);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = AidConfig::load(dir.path().join("absent.ron")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
