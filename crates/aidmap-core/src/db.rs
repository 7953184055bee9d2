//! The assembled identity namespace and account lookups.

use std::sync::LazyLock;

use aidmap_types::aid::split_user;
use aidmap_types::{FsMetadata, Group, IdError, Namespace, Passwd};

use crate::codec::Codec;
use crate::config::AidConfig;
use crate::error::ConfigResult;
use crate::fs_config::FsConfig;
use crate::host::{AccountDatabase, DeviceProperties, HostShellProbe, NoDatabase, ShellProbe};
use crate::oem::OemPolicy;
use crate::ranges::RangeTable;
use crate::registry::Registry;

/// Home directory for platform and OEM accounts.
pub const ROOT_DIR: &str = "/";

/// Home directory for app accounts.
pub const APP_DIR: &str = "/data";

static BUILTIN: LazyLock<IdentityDb> = LazyLock::new(|| {
    match AidConfig::builtin().and_then(IdentityDb::from_config) {
        Ok(db) => db,
        Err(e) => panic!("built-in identity configuration is invalid: {e}"),
    }
});

/// Registry, range tables, OEM policy, and path rules, validated together.
///
/// Immutable once built. Every method is a pure read, so one instance can
/// be shared across threads without locking.
pub struct IdentityDb {
    registry: Registry,
    ranges: RangeTable,
    oem: OemPolicy,
    fs: FsConfig,
    shell: Box<dyn ShellProbe>,
    database: Box<dyn AccountDatabase>,
}

/// Builder for [`IdentityDb`] with substitutable collaborators.
pub struct IdentityDbBuilder {
    config: AidConfig,
    shell: Box<dyn ShellProbe>,
    properties: Option<Box<dyn DeviceProperties>>,
    database: Box<dyn AccountDatabase>,
}

impl IdentityDbBuilder {
    pub fn shell_probe(mut self, shell: impl ShellProbe + 'static) -> Self {
        self.shell = Box::new(shell);
        self
    }

    /// Overrides `first_api_level` from the config.
    pub fn properties(mut self, properties: impl DeviceProperties + 'static) -> Self {
        self.properties = Some(Box::new(properties));
        self
    }

    pub fn database(mut self, database: impl AccountDatabase + 'static) -> Self {
        self.database = Box::new(database);
        self
    }

    pub fn build(self) -> ConfigResult<IdentityDb> {
        let identity = self.config.identity;
        let registry = Registry::new(identity.registry);

        let allowed = identity
            .secondary_user_platform_ids
            .iter()
            .map(|r| r.resolve(&registry))
            .collect::<ConfigResult<Vec<_>>>()?;
        let ranges = RangeTable::new(identity.bands, allowed)?;

        let first_api_level = match &self.properties {
            Some(props) => props.first_api_level(),
            None => identity.first_api_level,
        };
        let oem = OemPolicy::new(identity.oem.reserved, identity.oem.legacy, first_api_level)?;

        let (dirs, files) = self.config.fs.resolve(&registry)?;
        let fs = FsConfig::new(dirs, files)?;

        tracing::info!(
            identities = registry.len(),
            dir_rules = fs.dirs().rules().len(),
            file_rules = fs.files().rules().len(),
            legacy_oem = oem.legacy_enabled(),
            "identity database built"
        );

        Ok(IdentityDb {
            registry,
            ranges,
            oem,
            fs,
            shell: self.shell,
            database: self.database,
        })
    }
}

impl IdentityDb {
    pub fn builder(config: AidConfig) -> IdentityDbBuilder {
        IdentityDbBuilder {
            config,
            shell: Box::new(HostShellProbe),
            properties: None,
            database: Box::new(NoDatabase),
        }
    }

    /// Build with the host shell probe and no account database.
    pub fn from_config(config: AidConfig) -> ConfigResult<Self> {
        Self::builder(config).build()
    }

    /// Process-wide instance built from the compiled-in defaults.
    ///
    /// # Panics
    ///
    /// On first use, if the compiled-in configuration does not validate.
    pub fn builtin() -> &'static IdentityDb {
        &BUILTIN
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn ranges(&self) -> &RangeTable {
        &self.ranges
    }

    pub fn oem(&self) -> &OemPolicy {
        &self.oem
    }

    pub fn fs(&self) -> &FsConfig {
        &self.fs
    }

    pub fn codec(&self) -> Codec<'_> {
        Codec::new(&self.registry, self.ranges.bands())
    }

    // ========================================================================
    // Codec and ranges
    // ========================================================================

    pub fn encode_name(&self, id: u32, ns: Namespace) -> Result<String, IdError> {
        self.codec().encode_name(id, ns)
    }

    pub fn decode_name(&self, name: &str, ns: Namespace) -> Result<u32, IdError> {
        self.codec().decode_name(name, ns)
    }

    pub fn is_valid_app_id(&self, id: u32, ns: Namespace) -> bool {
        self.ranges.is_valid_app_id(id, ns)
    }

    pub fn next_app_id(&self, current: u32, ns: Namespace) -> Option<u32> {
        self.ranges.next_app_id(current, ns)
    }

    pub fn app_ids(&self, ns: Namespace) -> impl Iterator<Item = u32> + '_ {
        self.ranges.app_ids(ns)
    }

    pub fn is_oem_id(&self, id: u32) -> bool {
        self.oem.is_oem_id(id, &self.registry)
    }

    pub fn oem_id_from_name(&self, name: &str) -> Option<u32> {
        self.oem.oem_id_from_name(name, &self.registry)
    }

    pub fn oem_name(&self, id: u32) -> Option<String> {
        self.oem.oem_name(id, &self.registry)
    }

    pub fn fs_config(&self, path: &str, is_dir: bool) -> FsMetadata {
        self.fs.resolve(path, is_dir)
    }

    // ========================================================================
    // Account lookups
    // ========================================================================

    pub fn getpwuid(&self, uid: u32) -> Result<Passwd, IdError> {
        if let Some(entry) = self.registry.by_id(uid) {
            return Ok(self.passwd(entry.name.clone(), uid, ROOT_DIR));
        }
        if let Some(pw) = self.database.passwd_by_uid(uid) {
            return Ok(pw);
        }
        if let Some(name) = self.oem_name(uid) {
            return Ok(self.passwd(name, uid, ROOT_DIR));
        }
        self.app_passwd(uid)
    }

    pub fn getpwnam(&self, name: &str) -> Result<Passwd, IdError> {
        if let Some(entry) = self.registry.by_name(name) {
            return Ok(self.passwd(entry.name.clone(), entry.id, ROOT_DIR));
        }
        if let Some(pw) = self.database.passwd_by_name(name) {
            return Ok(pw);
        }
        if let Some(uid) = self.oem_id_from_name(name) {
            return self.getpwuid(uid);
        }
        let uid = self.decode_name(name, Namespace::User).inspect_err(|_| {
            tracing::debug!(name, "no passwd entry");
        })?;
        self.app_passwd(uid)
    }

    /// Login name for `uid`, as `getpwuid` would report it. `None` when
    /// the uid has no passwd entry.
    pub fn login_name(&self, uid: u32) -> Option<String> {
        self.getpwuid(uid).ok().map(|pw| pw.name)
    }

    pub fn getgrgid(&self, gid: u32) -> Result<Group, IdError> {
        if let Some(entry) = self.registry.by_id(gid) {
            return Ok(Group::new(entry.name.clone(), gid));
        }
        if let Some(gr) = self.database.group_by_gid(gid) {
            return Ok(gr);
        }
        if let Some(name) = self.oem_name(gid) {
            return Ok(Group::new(name, gid));
        }
        self.app_group(gid)
    }

    pub fn getgrnam(&self, name: &str) -> Result<Group, IdError> {
        if let Some(entry) = self.registry.by_name(name) {
            return Ok(Group::new(entry.name.clone(), entry.id));
        }
        if let Some(gr) = self.database.group_by_name(name) {
            return Ok(gr);
        }
        if let Some(gid) = self.oem_id_from_name(name) {
            return self.getgrgid(gid);
        }
        let gid = self.decode_name(name, Namespace::Group).inspect_err(|_| {
            tracing::debug!(name, "no group entry");
        })?;
        self.app_group(gid)
    }

    fn passwd(&self, name: String, uid: u32, dir: &str) -> Passwd {
        Passwd {
            name,
            uid,
            gid: uid,
            dir: dir.to_string(),
            shell: self.shell.login_shell().to_string(),
        }
    }

    /// Shared tail of the uid lookups: per-user app and platform ids.
    fn app_passwd(&self, uid: u32) -> Result<Passwd, IdError> {
        let bands = self.ranges.bands();
        if uid < bands.app.start || !self.is_valid_app_id(uid, Namespace::User) {
            tracing::debug!(uid, "no passwd entry");
            return Err(IdError::not_found(uid));
        }
        let name = self.encode_name(uid, Namespace::User)?;
        let (_, app_id) = split_user(uid);
        let dir = if app_id < bands.app.start { ROOT_DIR } else { APP_DIR };
        Ok(self.passwd(name, uid, dir))
    }

    fn app_group(&self, gid: u32) -> Result<Group, IdError> {
        if gid < self.ranges.bands().app.start || !self.is_valid_app_id(gid, Namespace::Group) {
            tracing::debug!(gid, "no group entry");
            return Err(IdError::not_found(gid));
        }
        let name = self.encode_name(gid, Namespace::Group)?;
        Ok(Group::new(name, gid))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::StaticProperties;
    use aidmap_types::aid::*;
    use std::sync::Arc;

    struct Shell(bool);

    impl ShellProbe for Shell {
        fn exists(&self, _path: &str) -> bool {
            self.0
        }
    }

    struct Vendor;

    impl AccountDatabase for Vendor {
        fn passwd_by_name(&self, name: &str) -> Option<Passwd> {
            (name == "vendor_thing").then(|| Passwd {
                name: name.into(),
                uid: 2901,
                gid: 2901,
                dir: "/vendor".into(),
                shell: "/vendor/bin/sh".into(),
            })
        }

        fn group_by_gid(&self, gid: u32) -> Option<Group> {
            (gid == 2902).then(|| Group::new("vendor_group", gid))
        }
    }

    fn db() -> IdentityDb {
        IdentityDb::builder(AidConfig::builtin().unwrap())
            .shell_probe(Shell(false))
            .build()
            .unwrap()
    }

    // ── Construction ────────────────────────────────────────────────────

    #[test]
    fn test_builtin_builds() {
        let db = IdentityDb::builtin();
        assert_eq!(db.registry().by_name("root").map(|e| e.id), Some(AID_ROOT));
        assert!(!db.oem().legacy_enabled());
    }

    #[test]
    fn test_unknown_allow_list_name_rejected() {
        let mut cfg = AidConfig::builtin().unwrap();
        cfg.identity
            .secondary_user_platform_ids
            .push(crate::config::IdRef::Name("nosuch".into()));
        assert!(matches!(
            IdentityDb::from_config(cfg),
            Err(crate::ConfigError::UnknownIdentity(n)) if n == "nosuch"
        ));
    }

    #[test]
    fn test_properties_override_config() {
        let db = IdentityDb::builder(AidConfig::builtin().unwrap().with_first_api_level(Some(30)))
            .properties(StaticProperties { first_api_level: Some(27) })
            .build()
            .unwrap();
        assert!(db.oem().legacy_enabled());
        assert!(db.is_oem_id(4000));
    }

    // ── passwd ──────────────────────────────────────────────────────────

    #[test]
    fn test_getpwuid_platform() {
        let pw = db().getpwuid(AID_SYSTEM).unwrap();
        assert_eq!(pw.name, "system");
        assert_eq!((pw.uid, pw.gid), (1000, 1000));
        assert_eq!(pw.dir, "/");
        assert_eq!(pw.shell, "/system/bin/sh");
    }

    #[test]
    fn test_getpwuid_app() {
        let pw = db().getpwuid(AID_USER_OFFSET + AID_APP_START + 5).unwrap();
        assert_eq!(pw.name, "u1_a5");
        assert_eq!(pw.dir, "/data");
    }

    #[test]
    fn test_getpwuid_secondary_platform() {
        let pw = db().getpwuid(AID_USER_OFFSET + AID_SHELL).unwrap();
        assert_eq!(pw.name, "u1_shell");
        assert_eq!(pw.dir, "/");
        assert!(db().getpwuid(AID_USER_OFFSET + AID_ROOT).is_err());
    }

    #[test]
    fn test_getpwuid_oem() {
        let pw = db().getpwuid(2950).unwrap();
        assert_eq!(pw.name, "oem_2950");
        assert!(db().getpwuid(4000).is_err());
    }

    #[test]
    fn test_getpwuid_invalid() {
        let db = db();
        assert!(db.getpwuid(AID_CACHE_GID_START).is_err());
        assert!(db.getpwuid(AID_OVERFLOWUID).is_err());
        assert_eq!(db.getpwuid(4444).unwrap_err(), IdError::NotFound("4444".into()));
    }

    #[test]
    fn test_getpwnam() {
        let db = db();
        assert_eq!(db.getpwnam("shell").unwrap().uid, AID_SHELL);
        assert_eq!(db.getpwnam("oem_5001").unwrap().uid, 5001);
        assert_eq!(db.getpwnam("u0_a1234").unwrap().uid, AID_APP_START + 1234);
        assert_eq!(db.getpwnam("u2_i3").unwrap().uid, 2 * AID_USER_OFFSET + AID_ISOLATED_START + 3);
        assert_eq!(db.getpwnam("u1_radio").unwrap().uid, AID_USER_OFFSET + AID_RADIO);
        assert!(db.getpwnam("u0_system").is_err());
        assert!(db.getpwnam("u0_a5_cache").is_err());
        assert!(db.getpwnam("oem_4000").is_err());
    }

    #[test]
    fn test_oem_names_are_canonical() {
        let db = db();
        assert!(db.getpwnam("oem_02950").is_err());
        assert!(db.getgrnam("oem_002950").is_err());
        assert!(db.getgrnam("oem_05001").is_err());

        let pw = db.getpwnam("oem_2950").unwrap();
        assert_eq!(pw, db.getpwuid(2950).unwrap());
        assert_eq!(pw.name, "oem_2950");
        let gr = db.getgrnam("oem_5001").unwrap();
        assert_eq!(gr, Group::new("oem_5001", 5001));
    }

    #[test]
    fn test_login_name() {
        let db = db();
        assert_eq!(db.login_name(AID_ROOT).as_deref(), Some("root"));
        assert_eq!(db.login_name(AID_SHELL).as_deref(), Some("shell"));
        assert_eq!(db.login_name(2950).as_deref(), Some("oem_2950"));
        assert_eq!(db.login_name(AID_USER_OFFSET + AID_APP_START + 5).as_deref(), Some("u1_a5"));
        assert_eq!(db.login_name(4444), None);
        assert_eq!(db.login_name(AID_OVERFLOWUID), None);
    }

    #[test]
    fn test_host_shell_preferred() {
        let db = IdentityDb::builder(AidConfig::builtin().unwrap())
            .shell_probe(Shell(true))
            .build()
            .unwrap();
        assert_eq!(db.getpwnam("root").unwrap().shell, "/bin/sh");
    }

    // ── group ───────────────────────────────────────────────────────────

    #[test]
    fn test_group_lookups() {
        let db = db();
        assert_eq!(db.getgrgid(3003).unwrap(), Group::new("inet", 3003));
        assert_eq!(db.getgrnam("all_a50").unwrap().gid, AID_SHARED_GID_START + 50);
        assert_eq!(db.getgrgid(AID_EXT_GID_START + 9).unwrap().name, "u0_a9_ext");
        assert_eq!(db.getgrnam("u3_a9_cache").unwrap().gid, 3 * AID_USER_OFFSET + AID_CACHE_GID_START + 9);
        assert!(db.getgrgid(AID_USER_OFFSET + AID_SHARED_GID_START + 50).is_err());
        assert!(db.getgrnam("u0_nosuch").is_err());
    }

    // ── Account database ────────────────────────────────────────────────

    #[test]
    fn test_database_consulted_after_registry() {
        let db = IdentityDb::builder(AidConfig::builtin().unwrap())
            .database(Vendor)
            .build()
            .unwrap();
        assert_eq!(db.getpwnam("vendor_thing").unwrap().dir, "/vendor");
        assert_eq!(db.getgrgid(2902).unwrap().name, "vendor_group");
        assert_eq!(db.getgrgid(2903).unwrap().name, "oem_2903");
        assert_eq!(db.getpwnam("system").unwrap().uid, AID_SYSTEM);
    }

    // ── Paths ───────────────────────────────────────────────────────────

    #[test]
    fn test_builtin_fs_config() {
        let db = db();
        let apk = db.fs_config("data/app/foo.apk", false);
        assert_eq!((apk.uid, apk.gid, apk.mode), (AID_SYSTEM, AID_SYSTEM, 0o644));
        assert_eq!(db.fs_config("data/local/tmp", true).uid, AID_SHELL);
        assert_eq!(db.fs_config("data/local/tmp", true).mode, 0o771);
        assert_eq!(db.fs_config("nowhere/special", true).mode, 0o755);
        assert_eq!(db.fs_config("nowhere/special", false).mode, 0o644);
        assert_eq!(db.fs_config("system/bin/run-as", false).capabilities, 0xc0);
    }

    // ── Concurrency ─────────────────────────────────────────────────────

    #[test]
    fn test_shared_across_threads() {
        let db = Arc::new(db());
        let handles: Vec<_> = (0..4u32)
            .map(|user| {
                let db = Arc::clone(&db);
                std::thread::spawn(move || {
                    let id = user * AID_USER_OFFSET + AID_APP_START + 42;
                    let name = db.encode_name(id, Namespace::User).unwrap();
                    db.decode_name(&name, Namespace::User).unwrap()
                })
            })
            .collect();
        for (user, handle) in handles.into_iter().enumerate() {
            assert_eq!(handle.join().unwrap(), user as u32 * AID_USER_OFFSET + AID_APP_START + 42);
        }
    }

    #[test]
    fn test_builtin_is_one_instance() {
        let here = IdentityDb::builtin();
        let same = std::thread::spawn(move || std::ptr::eq(here, IdentityDb::builtin()))
            .join()
            .unwrap();
        assert!(same);
    }
}
