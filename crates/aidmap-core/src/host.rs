//! Host collaborators the account lookups consult.
//!
//! Each is a small trait so tests and embedders can substitute their own.
//! All are `Send + Sync`; an [`IdentityDb`](crate::IdentityDb) holding them
//! is shared freely across threads.

use std::path::Path;

use aidmap_types::{Group, Passwd};

/// Login shell used when `/bin/sh` is not present.
pub const DEVICE_SHELL: &str = "/system/bin/sh";

/// Preferred login shell.
pub const HOST_SHELL: &str = "/bin/sh";

/// Answers whether a path exists.
pub trait ShellProbe: Send + Sync {
    fn exists(&self, path: &str) -> bool;

    /// The login shell for passwd records.
    fn login_shell(&self) -> &'static str {
        if self.exists(HOST_SHELL) { HOST_SHELL } else { DEVICE_SHELL }
    }
}

/// Checks the real filesystem.
#[derive(Clone, Copy, Debug, Default)]
pub struct HostShellProbe;

impl ShellProbe for HostShellProbe {
    fn exists(&self, path: &str) -> bool {
        Path::new(path).exists()
    }
}

/// Device properties that change lookup behavior.
pub trait DeviceProperties: Send + Sync {
    /// `ro.product.first_api_level`, if set.
    fn first_api_level(&self) -> Option<u32>;
}

/// Fixed property values.
#[derive(Clone, Copy, Debug, Default)]
pub struct StaticProperties {
    pub first_api_level: Option<u32>,
}

impl DeviceProperties for StaticProperties {
    fn first_api_level(&self) -> Option<u32> {
        self.first_api_level
    }
}

/// Extra accounts from passwd/group files.
///
/// Consulted after the platform registry and before OEM and app ids. Every
/// method defaults to "not here".
pub trait AccountDatabase: Send + Sync {
    fn passwd_by_uid(&self, _uid: u32) -> Option<Passwd> {
        None
    }

    fn passwd_by_name(&self, _name: &str) -> Option<Passwd> {
        None
    }

    fn group_by_gid(&self, _gid: u32) -> Option<Group> {
        None
    }

    fn group_by_name(&self, _name: &str) -> Option<Group> {
        None
    }
}

/// No extra accounts.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoDatabase;

impl AccountDatabase for NoDatabase {}
