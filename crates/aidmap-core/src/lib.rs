//! Android identity namespace and filesystem ownership rules.
//!
//! Builds on `aidmap-types` to answer the questions an image builder or a
//! libc shim asks about Android ids:
//!
//! ```text
//! IdentityDb
//!     ├── Registry      "system" ↔ 1000, first match wins
//!     ├── RangeTable    app bands per namespace, validity, iteration
//!     ├── Codec         u10_a1234 ↔ 1010000 + 1234 (via AppName)
//!     ├── OemPolicy     oem_2950 ↔ 2950
//!     ├── FsConfig      path → uid/gid/mode/capabilities
//!     └── host traits   shell probe, device properties, account database
//! ```
//!
//! Lookups go registry → account database → OEM → per-user app ids. All
//! tables come from RON (see [`config`]) and are validated once, when the
//! [`IdentityDb`] is built; after that nothing mutates.

pub mod codec;
pub mod config;
pub mod db;
pub mod error;
pub mod fs_config;
pub mod host;
pub mod oem;
pub mod ranges;
pub mod registry;

pub use codec::{AppBand, AppName, Codec};
pub use config::{AidConfig, FsRulesConfig, IdRef, IdentityConfig, OemConfig, RuleEntry};
pub use db::{IdentityDb, IdentityDbBuilder};
pub use error::{ConfigError, ConfigResult};
pub use fs_config::{FsConfig, RuleTable};
pub use host::{
    AccountDatabase, DeviceProperties, HostShellProbe, NoDatabase, ShellProbe, StaticProperties,
};
pub use oem::OemPolicy;
pub use ranges::{RangeTable, is_ascending_non_overlapping};
pub use registry::Registry;

// Types callers need for nearly every call.
pub use aidmap_types::{FsMetadata, Group, IdError, IdRange, Namespace, Passwd};
