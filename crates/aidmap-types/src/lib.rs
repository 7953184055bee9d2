//! Shared identity types for aidmap.
//!
//! Leaf crate with no internal dependencies: AID constants, id ranges and the
//! band layout, registry/passwd/group records, path rules, and the lookup
//! error. `aidmap-core` builds the codec and resolver on top of these.
//!
//! # Id layout
//!
//! ```text
//! full id = user_index * AID_USER_OFFSET + app_id
//!
//! app_id     0 ..  9999   platform ids (root, system, shell, oem_*)
//!        10000 .. 19999   apps                  u0_a1234
//!        20000 .. 29999   app cache gids        u0_a1234_cache
//!        30000 .. 39999   app external gids     u0_a1234_ext
//!        40000 .. 49999   app ext cache gids    u0_a1234_ext_cache
//!        50000 .. 59999   shared gids (user 0)  all_a1234
//!        90000 .. 99999   isolated processes    u0_i1234
//! ```

pub mod aid;
pub mod entry;
pub mod error;
pub mod fs;
pub mod namespace;
pub mod range;

pub use entry::{Group, IdentityEntry, Passwd};
pub use error::IdError;
pub use fs::{FsMetadata, PathRule, WILDCARD};
pub use namespace::Namespace;
pub use range::{IdBands, IdRange};
