//! Inclusive id ranges and the band layout of the app id space.

use serde::{Deserialize, Serialize};

use crate::aid::*;

/// An inclusive range of app ids, `start..=end`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdRange {
    pub start: u32,
    pub end: u32,
}

impl IdRange {
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Whether `id` lies inside the range (both ends inclusive).
    pub const fn contains(&self, id: u32) -> bool {
        id >= self.start && id <= self.end
    }

    /// `start <= end`.
    pub const fn is_well_formed(&self) -> bool {
        self.start <= self.end
    }

    /// Offset of `id` from the start of the range, if it is inside.
    pub fn offset_of(&self, id: u32) -> Option<u32> {
        self.contains(id).then(|| id - self.start)
    }
}

impl std::fmt::Display for IdRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

/// Where each structured band sits inside a single user's id space.
///
/// The user range set is `[app, isolated]`; the group range set adds the
/// storage and shared gid bands in between. Both sets must come out
/// ascending, which `aidmap-core` checks when it builds its tables.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdBands {
    pub app: IdRange,
    pub cache_gid: IdRange,
    pub ext_gid: IdRange,
    pub ext_cache_gid: IdRange,
    pub shared_gid: IdRange,
    pub isolated: IdRange,
}

impl Default for IdBands {
    fn default() -> Self {
        Self {
            app: IdRange::new(AID_APP_START, AID_APP_END),
            cache_gid: IdRange::new(AID_CACHE_GID_START, AID_CACHE_GID_END),
            ext_gid: IdRange::new(AID_EXT_GID_START, AID_EXT_GID_END),
            ext_cache_gid: IdRange::new(AID_EXT_CACHE_GID_START, AID_EXT_CACHE_GID_END),
            shared_gid: IdRange::new(AID_SHARED_GID_START, AID_SHARED_GID_END),
            isolated: IdRange::new(AID_ISOLATED_START, AID_ISOLATED_END),
        }
    }
}

impl IdBands {
    /// Reserved app ranges for uids, in ascending order.
    pub fn user_ranges(&self) -> Vec<IdRange> {
        vec![self.app, self.isolated]
    }

    /// Reserved app ranges for gids, in ascending order.
    pub fn group_ranges(&self) -> Vec<IdRange> {
        vec![
            self.app,
            self.cache_gid,
            self.ext_gid,
            self.ext_cache_gid,
            self.shared_gid,
            self.isolated,
        ]
    }
}
