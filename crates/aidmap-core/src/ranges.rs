//! Reserved app id ranges: validation and iteration.
//!
//! Every device user gets the same layout of bands inside its
//! `AID_USER_OFFSET`-sized slice of the id space, so all checks here work on
//! the app id (`id % AID_USER_OFFSET`) and then apply per-user rules on top.

use aidmap_types::aid::{AID_OVERFLOWUID, AID_USER_OFFSET, split_user};
use aidmap_types::{IdBands, IdRange, Namespace};

use crate::error::{ConfigError, ConfigResult};

/// Check that a range set is usable for validation and iteration.
///
/// Needs at least two ranges (apps plus isolated processes), none inverted,
/// and each range strictly after the previous one.
pub fn is_ascending_non_overlapping(ranges: &[IdRange]) -> bool {
    if ranges.len() < 2 {
        return false;
    }
    ranges.iter().all(IdRange::is_well_formed)
        && ranges.windows(2).all(|pair| pair[0].end < pair[1].start)
}

/// The uid and gid range sets derived from one band layout.
#[derive(Clone, Debug)]
pub struct RangeTable {
    bands: IdBands,
    user: Vec<IdRange>,
    group: Vec<IdRange>,
    /// Platform ids allowed inside secondary users' ranges.
    secondary_user_platform_ids: Vec<u32>,
}

impl RangeTable {
    /// Build and validate both range sets.
    ///
    /// Every band must also fit inside one user's slice, below
    /// `AID_USER_OFFSET`; otherwise ids would alias into the next user.
    pub fn new(bands: IdBands, secondary_user_platform_ids: Vec<u32>) -> ConfigResult<Self> {
        let user = bands.user_ranges();
        let group = bands.group_ranges();

        if !is_ascending_non_overlapping(&user) {
            return Err(ConfigError::RangesNotAscending(Namespace::User));
        }
        if !is_ascending_non_overlapping(&group) {
            return Err(ConfigError::RangesNotAscending(Namespace::Group));
        }
        // The group set holds every band the user set does.
        if let Some(bad) = group.iter().find(|r| r.end >= AID_USER_OFFSET) {
            return Err(ConfigError::RangeBeyondUser(*bad));
        }

        Ok(Self {
            bands,
            user,
            group,
            secondary_user_platform_ids,
        })
    }

    pub fn bands(&self) -> &IdBands {
        &self.bands
    }

    pub fn ranges(&self, ns: Namespace) -> &[IdRange] {
        match ns {
            Namespace::User => &self.user,
            Namespace::Group => &self.group,
        }
    }

    pub fn secondary_user_platform_ids(&self) -> &[u32] {
        &self.secondary_user_platform_ids
    }

    /// Whether a full id is a legal member of the namespace's app space.
    pub fn is_valid_app_id(&self, id: u32, ns: Namespace) -> bool {
        let (_, app_id) = split_user(id);

        // Unmapped in every user; nothing may ever be assigned it.
        if app_id == AID_OVERFLOWUID {
            return false;
        }

        let ranges = self.ranges(ns);

        // Below the app ranges this is a platform id repeated in some user's
        // slice. Only a short list of them exists outside user 0.
        if app_id < ranges[0].start && self.secondary_user_platform_ids.contains(&app_id) {
            return true;
        }

        // Shared gids only exist for the first user.
        if self.bands.shared_gid.contains(app_id) && app_id != id {
            return false;
        }

        ranges.iter().any(|r| r.contains(app_id))
    }

    /// Next valid app id after `current` in the first user's space.
    ///
    /// Anything below the first range yields its start, so callers begin
    /// the walk from 0. Returns `None` once past the last range. Pure in
    /// `current`; resuming from any earlier value is always allowed.
    pub fn next_app_id(&self, current: u32, ns: Namespace) -> Option<u32> {
        let ranges = self.ranges(ns);

        if current < ranges[0].start {
            return Some(ranges[0].start);
        }

        let next = current.checked_add(1)?;

        // In a gap between two ranges: jump to the start of the next one.
        for pair in ranges.windows(2) {
            if next > pair[0].end && next < pair[1].start {
                return Some(pair[1].start);
            }
        }

        if next > ranges[ranges.len() - 1].end {
            return None;
        }

        Some(next)
    }

    /// Every valid app id of the first user, ascending.
    pub fn app_ids(&self, ns: Namespace) -> impl Iterator<Item = u32> + '_ {
        std::iter::successors(Some(self.ranges(ns)[0].start), move |&id| {
            self.next_app_id(id, ns)
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
