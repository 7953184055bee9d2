//! Vendor-reserved `oem_<N>` identities.
//!
//! OEM ids live below the app ranges and are not per-user: `oem_2950` is
//! always uid 2950. Devices that first shipped before API level 29 may also
//! use any unassigned platform id below `AID_EVERYBODY`.

use aidmap_types::IdRange;

use crate::codec::parse_decimal;
use crate::error::{ConfigError, ConfigResult};
use crate::registry::Registry;

const OEM_PREFIX: &str = "oem_";

/// First API level whose devices are held to the reserved OEM bands.
pub const STRICT_OEM_API_LEVEL: u32 = 29;

/// Which ids count as OEM ids on this device.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OemPolicy {
    reserved: Vec<IdRange>,
    legacy: IdRange,
    legacy_enabled: bool,
}

impl OemPolicy {
    /// `first_api_level` is the device's launch API level, if known.
    pub fn new(
        reserved: Vec<IdRange>,
        legacy: IdRange,
        first_api_level: Option<u32>,
    ) -> ConfigResult<Self> {
        if let Some(bad) = reserved.iter().chain([&legacy]).find(|r| !r.is_well_formed()) {
            return Err(ConfigError::InvalidOemBand(*bad));
        }

        let legacy_enabled = matches!(first_api_level, Some(v) if v != 0 && v < STRICT_OEM_API_LEVEL);

        Ok(Self {
            reserved,
            legacy,
            legacy_enabled,
        })
    }

    pub fn reserved(&self) -> &[IdRange] {
        &self.reserved
    }

    pub fn legacy_enabled(&self) -> bool {
        self.legacy_enabled
    }

    /// Whether `id` names an OEM identity.
    ///
    /// Legacy devices accept any id in the legacy band that the registry
    /// does not already claim.
    pub fn is_oem_id(&self, id: u32, registry: &Registry) -> bool {
        if self.reserved.iter().any(|r| r.contains(id)) {
            return true;
        }
        self.legacy_enabled && self.legacy.contains(id) && !registry.contains_id(id)
    }

    /// Parse `oem_<N>`. `None` when the name is malformed or `N` is not an
    /// OEM id. `N` is written the way [`oem_name`](Self::oem_name) writes
    /// it: no sign, no leading zeros.
    pub fn oem_id_from_name(&self, name: &str, registry: &Registry) -> Option<u32> {
        let id = parse_decimal(name.strip_prefix(OEM_PREFIX)?)?;
        self.is_oem_id(id, registry).then_some(id)
    }

    /// `oem_<id>` for OEM ids.
    pub fn oem_name(&self, id: u32, registry: &Registry) -> Option<String> {
        self.is_oem_id(id, registry).then(|| format!("{OEM_PREFIX}{id}"))
    }
}

// ============================================================================
// Tests
// ============================================================================
