//! Name ↔ id codec for per-user app identities.
//!
//! ```text
//! all_a1234            -> 0 * OFFSET + SHARED_GID_START    + 1234  (groups)
//! u0_a1234_ext_cache   -> 0 * OFFSET + EXT_CACHE_GID_START + 1234  (groups)
//! u0_a1234_ext         -> 0 * OFFSET + EXT_GID_START       + 1234  (groups)
//! u0_a1234_cache       -> 0 * OFFSET + CACHE_GID_START     + 1234  (groups)
//! u0_a1234             -> 0 * OFFSET + APP_START           + 1234
//! u2_i1000             -> 2 * OFFSET + ISOLATED_START      + 1000
//! u1_system            -> 1 * OFFSET + registry["system"]
//! ```
//!
//! Names are parsed into an [`AppName`] first and resolved second, so the
//! accepted strings are exactly the ones [`AppName`]'s `Display` produces.

use std::fmt;

use aidmap_types::aid::{AID_USER_OFFSET, MAX_USER_ID, join_user, split_user};
use aidmap_types::{IdBands, IdError, IdRange, Namespace};

use crate::registry::Registry;

/// Which app band a `u<N>_a<M>` name points into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AppBand {
    /// Plain app id, no suffix.
    App,
    /// `_cache` (groups only).
    Cache,
    /// `_ext` (groups only).
    Ext,
    /// `_ext_cache` (groups only).
    ExtCache,
}

impl AppBand {
    pub fn suffix(&self) -> &'static str {
        match self {
            AppBand::App => "",
            AppBand::Cache => "_cache",
            AppBand::Ext => "_ext",
            AppBand::ExtCache => "_ext_cache",
        }
    }

    fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "" => Some(AppBand::App),
            "_cache" => Some(AppBand::Cache),
            "_ext" => Some(AppBand::Ext),
            "_ext_cache" => Some(AppBand::ExtCache),
            _ => None,
        }
    }

    fn range(&self, bands: &IdBands) -> IdRange {
        match self {
            AppBand::App => bands.app,
            AppBand::Cache => bands.cache_gid,
            AppBand::Ext => bands.ext_gid,
            AppBand::ExtCache => bands.ext_cache_gid,
        }
    }
}

/// Structured form of an app identity name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AppName<'a> {
    /// `all_a<offset>`: shared gid, first user only.
    Shared { offset: u32 },
    /// `u<user>_a<offset>[suffix]`.
    App { user: u32, offset: u32, band: AppBand },
    /// `u<user>_i<offset>`: isolated process.
    Isolated { user: u32, offset: u32 },
    /// `u<user>_<name>`: platform id repeated in a user's range.
    Platform { user: u32, name: &'a str },
}

impl<'a> AppName<'a> {
    /// Syntactic parse. Registry aliases are not checked here.
    pub fn parse(name: &'a str, ns: Namespace) -> Result<Self, IdError> {
        let fail = || IdError::not_found(name);

        if ns.is_group()
            && let Some(rest) = name.strip_prefix("all_a")
        {
            let offset = parse_decimal(rest).ok_or_else(fail)?;
            return Ok(AppName::Shared { offset });
        }

        let rest = name.strip_prefix('u').ok_or_else(fail)?;
        let (user, rest) = split_decimal(rest).ok_or_else(fail)?;
        let rest = rest.strip_prefix('_').ok_or_else(fail)?;

        if let Some(tail) = rest.strip_prefix('a')
            && starts_with_digit(tail)
        {
            let (offset, suffix) = split_decimal(tail).ok_or_else(fail)?;
            let band = AppBand::from_suffix(suffix).ok_or_else(fail)?;
            if band != AppBand::App && !ns.is_group() {
                return Err(fail());
            }
            return Ok(AppName::App { user, offset, band });
        }

        if let Some(tail) = rest.strip_prefix('i')
            && starts_with_digit(tail)
        {
            let offset = parse_decimal(tail).ok_or_else(fail)?;
            return Ok(AppName::Isolated { user, offset });
        }

        if rest.is_empty() {
            return Err(fail());
        }
        Ok(AppName::Platform { user, name: rest })
    }

    pub fn user(&self) -> u32 {
        match self {
            AppName::Shared { .. } => 0,
            AppName::App { user, .. }
            | AppName::Isolated { user, .. }
            | AppName::Platform { user, .. } => *user,
        }
    }
}

impl fmt::Display for AppName<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppName::Shared { offset } => write!(f, "all_a{offset}"),
            AppName::App { user, offset, band } => {
                write!(f, "u{user}_a{offset}{}", band.suffix())
            }
            AppName::Isolated { user, offset } => write!(f, "u{user}_i{offset}"),
            AppName::Platform { user, name } => write!(f, "u{user}_{name}"),
        }
    }
}

/// Encoder/decoder bound to one registry and band layout.
#[derive(Clone, Copy, Debug)]
pub struct Codec<'r> {
    registry: &'r Registry,
    bands: &'r IdBands,
}

impl<'r> Codec<'r> {
    pub fn new(registry: &'r Registry, bands: &'r IdBands) -> Self {
        Self { registry, bands }
    }

    /// Structured name for a full id.
    pub fn classify(&self, id: u32, ns: Namespace) -> Result<AppName<'r>, IdError> {
        let (user, app_id) = split_user(id);
        let bands = self.bands;

        if let Some(offset) = bands.isolated.offset_of(app_id) {
            return Ok(AppName::Isolated { user, offset });
        }

        if ns.is_group() {
            if user == 0
                && let Some(offset) = bands.shared_gid.offset_of(app_id)
            {
                return Ok(AppName::Shared { offset });
            }
            for band in [AppBand::ExtCache, AppBand::Ext, AppBand::Cache] {
                if let Some(offset) = band.range(bands).offset_of(app_id) {
                    return Ok(AppName::App { user, offset, band });
                }
            }
        }

        if app_id < bands.app.start {
            return self
                .registry
                .by_id(app_id)
                .map(|entry| AppName::Platform {
                    user,
                    name: entry.name.as_str(),
                })
                .ok_or_else(|| IdError::not_found(id));
        }

        Ok(AppName::App {
            user,
            offset: app_id - bands.app.start,
            band: AppBand::App,
        })
    }

    /// Full id for a structured name.
    pub fn resolve(&self, name: &AppName<'_>) -> Result<u32, IdError> {
        let fail = || IdError::not_found(name);
        let bands = self.bands;

        let app_id = match *name {
            AppName::Shared { offset } => bands
                .shared_gid
                .start
                .checked_add(offset)
                .filter(|&id| id <= bands.shared_gid.end)
                .ok_or_else(fail)?,
            AppName::App { offset, band, .. } => {
                band.range(bands).start.checked_add(offset).ok_or_else(fail)?
            }
            AppName::Isolated { offset, .. } => {
                bands.isolated.start.checked_add(offset).ok_or_else(fail)?
            }
            AppName::Platform { name: alias, .. } => {
                self.registry.by_name(alias).ok_or_else(fail)?.id
            }
        };

        let user = name.user();
        if user > MAX_USER_ID || app_id >= AID_USER_OFFSET {
            return Err(fail());
        }
        join_user(user, app_id).ok_or_else(fail)
    }

    /// `fullID -> name`.
    pub fn encode_name(&self, id: u32, ns: Namespace) -> Result<String, IdError> {
        self.classify(id, ns).map(|name| name.to_string())
    }

    /// `name -> fullID`.
    pub fn decode_name(&self, name: &str, ns: Namespace) -> Result<u32, IdError> {
        let parsed = AppName::parse(name, ns)?;
        self.resolve(&parsed)
    }
}

fn starts_with_digit(s: &str) -> bool {
    s.bytes().next().is_some_and(|b| b.is_ascii_digit())
}

/// Split a leading canonical decimal off `s`.
///
/// Canonical means ASCII digits only, no sign, and no leading zero unless
/// the number is `0`.
fn split_decimal(s: &str) -> Option<(u32, &str)> {
    let len = s.bytes().take_while(u8::is_ascii_digit).count();
    if len == 0 {
        return None;
    }
    let (digits, rest) = s.split_at(len);
    if len > 1 && digits.starts_with('0') {
        return None;
    }
    let value = digits.parse().ok()?;
    Some((value, rest))
}

/// `s` must be a canonical decimal in its entirety.
pub(crate) fn parse_decimal(s: &str) -> Option<u32> {
    match split_decimal(s)? {
        (value, "") => Some(value),
        _ => None,
    }
}

// ============================================================================
// Tests
// ============================================================================
