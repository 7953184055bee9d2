//! Android ID (AID) constants.
//!
//! This is the master numbering for platform users and groups. Values are
//! baked into shipped filesystem images and must never be renumbered.
//!
//! Only the ids the codec, the allow-lists, and the default tables reference
//! by value live here; the full name table is configuration data
//! (`assets/defaults/android_ids.ron`).

/// Traditional unix root user.
pub const AID_ROOT: u32 = 0;
/// System server.
pub const AID_SYSTEM: u32 = 1000;
/// Telephony subsystem, RIL.
pub const AID_RADIO: u32 = 1001;
/// Bluetooth subsystem.
pub const AID_BLUETOOTH: u32 = 1002;
/// Log devices.
pub const AID_LOG: u32 = 1007;
/// NFC subsystem.
pub const AID_NFC: u32 = 1027;
/// Secure element subsystem.
pub const AID_SECURE_ELEMENT: u32 = 1068;
/// Network stack service.
pub const AID_NETWORK_STACK: u32 = 1073;

/// adb and debug shell user.
pub const AID_SHELL: u32 = 2000;

/// Start of the first OEM-reserved band.
pub const AID_OEM_RESERVED_START: u32 = 2900;
/// End of the first OEM-reserved band (inclusive).
pub const AID_OEM_RESERVED_END: u32 = 2999;
/// Start of the second OEM-reserved band.
pub const AID_OEM_RESERVED_2_START: u32 = 5000;
/// End of the second OEM-reserved band (inclusive).
pub const AID_OEM_RESERVED_2_END: u32 = 5999;

/// Shared between all apps in the same profile.
pub const AID_EVERYBODY: u32 = 9997;
/// Access to misc storage.
pub const AID_MISC: u32 = 9998;
/// Nobody.
pub const AID_NOBODY: u32 = 9999;

/// First app user.
pub const AID_APP_START: u32 = 10000;
/// Last app user.
pub const AID_APP_END: u32 = 19999;

/// Start of gids for apps to mark cached data.
pub const AID_CACHE_GID_START: u32 = 20000;
/// End of gids for apps to mark cached data.
pub const AID_CACHE_GID_END: u32 = 29999;

/// Start of gids for apps to mark external data.
pub const AID_EXT_GID_START: u32 = 30000;
/// End of gids for apps to mark external data.
pub const AID_EXT_GID_END: u32 = 39999;

/// Start of gids for apps to mark external cached data.
pub const AID_EXT_CACHE_GID_START: u32 = 40000;
/// End of gids for apps to mark external cached data.
pub const AID_EXT_CACHE_GID_END: u32 = 49999;

/// Start of gids for apps in each user to share.
pub const AID_SHARED_GID_START: u32 = 50000;
/// End of gids for apps in each user to share.
pub const AID_SHARED_GID_END: u32 = 59999;

/// The kernel's "unmapped" uid. Never valid in any user's range.
pub const AID_OVERFLOWUID: u32 = 65534;

/// Start of uids for fully isolated sandboxed processes.
pub const AID_ISOLATED_START: u32 = 90000;
/// End of uids for fully isolated sandboxed processes.
pub const AID_ISOLATED_END: u32 = 99999;

/// Offset between the uid ranges of consecutive device users.
pub const AID_USER_OFFSET: u32 = 100000;

/// Largest user index a name may carry.
pub const MAX_USER_ID: u32 = 1000;

/// Split a full id into `(user_index, app_id)`.
pub const fn split_user(id: u32) -> (u32, u32) {
    (id / AID_USER_OFFSET, id % AID_USER_OFFSET)
}

/// Compose a full id from a user index and an app id.
///
/// Returns `None` when the result does not fit in 32 bits.
pub const fn join_user(user: u32, app_id: u32) -> Option<u32> {
    match user.checked_mul(AID_USER_OFFSET) {
        Some(base) => base.checked_add(app_id),
        None => None,
    }
}
