//! User vs. group namespace selector.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::EnumString;

/// Which id namespace an operation works in.
///
/// The group namespace carries extra bands (cache, external storage, shared
/// gids) that do not exist for uids.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum Namespace {
    #[default]
    #[strum(serialize = "user", serialize = "uid", serialize = "passwd")]
    User,
    #[strum(serialize = "group", serialize = "gid")]
    Group,
}

impl Namespace {
    /// Parse from string (case-insensitive).
    ///
    /// Supports aliases: "uid"/"passwd" -> User, "gid" -> Group.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        <Self as FromStr>::from_str(s).ok()
    }

    pub fn from_is_group(is_group: bool) -> Self {
        if is_group { Namespace::Group } else { Namespace::User }
    }

    pub fn is_group(&self) -> bool {
        matches!(self, Namespace::Group)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Namespace::User => "user",
            Namespace::Group => "group",
        }
    }
}

impl std::fmt::Display for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
