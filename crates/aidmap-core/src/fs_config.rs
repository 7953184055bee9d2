//! Path ownership resolver.
//!
//! Two ordered tables, one for directories and one for files. The first
//! rule whose prefix matches wins; the trailing empty-prefix rule answers
//! for everything else, so resolution never fails.

use aidmap_types::{FsMetadata, PathRule};

use crate::error::{ConfigError, ConfigResult};

/// One ordered, first-match-wins rule table.
#[derive(Clone, Debug)]
pub struct RuleTable {
    rules: Vec<PathRule>,
    fallback: FsMetadata,
}

impl RuleTable {
    /// `kind` names the table in errors ("dirs" or "files").
    pub fn new(kind: &'static str, rules: Vec<PathRule>) -> ConfigResult<Self> {
        let fallback = match rules.last() {
            Some(rule) if rule.is_catch_all() => rule.metadata(),
            _ => return Err(ConfigError::MissingCatchAll(kind)),
        };
        Ok(Self { rules, fallback })
    }

    pub fn rules(&self) -> &[PathRule] {
        &self.rules
    }

    pub fn fallback(&self) -> FsMetadata {
        self.fallback
    }

    fn first_match(&self, matches: impl Fn(&PathRule) -> bool) -> Option<&PathRule> {
        self.rules
            .iter()
            .filter(|rule| !rule.is_catch_all())
            .find(|rule| matches(rule))
    }
}

/// Directory and file rule tables together.
#[derive(Clone, Debug)]
pub struct FsConfig {
    dirs: RuleTable,
    files: RuleTable,
}

impl FsConfig {
    pub fn new(dirs: Vec<PathRule>, files: Vec<PathRule>) -> ConfigResult<Self> {
        Ok(Self {
            dirs: RuleTable::new("dirs", dirs)?,
            files: RuleTable::new("files", files)?,
        })
    }

    pub fn dirs(&self) -> &RuleTable {
        &self.dirs
    }

    pub fn files(&self) -> &RuleTable {
        &self.files
    }

    /// Metadata for a relative path (`system/bin/sh`, no leading slash).
    pub fn resolve(&self, path: &str, is_dir: bool) -> FsMetadata {
        let (table, hit) = if is_dir {
            (&self.dirs, self.dirs.first_match(|rule| path.starts_with(rule.prefix.as_str())))
        } else {
            (&self.files, self.files.first_match(|rule| file_rule_matches(rule, path)))
        };

        match hit {
            Some(rule) => {
                tracing::debug!(path, is_dir, prefix = %rule.prefix, "fs rule matched");
                rule.metadata()
            }
            None => {
                tracing::debug!(path, is_dir, "no fs rule matched; using default");
                table.fallback()
            }
        }
    }
}

/// A `*` covers the rest of one path component only: `data/app/*` takes
/// `data/app/foo.apk` but not `data/app/pkg/base.apk`.
fn file_rule_matches(rule: &PathRule, path: &str) -> bool {
    match rule.wildcard_stem() {
        Some(stem) => path
            .strip_prefix(stem)
            .is_some_and(|rest| !rest.contains('/')),
        None => path == rule.prefix,
    }
}

// ============================================================================
// Tests
// ============================================================================
