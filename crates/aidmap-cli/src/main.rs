//! aidmap: Android id and filesystem ownership lookups.
//!
//! ```bash
//! aidmap pwuid 1010005                 # {"name": "u10_a5", ...}
//! aidmap login 2000                    # {"name": "shell", "id": 2000}
//! aidmap grnam all_a50
//! aidmap name 90003 --group            # u0_i3
//! aidmap id u2_a7_cache --group
//! aidmap fs-config data/local/tmp --dir
//! aidmap app-ids --group --limit 5
//! aidmap --config board.ron --first-api-level 28 pwnam oem_4000
//! ```
//!
//! Results go to stdout as JSON. Lookup failures exit with status 1.
//! Logging goes to stderr; `-v` raises the level, `RUST_LOG` overrides it.

use std::path::PathBuf;
use std::process::ExitCode;

use aidmap_core::{AidConfig, FsMetadata, IdentityDb, Namespace};
use aidmap_types::{IdError, IdentityEntry};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser, Debug)]
#[command(name = "aidmap")]
#[command(about = "Android uid/gid namespace and fs_config lookups")]
struct Cli {
    /// RON file overriding the built-in identity and path tables
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Device launch API level (enables legacy OEM ids below 29)
    #[arg(long, global = true)]
    first_api_level: Option<u32>,

    /// More logging (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// passwd record for a uid
    Pwuid { uid: u32 },
    /// Login name of a uid
    Login { uid: u32 },
    /// passwd record for a login name
    Pwnam { name: String },
    /// group record for a gid
    Grgid { gid: u32 },
    /// group record for a group name
    Grnam { name: String },
    /// Encode an id as its per-user name
    Name {
        id: u32,
        #[arg(long)]
        group: bool,
    },
    /// Decode a per-user name to its id
    Id {
        name: String,
        #[arg(long)]
        group: bool,
    },
    /// Ownership and mode for a path in an image
    FsConfig {
        path: String,
        #[arg(long)]
        dir: bool,
    },
    /// List the first user's valid app ids
    AppIds {
        #[arg(long)]
        group: bool,
        #[arg(long)]
        limit: Option<usize>,
    },
}

#[derive(Serialize)]
struct PathReport<'a> {
    path: &'a str,
    is_dir: bool,
    #[serde(flatten)]
    metadata: FsMetadata,
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn load_config(cli: &Cli) -> Result<AidConfig> {
    let config = match &cli.config {
        Some(path) => AidConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => AidConfig::builtin()?,
    };
    Ok(match cli.first_api_level {
        Some(level) => config.with_first_api_level(Some(level)),
        None => config,
    })
}

fn print_json(value: &impl Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run(cli: &Cli, db: &IdentityDb) -> Result<()> {
    match &cli.command {
        Command::Pwuid { uid } => print_json(&db.getpwuid(*uid)?),
        Command::Login { uid } => {
            let name = db.login_name(*uid).ok_or_else(|| IdError::not_found(uid))?;
            print_json(&IdentityEntry::new(name, *uid))
        }
        Command::Pwnam { name } => print_json(&db.getpwnam(name)?),
        Command::Grgid { gid } => print_json(&db.getgrgid(*gid)?),
        Command::Grnam { name } => print_json(&db.getgrnam(name)?),
        Command::Name { id, group } => {
            let name = db.encode_name(*id, Namespace::from_is_group(*group))?;
            print_json(&IdentityEntry::new(name, *id))
        }
        Command::Id { name, group } => {
            let id = db.decode_name(name, Namespace::from_is_group(*group))?;
            print_json(&IdentityEntry::new(name.as_str(), id))
        }
        Command::FsConfig { path, dir } => print_json(&PathReport {
            path,
            is_dir: *dir,
            metadata: db.fs_config(path, *dir),
        }),
        Command::AppIds { group, limit } => {
            let ids = db.app_ids(Namespace::from_is_group(*group));
            let ids: Vec<u32> = match limit {
                Some(n) => ids.take(*n).collect(),
                None => ids.collect(),
            };
            print_json(&ids)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let owned;
    let db = if cli.config.is_none() && cli.first_api_level.is_none() {
        IdentityDb::builtin()
    } else {
        match load_config(&cli).and_then(|c| IdentityDb::from_config(c).map_err(Into::into)) {
            Ok(db) => {
                owned = db;
                &owned
            }
            Err(e) => {
                eprintln!("aidmap: {e:#}");
                return ExitCode::from(2);
            }
        }
    };

    match run(&cli, db) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(command = ?cli.command, "lookup failed");
            eprintln!("aidmap: {e:#}");
            ExitCode::from(1)
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["aidmap", "name", "10005", "--group", "-vv", "--first-api-level", "28"])
            .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.first_api_level, Some(28));
        assert!(matches!(cli.command, Command::Name { id: 10005, group: true }));
    }

    #[test]
    fn test_parse_fs_config() {
        let cli = Cli::try_parse_from(["aidmap", "fs-config", "data/local/tmp", "--dir"]).unwrap();
        assert!(matches!(cli.command, Command::FsConfig { ref path, dir: true } if path == "data/local/tmp"));
    }

    #[test]
    fn test_rejects_negative_id() {
        assert!(Cli::try_parse_from(["aidmap", "pwuid", "-1"]).is_err());
    }

    #[test]
    fn test_run_against_builtin() {
        let cli = Cli::try_parse_from(["aidmap", "id", "u0_a1234"]).unwrap();
        assert!(run(&cli, IdentityDb::builtin()).is_ok());
        let cli = Cli::try_parse_from(["aidmap", "grnam", "u0_nosuch"]).unwrap();
        assert!(run(&cli, IdentityDb::builtin()).is_err());
    }

    #[test]
    fn test_run_login() {
        let cli = Cli::try_parse_from(["aidmap", "login", "2000"]).unwrap();
        assert!(matches!(cli.command, Command::Login { uid: 2000 }));
        assert!(run(&cli, IdentityDb::builtin()).is_ok());
        let cli = Cli::try_parse_from(["aidmap", "login", "4444"]).unwrap();
        assert!(run(&cli, IdentityDb::builtin()).is_err());
    }

    #[test]
    fn test_load_config_applies_api_level() {
        let cli = Cli::try_parse_from(["aidmap", "--first-api-level", "27", "pwuid", "4000"]).unwrap();
        let db = IdentityDb::from_config(load_config(&cli).unwrap()).unwrap();
        assert_eq!(db.getpwuid(4000).unwrap().name, "oem_4000");
    }

    #[test]
    fn test_path_report_is_flat() {
        let report = PathReport {
            path: "vendor",
            is_dir: true,
            metadata: FsMetadata { uid: 0, gid: 2000, mode: 0o755, capabilities: 0 },
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["gid"], 2000);
        assert_eq!(json["path"], "vendor");
    }
}
