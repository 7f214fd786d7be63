//! CLI definition and parsing.
//! Defines Args and provides parse() for command-line handling.
//!
//! Notes:
//! - --debug is a shorthand for --log-level debug and wins over it.
//! - Global flags may appear before or after the subcommand.

use clap::{Parser, Subcommand, ValueHint};
use std::path::PathBuf;

use crate::config::types::{Config, LogLevel, parse_dir_mode};

/// Command-line front end over the POSIX filesystem layer.
/// CLI flags override config values (which are loaded from XML if present).
#[derive(Parser, Debug, Clone)]
#[command(
    author,
    version,
    about = "Inspect and manipulate files through the POSIX filesystem layer",
    arg_required_else_help = true
)]
pub struct Args {
    /// Enable debug logging (equivalent to `--log-level debug`).
    #[arg(
        short = 'd',
        long,
        global = true,
        help = "Enable debug logging (shorthand for --log-level debug)"
    )]
    pub debug: bool,

    /// Set log level. One of: quiet, normal, info, debug.
    #[arg(long, global = true, help = "Set log level: quiet, normal, info, debug")]
    pub log_level: Option<LogLevel>,

    /// Also write logs to this file (created with mode 0600).
    #[arg(long, global = true, value_hint = ValueHint::FilePath, help = "Also write logs to this file")]
    pub log_file: Option<PathBuf>,

    /// Emit logs in structured JSON.
    #[arg(long, global = true, help = "Emit logs in structured JSON")]
    pub json: bool,

    /// Mode for directories created by mkdir (octal, before umask).
    #[arg(
        long,
        global = true,
        value_name = "OCTAL",
        value_parser = parse_dir_mode,
        help = "Mode for new directories, in octal (default 0777, umask applies)"
    )]
    pub dir_mode: Option<u32>,

    /// Print the config file location (or POSIX_FS_CONFIG if set), then exit.
    #[arg(long, help = "Print the config file location used by posixfs and exit")]
    pub print_config: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print the current working directory.
    Pwd,
    /// Print the directory used for temporary files.
    Tmpdir,
    /// List the entries of a directory.
    Ls {
        /// Descend into subdirectories (parents before children).
        #[arg(short = 'R', long)]
        recursive: bool,
        #[arg(default_value = ".", value_hint = ValueHint::DirPath)]
        dir: PathBuf,
    },
    /// Write a file's bytes to stdout.
    Cat {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },
    /// Write stdin to a file, replacing its contents.
    Write {
        /// Append instead of truncating.
        #[arg(short = 'a', long)]
        append: bool,
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },
    /// Create a directory.
    Mkdir {
        /// Create missing parents; succeed if the directory exists.
        #[arg(short = 'p', long)]
        parents: bool,
        #[arg(value_hint = ValueHint::DirPath)]
        dir: PathBuf,
    },
    /// Rename atomically. Fails across filesystems.
    Mv {
        #[arg(value_hint = ValueHint::AnyPath)]
        source: PathBuf,
        #[arg(value_hint = ValueHint::AnyPath)]
        target: PathBuf,
    },
    /// Copy a file's bytes.
    Cp {
        /// Stage into a temp sibling and rename over the target.
        #[arg(long)]
        atomic: bool,
        #[arg(value_hint = ValueHint::FilePath)]
        source: PathBuf,
        #[arg(value_hint = ValueHint::FilePath)]
        target: PathBuf,
    },
    /// Delete a file or an empty directory.
    Rm {
        /// Delete a directory and everything below it.
        #[arg(short = 'r', long)]
        recursive: bool,
        #[arg(value_hint = ValueHint::AnyPath)]
        path: PathBuf,
    },
    /// Show metadata without following a final symlink.
    Stat {
        #[arg(value_hint = ValueHint::AnyPath)]
        path: PathBuf,
    },
    /// Print the absolute path with symlinks resolved.
    Realpath {
        #[arg(value_hint = ValueHint::AnyPath)]
        path: PathBuf,
    },
    /// Create a link at LINK pointing to TARGET (symbolic links only).
    Ln {
        #[arg(short = 's', long)]
        symbolic: bool,
        target: PathBuf,
        #[arg(value_hint = ValueHint::AnyPath)]
        link: PathBuf,
    },
}

impl Args {
    /// Effective log level derived from flags.
    /// Precedence: --debug > --log-level value > None (use config default).
    pub fn effective_log_level(&self) -> Option<LogLevel> {
        if self.debug {
            return Some(LogLevel::Debug);
        }
        self.log_level
    }

    /// Apply CLI overrides to a loaded Config (in-place). No-ops for unset flags.
    pub fn apply_overrides(&self, cfg: &mut Config) {
        if let Some(level) = self.effective_log_level() {
            cfg.log_level = level;
        }
        if let Some(path) = &self.log_file {
            cfg.log_file = Some(path.clone());
        }
        if self.json {
            cfg.json = true;
        }
        if let Some(mode) = self.dir_mode {
            cfg.dir_mode = mode;
        }
    }
}

pub fn parse() -> Args {
    Args::parse()
}
