//! Application orchestrator.
//! Loads/merges config, initializes logging, then runs one subcommand against
//! the configured backend.

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Local};
use std::io::{self, Write};
use std::path::Path;
use std::time::SystemTime;
use tracing::{debug, error, info};

use posix_fs::cli::{Args, Command};
use posix_fs::output as out;
use posix_fs::{FileSink, FileSystem, Metadata, config_path, load_config};

use crate::logging::init_tracing;

/// Run the CLI application.
pub fn run(args: Args) -> Result<()> {
    // Handle --print-config before logging init
    if args.print_config {
        print_config_location();
        return Ok(());
    }

    let (mut cfg, cfg_source) = load_config()?;
    args.apply_overrides(&mut cfg);

    // Held until return so the file appender flushes.
    let _guard = init_tracing(cfg.log_level, cfg.log_file.as_deref(), cfg.json)?;
    debug!(?args, config = ?cfg_source, "starting posixfs");

    let Some(command) = args.command else {
        bail!("no command given; run with --help to see the available commands");
    };
    let fs = cfg.file_system();
    execute(&fs, command).inspect_err(|e| error!(error = %format!("{e:#}"), "command failed"))
}

fn print_config_location() {
    if let Some(p) = std::env::var_os(posix_fs::config::CONFIG_ENV).filter(|p| !p.is_empty()) {
        out::print_info(&format!("Using POSIX_FS_CONFIG (explicit):\n  {}", Path::new(&p).display()));
        return;
    }
    match config_path() {
        Some(p) => {
            out::print_info(&format!("Default posixfs config path:\n  {}", p.display()));
            if p.exists() {
                out::print_info("A config file exists at that location.");
            } else {
                out::print_info("No config file there; built-in defaults are used.");
            }
        }
        None => out::print_warn("Could not determine a default config path."),
    }
}

/// Run one subcommand against `fs`, writing primary output to stdout.
pub fn execute<F: FileSystem>(fs: &F, command: Command) -> Result<()> {
    match command {
        Command::Pwd => out::print_user(fs.base_directory()?.display()),
        Command::Tmpdir => out::print_user(fs.temporary_directory().display()),
        Command::Ls { recursive, dir } => {
            let entries = if recursive { fs.list_recursively(&dir)? } else { fs.list(&dir)? };
            for entry in entries {
                out::print_user(entry.display());
            }
        }
        Command::Cat { file } => {
            let mut source = fs.source(&file)?;
            let stdout = io::stdout();
            let mut lock = stdout.lock();
            io::copy(&mut source, &mut lock)
                .with_context(|| format!("cat '{}'", file.display()))?;
            lock.flush().context("flush stdout")?;
        }
        Command::Write { append, file } => {
            let mut sink = if append { fs.appending_sink(&file)? } else { fs.sink(&file)? };
            let n = io::copy(&mut io::stdin().lock(), &mut sink)
                .with_context(|| format!("write '{}'", file.display()))?;
            sink.close()?;
            info!(path = %file.display(), bytes = n, append, "wrote file");
        }
        Command::Mkdir { parents, dir } => {
            if parents {
                fs.create_directories(&dir)?;
            } else {
                fs.create_directory(&dir)?;
            }
            info!(path = %dir.display(), "directory ready");
        }
        Command::Mv { source, target } => {
            fs.atomic_move(&source, &target)?;
            info!(src = %source.display(), dest = %target.display(), "moved");
        }
        Command::Cp { atomic, source, target } => {
            let bytes = if atomic {
                fs.copy_atomically(&source, &target)?
            } else {
                fs.copy(&source, &target)?
            };
            info!(src = %source.display(), dest = %target.display(), bytes, atomic, "copied");
        }
        Command::Rm { recursive, path } => {
            if recursive {
                fs.delete_recursively(&path)?;
            } else {
                fs.delete(&path)?;
            }
            info!(path = %path.display(), "deleted");
        }
        Command::Stat { path } => match fs.metadata_or_none(&path)? {
            Some(meta) => print_metadata(&path, &meta),
            None => bail!("stat '{}': no such file or directory", path.display()),
        },
        Command::Realpath { path } => out::print_user(fs.canonicalize(&path)?.display()),
        Command::Ln { symbolic, target, link } => {
            if !symbolic {
                bail!("only symbolic links are supported; pass -s");
            }
            fs.create_symlink(&link, &target)?;
            info!(link = %link.display(), target = %target.display(), "linked");
        }
    }
    Ok(())
}

fn kind_of(meta: &Metadata) -> &'static str {
    if meta.is_symlink() {
        "symlink"
    } else if meta.is_directory {
        "directory"
    } else if meta.is_regular_file {
        "file"
    } else {
        "other"
    }
}

fn fmt_time(t: Option<SystemTime>) -> String {
    t.map(|t| DateTime::<Local>::from(t).format("%Y-%m-%d %H:%M:%S%.9f %z").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn print_metadata(path: &Path, meta: &Metadata) {
    out::print_user(format_args!("path: {}", path.display()));
    out::print_user(format_args!("type: {}", kind_of(meta)));
    if let Some(target) = &meta.symlink_target {
        out::print_user(format_args!("target: {}", target.display()));
    }
    match meta.size {
        Some(size) => out::print_user(format_args!("size: {size}")),
        None => out::print_user("size: -"),
    }
    out::print_user(format_args!("created: {}", fmt_time(meta.created_at)));
    out::print_user(format_args!("modified: {}", fmt_time(meta.last_modified_at)));
    out::print_user(format_args!("accessed: {}", fmt_time(meta.last_accessed_at)));
}
