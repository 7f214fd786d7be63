//! User-facing lines for the `posixfs` binary.
//!
//! Prefixes are colored only when the stream they go to is a TTY, so piped
//! output (`posixfs cat f | ...`) stays byte-exact.

use owo_colors::OwoColorize;
use std::fmt::Display;

fn is_tty(stream: atty::Stream) -> bool {
    atty::is(stream)
}

fn prefixed(stream: atty::Stream, label: &str, paint: fn(&str) -> String) -> String {
    if is_tty(stream) { paint(label) } else { label.to_string() }
}

pub fn print_info(msg: &str) {
    let p = prefixed(atty::Stream::Stdout, "info:", |s| s.cyan().bold().to_string());
    println!("{p} {msg}");
}

pub fn print_warn(msg: &str) {
    let p = prefixed(atty::Stream::Stderr, "warn:", |s| s.yellow().bold().to_string());
    eprintln!("{p} {msg}");
}

/// One `error:` line; pass `format!("{err:#}")` to include an anyhow chain.
pub fn print_error(msg: &str) {
    let p = prefixed(atty::Stream::Stderr, "error:", |s| s.red().bold().to_string());
    eprintln!("{p} {msg}");
}

pub fn print_success(msg: &str) {
    let p = prefixed(atty::Stream::Stdout, "ok:", |s| s.green().bold().to_string());
    println!("{p} {msg}");
}

/// Print a plain line with no prefix. Primary outputs (paths, listings)
/// go through here so scripts can consume them.
pub fn print_user(msg: impl Display) {
    println!("{msg}");
}
