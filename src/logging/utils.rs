//! Path resolution, ANSI stripping, and time formatting for the log file.
use std::fs;
use std::path::PathBuf;

/// Strip ANSI escape sequences from a string.
///
/// Handles SGR sequences (ending in `m`) and other CSI sequences (ending
/// in any letter in the `@`..`~` range). Non-CSI escapes drop the escape
/// and the following character.
pub(super) fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            if let Some(next) = chars.next()
                && next == '['
            {
                for inner in chars.by_ref() {
                    if ('@'..='~').contains(&inner) {
                        break;
                    }
                }
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Resolve the cache directory from `XDG_CACHE_HOME` and `HOME` values.
fn cache_dir_from(xdg_cache_home: Option<String>, home: Option<String>) -> PathBuf {
    xdg_cache_home
        .filter(|dir| !dir.is_empty())
        .map_or_else(
            || {
                home.map_or_else(|| PathBuf::from("."), PathBuf::from)
                    .join(".cache")
            },
            PathBuf::from,
        )
        .join("devkit")
}

/// Return the `$XDG_CACHE_HOME/devkit/` directory, creating it if needed.
pub(super) fn devkit_cache_dir() -> Option<PathBuf> {
    let dir = cache_dir_from(
        std::env::var("XDG_CACHE_HOME").ok(),
        std::env::var("HOME").ok(),
    );
    fs::create_dir_all(&dir).ok()?;
    Some(dir)
}

/// Return the log file path under `$XDG_CACHE_HOME/devkit/` (or `~/.cache/devkit/`).
pub(super) fn log_file_path(command: &str) -> Option<PathBuf> {
    Some(devkit_cache_dir()?.join(format!("{command}.log")))
}

/// Format the current UTC time as `YYYY-MM-DD HH:MM:SS`.
pub(super) fn format_utc_datetime() -> String {
    chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Format the current UTC time as `HH:MM:SS`.
pub(super) fn format_utc_time() -> String {
    chrono::Utc::now().format("%H:%M:%S").to_string()
}
