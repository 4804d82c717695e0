//! Environment loading helpers.
//!
//! Keeps the primary-then-alias fallback chain in one place so callers never
//! repeat `or_else` ladders.

use std::env;
use std::path::Path;

/// Load `.env` from the current directory (existing variables win). Runs once.
pub fn load_dotenv() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let dir = env::current_dir().unwrap_or_default();
        load_dotenv_from_path(&dir.join(".env"));
    });
}

/// Load a specific dotenv file. Missing files are ignored.
pub fn load_dotenv_from_path(path: &Path) {
    let Ok(content) = std::fs::read_to_string(path) else {
        return;
    };
    let mut applied = 0usize;
    for (key, value) in content.lines().filter_map(parse_dotenv_line) {
        if env::var_os(key).is_some() {
            continue;
        }
        #[allow(unsafe_code)]
        unsafe {
            env::set_var(key, value);
        }
        applied += 1;
    }
    tracing::debug!(path = %path.display(), applied, "Loaded dotenv file");
}

/// Parse one `KEY=value` line. Comments, blanks and malformed lines yield `None`.
fn parse_dotenv_line(line: &str) -> Option<(&str, &str)> {
    let line = line.trim();
    if line.starts_with('#') {
        return None;
    }
    let (key, raw) = line.split_once('=')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    let raw = raw.trim();
    let value = match raw.chars().next() {
        Some(q @ ('"' | '\'')) => raw[1..].split_once(q).map_or(raw, |(inner, _)| inner),
        _ => raw.split_once(" #").map_or(raw, |(v, _)| v).trim_end(),
    };
    Some((key, value))
}

/// Primary variable first, then aliases in order.
fn lookup(primary: &str, aliases: &[&str]) -> Option<String> {
    std::iter::once(primary)
        .chain(aliases.iter().copied())
        .find_map(|k| env::var(k).ok())
}

/// Read the primary variable or the first set alias, falling back to `default`.
pub fn env_or<F>(primary: &str, aliases: &[&str], default: F) -> String
where
    F: FnOnce() -> String,
{
    lookup(primary, aliases)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(default)
}

/// Read the primary variable or an alias. Blank values count as unset.
pub fn env_optional(primary: &str, aliases: &[&str]) -> Option<String> {
    lookup(primary, aliases)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Boolean variable: 0/false/no/off are false, anything else set is true.
pub fn env_bool(primary: &str, aliases: &[&str], default: bool) -> bool {
    lookup(primary, aliases).map_or(default, |s| {
        !matches!(s.trim().to_ascii_lowercase().as_str(), "0" | "false" | "no" | "off")
    })
}
