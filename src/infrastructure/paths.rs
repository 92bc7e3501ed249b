//! Path utilities for bankroll.
//!
//! All data lives under `~/.bankroll/`:
//! - `~/.bankroll/config.toml` - main configuration
//! - `~/.bankroll/bankroll.db` - snapshot history database

use std::path::PathBuf;

/// Returns the bankroll home directory (`~/.bankroll/`).
pub fn home_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".bankroll")
}

/// Returns the default config file path (`~/.bankroll/config.toml`).
pub fn default_config() -> PathBuf {
    home_dir().join("config.toml")
}

/// Returns the default database path (`~/.bankroll/bankroll.db`).
pub fn default_database() -> PathBuf {
    home_dir().join("bankroll.db")
}

/// Ensures the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &std::path::Path) -> std::io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_are_under_bankroll_home() {
        assert!(default_config().to_string_lossy().contains(".bankroll"));
        assert!(default_database().to_string_lossy().contains(".bankroll"));
    }

    #[test]
    fn ensure_parent_dir_creates_missing_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("db.sqlite");
        ensure_parent_dir(&path).unwrap();
        assert!(dir.path().join("nested").is_dir());
    }
}
