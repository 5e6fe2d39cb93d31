//! Path resolution for conveyor data files.
//!
//! Follows the XDG base directory layout.

use std::env;
use std::path::PathBuf;

const APP_DIR: &str = "conveyor";
const DB_FILE: &str = "conveyor.db";

/// Get XDG-compliant data directory for conveyor.
///
/// `$XDG_DATA_HOME/conveyor`, falling back to `~/.local/share/conveyor`
/// and finally to `./conveyor` when neither variable is set.
pub fn get_data_dir() -> PathBuf {
    let data_home = env::var("XDG_DATA_HOME")
        .ok()
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(|| {
            env::var("HOME")
                .ok()
                .map(|home| PathBuf::from(home).join(".local/share"))
        })
        .unwrap_or_else(|| PathBuf::from("."));

    data_home.join(APP_DIR)
}

/// Get database file path (data_dir/conveyor.db).
pub fn get_db_path() -> PathBuf {
    get_data_dir().join(DB_FILE)
}
