//! Centralized path helpers for the config and cache directories.

use std::path::PathBuf;

use crate::core::app;

/// Environment override for the config directory. Honored at runtime so the
/// integration tests can isolate session state, and so users can point the
/// client at a non-standard location.
pub const CONFIG_DIR_ENV: &str = "COMPETENCY_CHAT_CONFIG_DIR";

/// Project directories (config, cache) from the standard platform locations.
pub fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("io", app::VENDOR, app::NAME)
}

/// Config directory (~/.config/competency-chat/), unless overridden via
/// `COMPETENCY_CHAT_CONFIG_DIR`.
pub fn config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV)
        && !dir.is_empty()
    {
        return Some(PathBuf::from(dir));
    }
    project_dirs().map(|d| d.config_dir().to_path_buf())
}

/// Cache directory (~/.cache/competency-chat/), used for the interactive-mode log file.
pub fn cache_dir() -> Option<PathBuf> {
    project_dirs().map(|d| d.cache_dir().to_path_buf())
}
