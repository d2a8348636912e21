//! Session storage: load and persist the opaque user id in the config directory.
//!
//! The token is stored in a dedicated file with restrictive permissions (0o600 on Unix).
//! Lifecycle: created by `login`, read when the chat starts, removed by `logout`.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

use crate::core::paths;

/// Errors when loading or storing the session token.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("No config directory available")]
    NoConfigDir,
    #[error("Session id cannot be empty")]
    EmptyId,
    #[error("Failed to store session: {0}")]
    Io(#[from] io::Error),
}

/// Path to the session file in the config directory.
pub fn session_path() -> Option<PathBuf> {
    paths::config_dir().map(|d| d.join("session"))
}

/// Load the stored session token.
/// Returns `None` if the file is absent, empty, or unreadable.
pub fn load_session() -> Option<String> {
    let path = session_path()?;
    let content = fs::read_to_string(&path).ok()?;
    let token = content.trim().to_string();
    if token.is_empty() { None } else { Some(token) }
}

/// Store the session token in the config directory.
/// Creates the config dir if needed. On Unix, sets file permissions to 0o600.
pub fn store_session(id: &str) -> Result<(), SessionError> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        return Err(SessionError::EmptyId);
    }
    let path = session_path().ok_or(SessionError::NoConfigDir)?;
    let dir = path.parent().ok_or_else(|| {
        SessionError::Io(io::Error::new(
            io::ErrorKind::InvalidInput,
            "Invalid session path",
        ))
    })?;
    fs::create_dir_all(dir)?;

    let mut file = fs::File::create(&path)?;
    file.write_all(trimmed.as_bytes())?;
    file.write_all(b"\n")?;

    #[cfg(unix)]
    {
        let mut perms = file.metadata()?.permissions();
        perms.set_mode(0o600);
        fs::set_permissions(&path, perms)?;
    }

    Ok(())
}

/// Remove the stored session token. Absent file is not an error.
pub fn clear_session() -> Result<(), SessionError> {
    let path = session_path().ok_or(SessionError::NoConfigDir)?;
    match fs::remove_file(&path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(SessionError::Io(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::core::paths;

    // Session tests share the config-dir override; run them as one test so
    // the parallel runner cannot interleave the env var.
    #[test]
    fn store_load_clear_round_trip() {
        let tmp = tempfile::TempDir::new().expect("temp dir");
        unsafe {
            std::env::set_var(paths::CONFIG_DIR_ENV, tmp.path());
        }

        assert!(load_session().is_none());

        store_session("  tm-1234  ").expect("store");
        assert_eq!(load_session().as_deref(), Some("tm-1234"));

        // Overwrite with a new id
        store_session("tm-5678").expect("store again");
        assert_eq!(load_session().as_deref(), Some("tm-5678"));

        clear_session().expect("clear");
        assert!(load_session().is_none());
        // Clearing twice is fine
        clear_session().expect("clear absent");

        assert!(matches!(store_session("   "), Err(SessionError::EmptyId)));

        unsafe {
            std::env::remove_var(paths::CONFIG_DIR_ENV);
        }
    }
}
