//! Symlink replacement for alias paths.

use std::fs;
use std::io;
use std::os::unix::fs::symlink;
use std::path::Path;

use crate::application::publish_aliases::DiscoveryError;

/// Makes `alias` a symlink to `target`, replacing any file or link already
/// there (dangling links included).  Missing parent directories are created.
///
/// # Errors
///
/// [`DiscoveryError::Io`] if `alias` is a directory or any filesystem
/// operation fails.
pub fn replace_alias(target: &Path, alias: &Path) -> Result<(), DiscoveryError> {
    let io_error = |source: io::Error| DiscoveryError::Io {
        path: alias.to_path_buf(),
        source,
    };

    if let Some(parent) = alias.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_error)?;
    }

    match fs::symlink_metadata(alias) {
        Ok(meta) if meta.is_dir() => {
            return Err(io_error(io::Error::new(
                io::ErrorKind::AlreadyExists,
                "alias path is a directory",
            )));
        }
        Ok(_) => fs::remove_file(alias).map_err(io_error)?,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(io_error(e)),
    }

    symlink(target, alias).map_err(io_error)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
