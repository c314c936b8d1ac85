//! File I/O operations
//!
//! Load and save plain-text documents, and check the targets picked in file
//! choosers before the model touches them

use crate::document::Document;
use crate::error::{PetError, Result};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Load document from file
pub fn load(path: &Path) -> Result<Document> {
    let content = fs::read_to_string(path).map_err(|e| PetError::io(path, e))?;
    log::info!("Loaded {} ({} bytes)", path.display(), content.len());
    Ok(Document::from_text(&content))
}

/// Save document to file through a sibling temporary file
///
/// The target is only replaced once the whole text has been written, so a
/// failed save leaves the previous contents intact. Symlinks are followed so
/// the link survives and the file it points at is updated, and the existing
/// file's permissions are carried over to the replacement.
pub fn save(doc: &Document, path: &Path) -> Result<()> {
    let target = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    let permissions = fs::metadata(&target).ok().map(|meta| meta.permissions());
    let tmp_path = temp_path(&target);
    let written = fs::File::create(&tmp_path)
        .and_then(|mut file| {
            file.write_all(doc.to_disk_text().as_bytes())?;
            if let Some(permissions) = permissions {
                file.set_permissions(permissions)?;
            }
            file.sync_all()
        })
        .and_then(|()| fs::rename(&tmp_path, &target));

    if let Err(e) = written {
        let _ = fs::remove_file(&tmp_path);
        return Err(PetError::io(path, e));
    }

    log::info!("Saved {} ({} bytes)", path.display(), doc.len());
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".pet-tmp");
    path.with_file_name(name)
}

/// A path chosen for loading must name an existing regular file
pub fn check_load_target(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(PetError::NotFound(path.to_path_buf()));
    }
    if !path.is_file() {
        return Err(PetError::NotAFile(path.to_path_buf()));
    }
    Ok(())
}

/// How a save target came to exist
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveTarget {
    Existing,
    /// Created empty by [`prepare_save_target`]
    Reserved,
}

/// A path chosen for saving must be a regular file or not exist yet; in the
/// latter case an empty file is created so the choice is reserved
pub fn prepare_save_target(path: &Path) -> Result<SaveTarget> {
    if path.exists() {
        if !path.is_file() {
            return Err(PetError::NotAFile(path.to_path_buf()));
        }
        return Ok(SaveTarget::Existing);
    }

    match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(_) => Ok(SaveTarget::Reserved),
        // Created by someone else in the meantime, which is fine as long as
        // it is a file
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists && path.is_file() => {
            Ok(SaveTarget::Existing)
        }
        Err(e) => Err(PetError::io(path, e)),
    }
}

/// Undo a reservation whose save failed. Only an empty file is removed.
pub fn release_save_target(path: &Path) {
    let empty = fs::metadata(path).is_ok_and(|meta| meta.is_file() && meta.len() == 0);
    if !empty {
        return;
    }
    match fs::remove_file(path) {
        Ok(()) => log::info!("Removed unused save target {}", path.display()),
        Err(e) => log::warn!("Could not remove {}: {}", path.display(), e),
    }
}

/// Absolute form of a path for display, falling back to the path itself
pub fn display_path(path: &Path) -> String {
    std::path::absolute(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .display()
        .to_string()
}
