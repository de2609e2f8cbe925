/*!
 * Single-shot filesystem operations
 *
 * Thin, typed wrappers over the native create/delete/rename vocabulary.
 * Each call maps its failure through the error taxonomy and propagates
 * immediately; there is no local recovery at this layer.
 */

use std::fs;

use crate::error::{map_native, FarPathError, Result};
use crate::path::PathDescriptor;
use crate::types::{DirectoryEntry, Entry, EntryKind, FileEntry, FindData};

/// Whether anything exists at `path`. Probes only; never errors.
pub fn exists(path: &PathDescriptor) -> bool {
    path.fs_path().exists()
}

/// Kind of the entry at `path`.
pub fn entry_kind(path: &PathDescriptor) -> Result<EntryKind> {
    let meta =
        fs::metadata(path.fs_path()).map_err(|e| map_native(&e, path.display_name()))?;
    Ok(if meta.is_dir() {
        EntryKind::Directory
    } else {
        EntryKind::File
    })
}

fn stat(path: &PathDescriptor) -> Result<Entry> {
    let data =
        FindData::from_path(path.fs_path()).map_err(|e| map_native(&e, path.display_name()))?;
    Ok(Entry::project(path.clone(), &data))
}

/// Metadata for the file at `path`; a directory there is
/// [`FarPathError::UnmatchedEntryType`].
pub fn stat_file(path: &PathDescriptor) -> Result<FileEntry> {
    match stat(path)? {
        Entry::File(file) => Ok(file),
        Entry::Directory(_) => Err(FarPathError::UnmatchedEntryType {
            expected: EntryKind::File,
            found: EntryKind::Directory,
            path: path.display_name().to_string(),
        }),
    }
}

/// Metadata for the directory at `path`; a file there is
/// [`FarPathError::UnmatchedEntryType`].
pub fn stat_directory(path: &PathDescriptor) -> Result<DirectoryEntry> {
    match stat(path)? {
        Entry::Directory(dir) => Ok(dir),
        Entry::File(_) => Err(FarPathError::UnmatchedEntryType {
            expected: EntryKind::Directory,
            found: EntryKind::File,
            path: path.display_name().to_string(),
        }),
    }
}

/// Create one directory. An existing entry at `path` is
/// [`FarPathError::PathAlreadyExists`].
pub fn create_directory(path: &PathDescriptor) -> Result<()> {
    fs::create_dir(path.fs_path()).map_err(|e| map_native(&e, path.display_name()))
}

/// Remove one empty directory. A populated one is
/// [`FarPathError::DirectoryNotEmpty`].
pub fn remove_directory(path: &PathDescriptor) -> Result<()> {
    fs::remove_dir(path.fs_path()).map_err(|e| map_native(&e, path.display_name()))
}

/// Remove one file.
pub fn remove_file(path: &PathDescriptor) -> Result<()> {
    fs::remove_file(path.fs_path()).map_err(|e| map_native(&e, path.display_name()))
}

/// Rename or move an entry within a volume.
pub fn rename(from: &PathDescriptor, to: &PathDescriptor) -> Result<()> {
    fs::rename(from.fs_path(), to.fs_path()).map_err(|e| map_native(&e, from.display_name()))
}
