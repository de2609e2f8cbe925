/*!
 * Core types: native find-data, projected entry metadata and the
 * directory tree aggregate.
 *
 * Metadata values are built in one step from a find-data record obtained
 * during enumeration and never re-query the filesystem afterwards; call
 * sites re-enumerate when they need fresh data.
 */

use std::fs;
use std::io;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Local, Utc};
use serde::Serialize;

use crate::path::PathDescriptor;

/// Read-only attribute bit.
pub const ATTR_READONLY: u32 = 0x0001;
/// Hidden attribute bit.
pub const ATTR_HIDDEN: u32 = 0x0002;
/// Directory attribute bit; drives file-vs-directory classification.
pub const ATTR_DIRECTORY: u32 = 0x0010;
/// Set when no other attribute applies.
pub const ATTR_NORMAL: u32 = 0x0080;

pub fn is_directory(attributes: u32) -> bool {
    attributes & ATTR_DIRECTORY != 0
}

pub fn is_readonly(attributes: u32) -> bool {
    attributes & ATTR_READONLY != 0
}

pub fn is_hidden(attributes: u32) -> bool {
    attributes & ATTR_HIDDEN != 0
}

/// File or directory, as classified from the attribute bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
}

/// The fixed-shape record one native directory-scan step returns:
/// name, attribute bitmask, three timestamps and the byte size.
#[derive(Debug, Clone)]
pub struct FindData {
    pub name: String,
    pub attributes: u32,
    pub created: SystemTime,
    pub accessed: SystemTime,
    pub written: SystemTime,
    pub size: u64,
}

impl FindData {
    /// Capture one record from an open directory scan.
    pub fn from_dir_entry(entry: &fs::DirEntry) -> io::Result<FindData> {
        let name = entry.file_name().to_string_lossy().into_owned();
        let meta = entry.metadata()?;
        Ok(Self::from_metadata(name, &meta))
    }

    /// Capture a record for a path outside any scan (e.g. a scan root).
    pub fn from_path(path: &Path) -> io::Result<FindData> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let meta = fs::metadata(path)?;
        Ok(Self::from_metadata(name, &meta))
    }

    fn from_metadata(name: String, meta: &fs::Metadata) -> FindData {
        FindData {
            attributes: attributes_of(&name, meta),
            created: meta.created().or_else(|_| meta.modified()).unwrap_or(UNIX_EPOCH),
            accessed: meta.accessed().unwrap_or(UNIX_EPOCH),
            written: meta.modified().unwrap_or(UNIX_EPOCH),
            size: if meta.is_dir() { 0 } else { meta.len() },
            name,
        }
    }

    pub fn is_directory(&self) -> bool {
        is_directory(self.attributes)
    }
}

#[cfg(windows)]
fn attributes_of(_name: &str, meta: &fs::Metadata) -> u32 {
    use std::os::windows::fs::MetadataExt;
    meta.file_attributes()
}

#[cfg(not(windows))]
fn attributes_of(name: &str, meta: &fs::Metadata) -> u32 {
    let mut attrs = 0;
    if meta.is_dir() {
        attrs |= ATTR_DIRECTORY;
    }
    if meta.permissions().readonly() {
        attrs |= ATTR_READONLY;
    }
    if name.starts_with('.') {
        attrs |= ATTR_HIDDEN;
    }
    if attrs == 0 {
        attrs = ATTR_NORMAL;
    }
    attrs
}

/// Metadata shared by files and directories: the attribute bitmask and the
/// three timestamps, stored UTC with local-time accessors.
#[derive(Debug, Clone, Serialize)]
pub struct EntryMeta {
    pub attributes: u32,
    pub created: DateTime<Utc>,
    pub accessed: DateTime<Utc>,
    pub written: DateTime<Utc>,
}

impl EntryMeta {
    fn project(data: &FindData) -> EntryMeta {
        EntryMeta {
            attributes: data.attributes,
            created: DateTime::from(data.created),
            accessed: DateTime::from(data.accessed),
            written: DateTime::from(data.written),
        }
    }

    pub fn created_local(&self) -> DateTime<Local> {
        self.created.with_timezone(&Local)
    }

    pub fn accessed_local(&self) -> DateTime<Local> {
        self.accessed.with_timezone(&Local)
    }

    pub fn written_local(&self) -> DateTime<Local> {
        self.written.with_timezone(&Local)
    }
}

/// An enumerated file.
#[derive(Debug, Clone, Serialize)]
pub struct FileEntry {
    pub path: PathDescriptor,
    pub meta: EntryMeta,
    /// Byte length at the time the record was captured
    pub len: u64,
}

/// An enumerated directory.
#[derive(Debug, Clone, Serialize)]
pub struct DirectoryEntry {
    pub path: PathDescriptor,
    pub meta: EntryMeta,
}

/// A typed view over one projected find-data record.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Entry {
    File(FileEntry),
    Directory(DirectoryEntry),
}

impl Entry {
    /// Project a native record into its typed view. Classification is the
    /// directory attribute bit; no native call is made here.
    pub fn project(path: PathDescriptor, data: &FindData) -> Entry {
        let meta = EntryMeta::project(data);
        if data.is_directory() {
            Entry::Directory(DirectoryEntry { path, meta })
        } else {
            Entry::File(FileEntry {
                path,
                meta,
                len: data.size,
            })
        }
    }

    pub fn kind(&self) -> EntryKind {
        match self {
            Entry::File(_) => EntryKind::File,
            Entry::Directory(_) => EntryKind::Directory,
        }
    }

    pub fn path(&self) -> &PathDescriptor {
        match self {
            Entry::File(f) => &f.path,
            Entry::Directory(d) => &d.path,
        }
    }

    pub fn meta(&self) -> &EntryMeta {
        match self {
            Entry::File(f) => &f.meta,
            Entry::Directory(d) => &d.meta,
        }
    }

    pub fn into_path(self) -> PathDescriptor {
        match self {
            Entry::File(f) => f.path,
            Entry::Directory(d) => d.path,
        }
    }
}

/// Aggregated counters for one subtree walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanStats {
    pub dirs: u64,
    pub files: u64,
    pub bytes: u64,
}

impl ScanStats {
    pub fn absorb(&mut self, other: ScanStats) {
        self.dirs += other.dirs;
        self.files += other.files;
        self.bytes += other.bytes;
    }
}

/// Whole-subtree snapshot: one directory plus its files and child trees,
/// in native enumeration order.
#[derive(Debug, Clone, Serialize)]
pub struct DirectoryTree {
    pub directory: DirectoryEntry,
    pub files: Vec<FileEntry>,
    pub directories: Vec<DirectoryTree>,
}

impl DirectoryTree {
    /// Depth-first fold over the snapshot with per-level accumulation.
    /// Does not re-walk the filesystem.
    pub fn statistics(&self) -> ScanStats {
        let mut stats = ScanStats {
            dirs: self.directories.len() as u64,
            files: self.files.len() as u64,
            bytes: self.files.iter().map(|f| f.len).sum(),
        };
        for child in &self.directories {
            stats.absorb(child.statistics());
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::parse;

    fn find_data(name: &str, attributes: u32, size: u64) -> FindData {
        FindData {
            name: name.to_string(),
            attributes,
            created: SystemTime::UNIX_EPOCH,
            accessed: SystemTime::UNIX_EPOCH,
            written: SystemTime::UNIX_EPOCH,
            size,
        }
    }

    #[test]
    fn attribute_helpers() {
        assert!(is_directory(ATTR_DIRECTORY | ATTR_HIDDEN));
        assert!(!is_directory(ATTR_NORMAL));
        assert!(is_readonly(ATTR_READONLY));
        assert!(is_hidden(ATTR_HIDDEN));
    }

    #[test]
    fn projection_classifies_by_directory_bit() {
        let dir = parse(r"C:\data").unwrap();
        let file = Entry::project(
            dir.join("a.txt").unwrap(),
            &find_data("a.txt", ATTR_NORMAL, 42),
        );
        assert_eq!(file.kind(), EntryKind::File);
        match file {
            Entry::File(f) => assert_eq!(f.len, 42),
            _ => unreachable!(),
        }

        let sub = Entry::project(
            dir.join("sub").unwrap(),
            &find_data("sub", ATTR_DIRECTORY, 0),
        );
        assert_eq!(sub.kind(), EntryKind::Directory);
    }

    #[test]
    fn tree_statistics_fold() {
        let root = parse(r"C:\data").unwrap();
        let meta = EntryMeta {
            attributes: ATTR_DIRECTORY,
            created: Utc::now(),
            accessed: Utc::now(),
            written: Utc::now(),
        };
        let file = |name: &str, len| FileEntry {
            path: root.join(name).unwrap(),
            meta: EntryMeta {
                attributes: ATTR_NORMAL,
                ..meta.clone()
            },
            len,
        };
        let leaf = DirectoryTree {
            directory: DirectoryEntry {
                path: root.join("sub").unwrap(),
                meta: meta.clone(),
            },
            files: vec![file("x", 5)],
            directories: vec![],
        };
        let tree = DirectoryTree {
            directory: DirectoryEntry {
                path: root.clone(),
                meta: meta.clone(),
            },
            files: vec![file("a", 10), file("b", 20)],
            directories: vec![leaf],
        };

        let stats = tree.statistics();
        assert_eq!(
            stats,
            ScanStats {
                dirs: 1,
                files: 3,
                bytes: 35
            }
        );
    }
}
