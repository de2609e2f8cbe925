/*!
 * Recursive enumeration engine
 *
 * Walks a directory subtree with one native scan handle per directory
 * scope. Sequences are lazy and restartable: every call opens a fresh
 * scan, entries come back in native enumeration order, and recursion is
 * pre-order (a directory is yielded before its descendants). Handles are
 * owned by the iterator stack, so abandoning a sequence early releases
 * them deterministically.
 */

use std::fs::{self, ReadDir};

use glob_match::glob_match;
use tracing::{debug, warn};

use crate::error::{map_native, FarPathError, Result};
use crate::path::{PathDescriptor, PathForm};
use crate::types::{DirectoryEntry, DirectoryTree, Entry, EntryKind, FileEntry, FindData, ScanStats};

/// How deep a scan descends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum SearchDepth {
    /// Only the immediate children of the scan root
    #[default]
    ThisLevelOnly,
    /// The whole subtree
    AllLevels,
}

/// Which entry kinds a scan yields. Recursion is unaffected: a files-only
/// scan still descends through directories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum EntryFilter {
    Files,
    Directories,
    #[default]
    Both,
}

impl EntryFilter {
    fn includes(self, kind: EntryKind) -> bool {
        match self {
            EntryFilter::Files => kind == EntryKind::File,
            EntryFilter::Directories => kind == EntryKind::Directory,
            EntryFilter::Both => true,
        }
    }
}

/// What happens when a native scan fails mid-traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ErrorPolicy {
    /// The mapped error surfaces to the caller and terminates the
    /// sequence; entries already yielded remain valid.
    #[default]
    Propagate,
    /// The failing subtree is treated as empty. Suppression is uniform
    /// across error kinds.
    SuppressAll,
}

/// Configuration bag for one scan.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub depth: SearchDepth,
    /// Native glob filter applied to entry names (`*`, `?` wildcards)
    pub pattern: String,
    pub filter: EntryFilter,
    pub errors: ErrorPolicy,
    /// Textual form of result paths; does not affect scan correctness
    pub path_form: PathForm,
}

impl Default for ScanOptions {
    fn default() -> Self {
        ScanOptions {
            depth: SearchDepth::default(),
            pattern: "*".to_string(),
            filter: EntryFilter::default(),
            errors: ErrorPolicy::default(),
            path_form: PathForm::default(),
        }
    }
}

impl ScanOptions {
    /// Options for a whole-subtree scan.
    pub fn recursive() -> Self {
        ScanOptions {
            depth: SearchDepth::AllLevels,
            ..Default::default()
        }
    }
}

/// One open native scan over a single directory.
struct DirScan {
    dir: PathDescriptor,
    handle: ReadDir,
}

impl DirScan {
    fn open(dir: &PathDescriptor) -> Result<DirScan> {
        debug!(path = %dir, "opening directory scan");
        let handle = fs::read_dir(dir.fs_path()).map_err(|e| map_native(&e, dir.display_name()))?;
        Ok(DirScan {
            dir: dir.clone(),
            handle,
        })
    }

    /// Advance the scan. `None` is the no-more-files terminator. The self
    /// and parent pseudo-entries never appear. Names not matching
    /// `pattern` are skipped at this layer, standing in for the pattern
    /// the native scan API would apply itself.
    fn next_record(&mut self, pattern: &str) -> Option<Result<FindData>> {
        loop {
            let step = self.handle.next()?;
            let entry = match step {
                Ok(entry) => entry,
                Err(e) => return Some(Err(map_native(&e, self.dir.display_name()))),
            };
            let name = entry.file_name().to_string_lossy().into_owned();
            if !glob_match(pattern, &name) {
                continue;
            }
            return Some(match FindData::from_dir_entry(&entry) {
                Ok(data) => Ok(data),
                Err(e) => {
                    let child = format!("{}{}{}", self.dir, self.dir.separator(), name);
                    Err(map_native(&e, &child))
                }
            });
        }
    }
}

/// Lazy pre-order traversal. Yields one [`Entry`] per record; under
/// [`ErrorPolicy::Propagate`] the first error terminates the sequence.
pub struct Walk {
    options: ScanOptions,
    stack: Vec<DirScan>,
    failed: Option<FarPathError>,
}

impl Walk {
    fn new(root: &PathDescriptor, options: ScanOptions) -> Walk {
        let root = root.with_form(options.path_form);
        let (stack, failed) = match DirScan::open(&root) {
            Ok(scan) => (vec![scan], None),
            Err(e) => match options.errors {
                ErrorPolicy::SuppressAll => {
                    warn!(path = %root, error = %e, "suppressed scan open failure");
                    (Vec::new(), None)
                }
                ErrorPolicy::Propagate => (Vec::new(), Some(e)),
            },
        };
        Walk {
            options,
            stack,
            failed,
        }
    }

    fn fail(&mut self, err: FarPathError) -> Option<Result<Entry>> {
        self.stack.clear();
        Some(Err(err))
    }
}

impl Iterator for Walk {
    type Item = Result<Entry>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(err) = self.failed.take() {
            return self.fail(err);
        }
        loop {
            let Some(scan) = self.stack.last_mut() else {
                return None;
            };
            let record = scan.next_record(&self.options.pattern);
            let parent = scan.dir.clone();

            let data = match record {
                None => {
                    // No-more-files: the scope's handle is released here.
                    self.stack.pop();
                    continue;
                }
                Some(Err(e)) => match self.options.errors {
                    ErrorPolicy::SuppressAll => {
                        warn!(path = %parent, error = %e, "suppressed scan step failure");
                        self.stack.pop();
                        continue;
                    }
                    ErrorPolicy::Propagate => return self.fail(e),
                },
                Some(Ok(data)) => data,
            };

            let child = match parent.join(&data.name) {
                Ok(child) => child,
                Err(e) => match self.options.errors {
                    ErrorPolicy::SuppressAll => continue,
                    ErrorPolicy::Propagate => return self.fail(e),
                },
            };
            let entry = Entry::project(child, &data);

            if let Entry::Directory(dir) = &entry {
                if self.options.depth == SearchDepth::AllLevels {
                    match DirScan::open(&dir.path) {
                        Ok(sub) => self.stack.push(sub),
                        Err(e) => match self.options.errors {
                            ErrorPolicy::SuppressAll => {
                                warn!(path = %dir.path, error = %e, "suppressed descent");
                            }
                            ErrorPolicy::Propagate => return self.fail(e),
                        },
                    }
                }
            }

            if self.options.filter.includes(entry.kind()) {
                return Some(Ok(entry));
            }
        }
    }
}

/// The enumeration engine. Stateless between calls: every operation is a
/// fresh scan with no shared cursor.
#[derive(Debug, Clone, Default)]
pub struct Scanner {
    options: ScanOptions,
}

impl Scanner {
    pub fn new(options: ScanOptions) -> Self {
        Scanner { options }
    }

    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    fn scoped(&self, filter: EntryFilter) -> ScanOptions {
        ScanOptions {
            filter,
            ..self.options.clone()
        }
    }

    /// Typed entries under `root`, honoring the configured entry filter.
    pub fn entries(&self, root: &PathDescriptor) -> Walk {
        Walk::new(root, self.options.clone())
    }

    /// Path plus kind for every yielded entry.
    pub fn list_entries(
        &self,
        root: &PathDescriptor,
    ) -> impl Iterator<Item = Result<(PathDescriptor, EntryKind)>> {
        self.entries(root).map(|r| {
            r.map(|entry| {
                let kind = entry.kind();
                (entry.into_path(), kind)
            })
        })
    }

    /// Paths-only variant of [`Self::list_entries`].
    pub fn list_paths(&self, root: &PathDescriptor) -> impl Iterator<Item = Result<PathDescriptor>> {
        self.entries(root).map(|r| r.map(Entry::into_path))
    }

    pub fn list_files(&self, root: &PathDescriptor) -> impl Iterator<Item = Result<FileEntry>> {
        Walk::new(root, self.scoped(EntryFilter::Files)).filter_map(|r| match r {
            Ok(Entry::File(file)) => Some(Ok(file)),
            Ok(Entry::Directory(_)) => None,
            Err(e) => Some(Err(e)),
        })
    }

    pub fn list_file_paths(
        &self,
        root: &PathDescriptor,
    ) -> impl Iterator<Item = Result<PathDescriptor>> {
        self.list_files(root).map(|r| r.map(|f| f.path))
    }

    pub fn list_directories(
        &self,
        root: &PathDescriptor,
    ) -> impl Iterator<Item = Result<DirectoryEntry>> {
        Walk::new(root, self.scoped(EntryFilter::Directories)).filter_map(|r| match r {
            Ok(Entry::Directory(dir)) => Some(Ok(dir)),
            Ok(Entry::File(_)) => None,
            Err(e) => Some(Err(e)),
        })
    }

    pub fn list_directory_paths(
        &self,
        root: &PathDescriptor,
    ) -> impl Iterator<Item = Result<PathDescriptor>> {
        self.list_directories(root).map(|r| r.map(|d| d.path))
    }

    /// Eager whole-subtree snapshot, built bottom-up by one recursive
    /// scan. Always descends regardless of the configured depth.
    pub fn build_tree(&self, root: &PathDescriptor) -> Result<DirectoryTree> {
        let root = root.with_form(self.options.path_form);
        let data = FindData::from_path(root.fs_path())
            .map_err(|e| map_native(&e, root.display_name()))?;
        let directory = match Entry::project(root.clone(), &data) {
            Entry::Directory(dir) => dir,
            Entry::File(_) => {
                return Err(FarPathError::UnmatchedEntryType {
                    expected: EntryKind::Directory,
                    found: EntryKind::File,
                    path: root.display_name().to_string(),
                })
            }
        };
        self.tree_level(directory)
    }

    fn tree_level(&self, directory: DirectoryEntry) -> Result<DirectoryTree> {
        let mut files = Vec::new();
        let mut directories = Vec::new();

        let mut scan = match DirScan::open(&directory.path) {
            Ok(scan) => scan,
            Err(e) => match self.options.errors {
                ErrorPolicy::SuppressAll => {
                    warn!(path = %directory.path, error = %e, "suppressed subtree");
                    return Ok(DirectoryTree {
                        directory,
                        files,
                        directories,
                    });
                }
                ErrorPolicy::Propagate => return Err(e),
            },
        };

        while let Some(record) = scan.next_record(&self.options.pattern) {
            let data = match record {
                Ok(data) => data,
                Err(e) => match self.options.errors {
                    ErrorPolicy::SuppressAll => break,
                    ErrorPolicy::Propagate => return Err(e),
                },
            };
            let child = match directory.path.join(&data.name) {
                Ok(child) => child,
                Err(e) => match self.options.errors {
                    ErrorPolicy::SuppressAll => continue,
                    ErrorPolicy::Propagate => return Err(e),
                },
            };
            match Entry::project(child, &data) {
                Entry::File(file) => files.push(file),
                Entry::Directory(dir) => directories.push(self.tree_level(dir)?),
            }
        }

        Ok(DirectoryTree {
            directory,
            files,
            directories,
        })
    }

    /// Aggregate counters over the subtree by an eager recursive fold.
    /// A suppressed subtree contributes zero to all three counters.
    pub fn compute_statistics(&self, root: &PathDescriptor) -> Result<ScanStats> {
        let root = root.with_form(self.options.path_form);
        self.stats_level(&root)
    }

    fn stats_level(&self, dir: &PathDescriptor) -> Result<ScanStats> {
        let mut stats = ScanStats::default();

        let mut scan = match DirScan::open(dir) {
            Ok(scan) => scan,
            Err(e) => match self.options.errors {
                ErrorPolicy::SuppressAll => return Ok(stats),
                ErrorPolicy::Propagate => return Err(e),
            },
        };

        while let Some(record) = scan.next_record(&self.options.pattern) {
            let data = match record {
                Ok(data) => data,
                Err(e) => match self.options.errors {
                    ErrorPolicy::SuppressAll => break,
                    ErrorPolicy::Propagate => return Err(e),
                },
            };
            if data.is_directory() {
                stats.dirs += 1;
                match dir.join(&data.name) {
                    Ok(child) => stats.absorb(self.stats_level(&child)?),
                    Err(e) => match self.options.errors {
                        ErrorPolicy::SuppressAll => continue,
                        ErrorPolicy::Propagate => return Err(e),
                    },
                }
            } else {
                stats.files += 1;
                stats.bytes += data.size;
            }
        }

        Ok(stats)
    }
}
