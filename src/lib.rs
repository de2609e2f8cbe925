/*!
 * farpath - Filesystem access beyond traditional path-length limits
 *
 * This library provides uniform traversal, metadata retrieval and chunked
 * copy semantics for local volumes and network shares, built around a path
 * model that spans regular and extended (long-path) address spaces.
 */

pub mod config;
pub mod error;
pub mod ops;
pub mod path;
pub mod report;
pub mod scanner;
pub mod transfer;
pub mod types;
pub mod utils;


// Re-export main components for easier access
pub use error::{map_native, FarPathError, Result};
pub use path::{parse, DriveRoster, Location, PathDescriptor, PathForm, StaticDrives, SystemDrives};
pub use report::{ReportFormat, Reporter, ScanReport};
pub use scanner::{EntryFilter, ErrorPolicy, ScanOptions, Scanner, SearchDepth, Walk};
pub use transfer::{
    differing_chunks, hash_file, is_equal_contents, matching_chunks, read_chunks, CancelToken,
    CopyJob, HashAlgorithm, JobState, TransferChunk, DEFAULT_CHUNK_SIZE,
};
pub use types::{
    DirectoryEntry, DirectoryTree, Entry, EntryKind, EntryMeta, FileEntry, FindData, ScanStats,
};
pub use utils::{format_attributes, format_file_size};

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
