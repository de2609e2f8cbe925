/*!
 * Command-line configuration for farpath
 */

use clap::{Parser, Subcommand};
use clap_complete::Shell;

use crate::path::PathForm;
use crate::scanner::{EntryFilter, ErrorPolicy, ScanOptions, SearchDepth};
use crate::transfer::{HashAlgorithm, DEFAULT_CHUNK_SIZE};

/// Command-line arguments for farpath
#[derive(Parser, Debug, Clone)]
#[clap(
    name = "farpath",
    version = env!("CARGO_PKG_VERSION"),
    about = "Traverse, inspect and copy files on local volumes and network shares",
    long_about = "Filesystem access beyond traditional path-length limits: uniform \
                  traversal, metadata retrieval and chunked copy for local volumes \
                  and network shares."
)]
pub struct Args {
    #[clap(subcommand)]
    pub command: Command,
}

/// Scan parameters shared by the traversal subcommands
#[derive(clap::Args, Debug, Clone)]
pub struct ScanArgs {
    /// Directory to scan
    #[clap(default_value = ".")]
    pub path: String,

    /// Glob filter applied to entry names
    #[clap(long, default_value = "*")]
    pub pattern: String,

    /// How deep the scan descends
    #[clap(long, value_enum, default_value_t = SearchDepth::AllLevels)]
    pub depth: SearchDepth,

    /// Which entry kinds to yield
    #[clap(long, value_enum, default_value_t)]
    pub filter: EntryFilter,

    /// Whether scan failures terminate the walk or are absorbed
    #[clap(long, value_enum, default_value_t)]
    pub errors: ErrorPolicy,

    /// Textual form of printed paths
    #[clap(long, value_enum, default_value_t)]
    pub form: PathForm,
}

impl ScanArgs {
    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            depth: self.depth,
            pattern: self.pattern.clone(),
            filter: self.filter,
            errors: self.errors,
            path_form: self.form,
        }
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List entries under a directory
    List(ScanArgs),

    /// Snapshot a whole subtree
    Tree {
        #[clap(flatten)]
        scan: ScanArgs,

        /// Emit the snapshot as JSON
        #[clap(long)]
        json: bool,
    },

    /// Aggregate subtree statistics
    Stats {
        #[clap(flatten)]
        scan: ScanArgs,

        /// Emit the report as JSON
        #[clap(long)]
        json: bool,
    },

    /// Copy a file in bounded chunks
    Copy {
        source: String,
        target: String,

        /// Chunk size in bytes
        #[clap(long, default_value_t = DEFAULT_CHUNK_SIZE)]
        chunk_size: usize,

        /// Replace the target if it already exists
        #[clap(long)]
        overwrite: bool,
    },

    /// Compare two files chunk by chunk
    Compare {
        left: String,
        right: String,

        /// Chunk size in bytes
        #[clap(long, default_value_t = DEFAULT_CHUNK_SIZE)]
        chunk_size: usize,
    },

    /// Digest a file
    Hash {
        path: String,

        #[clap(long, value_enum, default_value_t)]
        algorithm: HashAlgorithm,
    },

    /// Generate shell completions
    Completions {
        #[clap(value_enum)]
        shell: Shell,
    },
}
