/*!
 * Chunked transfer engine
 *
 * Moves and compares file content in bounded-size chunks so comparison and
 * hash workloads never load a whole file. Copies run as a one-directional
 * job state machine with coarse-grained cancellation: the token is polled
 * between chunks, never mid-chunk.
 */

use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use digest::DynDigest;
use md5::Md5;
use sha1::Sha1;
use sha2::{Sha256, Sha512};
use tracing::debug;

use crate::error::{map_native, FarPathError, Result};
use crate::path::PathDescriptor;

/// Default copy chunk size: 1 MiB.
pub const DEFAULT_CHUNK_SIZE: usize = 1024 * 1024;

/// A bounded contiguous byte range of a file, addressed by starting offset.
#[derive(Debug, Clone)]
pub struct TransferChunk {
    offset: u64,
    bytes: Vec<u8>,
}

impl TransferChunk {
    pub fn new(offset: u64, bytes: Vec<u8>) -> Self {
        TransferChunk { offset, bytes }
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Two chunks are position-equal iff their offsets match.
    pub fn position_eq(&self, other: &TransferChunk) -> bool {
        self.offset == other.offset
    }

    /// Two chunks are content-equal iff lengths and all bytes match.
    pub fn content_eq(&self, other: &TransferChunk) -> bool {
        self.bytes == other.bytes
    }

    /// Digest of this chunk's bytes.
    pub fn digest(&self, algorithm: HashAlgorithm) -> Vec<u8> {
        let mut hasher = algorithm.hasher();
        hasher.update(&self.bytes);
        hasher.finalize().to_vec()
    }

    pub fn digest_hex(&self, algorithm: HashAlgorithm) -> String {
        to_hex(&self.digest(algorithm))
    }
}

/// Selectable digest algorithms for chunk and whole-file hashing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum HashAlgorithm {
    Md5,
    Sha1,
    #[default]
    Sha256,
    Sha512,
}

impl HashAlgorithm {
    fn hasher(self) -> Box<dyn DynDigest> {
        match self {
            HashAlgorithm::Md5 => Box::new(Md5::default()),
            HashAlgorithm::Sha1 => Box::new(Sha1::default()),
            HashAlgorithm::Sha256 => Box::new(Sha256::default()),
            HashAlgorithm::Sha512 => Box::new(Sha512::default()),
        }
    }
}

fn to_hex(bytes: &[u8]) -> String {
    use std::fmt::Write as _;
    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut out, b| {
        let _ = write!(out, "{b:02x}");
        out
    })
}

/// Lazy sequence of consecutive chunks from one file, front to back. The
/// last chunk may be shorter than the configured size.
pub struct ChunkReader {
    file: File,
    path: String,
    chunk_size: usize,
    offset: u64,
    done: bool,
}

impl ChunkReader {
    fn fill(&mut self) -> std::io::Result<Vec<u8>> {
        let mut buf = vec![0u8; self.chunk_size];
        let mut filled = 0;
        while filled < buf.len() {
            match self.file.read(&mut buf[filled..])? {
                0 => break,
                n => filled += n,
            }
        }
        buf.truncate(filled);
        Ok(buf)
    }
}

impl Iterator for ChunkReader {
    type Item = Result<TransferChunk>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.fill() {
            Ok(bytes) if bytes.is_empty() => {
                self.done = true;
                None
            }
            Ok(bytes) => {
                let chunk = TransferChunk::new(self.offset, bytes);
                self.offset += chunk.len() as u64;
                if chunk.len() < self.chunk_size {
                    self.done = true;
                }
                Some(Ok(chunk))
            }
            Err(e) => {
                self.done = true;
                Some(Err(map_native(&e, &self.path)))
            }
        }
    }
}

/// Open `path` for sequential reading in `chunk_size` pieces.
pub fn read_chunks(path: &PathDescriptor, chunk_size: usize) -> Result<ChunkReader> {
    let file = File::open(path.fs_path()).map_err(|e| map_native(&e, path.display_name()))?;
    Ok(ChunkReader {
        file,
        path: path.display_name().to_string(),
        chunk_size: chunk_size.max(1),
        offset: 0,
        done: false,
    })
}

/// Whether two files hold identical content, compared chunk by chunk.
/// Short-circuits on the first unequal pair.
pub fn is_equal_contents(
    a: &PathDescriptor,
    b: &PathDescriptor,
    chunk_size: usize,
) -> Result<bool> {
    let mut left = read_chunks(a, chunk_size)?;
    let mut right = read_chunks(b, chunk_size)?;
    loop {
        match (left.next().transpose()?, right.next().transpose()?) {
            (None, None) => return Ok(true),
            (Some(l), Some(r)) if l.content_eq(&r) => continue,
            _ => return Ok(false),
        }
    }
}

/// The chunks of `a` and `b` that differ at matching offsets, fully
/// materialized. When one file is shorter, the other file's surplus
/// chunks count as differing.
pub fn differing_chunks(
    a: &PathDescriptor,
    b: &PathDescriptor,
    chunk_size: usize,
) -> Result<Vec<TransferChunk>> {
    compare_chunks(a, b, chunk_size, false)
}

/// The chunks of `a` whose counterpart in `b` is content-equal.
pub fn matching_chunks(
    a: &PathDescriptor,
    b: &PathDescriptor,
    chunk_size: usize,
) -> Result<Vec<TransferChunk>> {
    compare_chunks(a, b, chunk_size, true)
}

fn compare_chunks(
    a: &PathDescriptor,
    b: &PathDescriptor,
    chunk_size: usize,
    keep_matching: bool,
) -> Result<Vec<TransferChunk>> {
    let mut left = read_chunks(a, chunk_size)?;
    let mut right = read_chunks(b, chunk_size)?;
    let mut out = Vec::new();
    loop {
        match (left.next().transpose()?, right.next().transpose()?) {
            (None, None) => return Ok(out),
            (Some(l), Some(r)) => {
                if l.content_eq(&r) == keep_matching {
                    out.push(l);
                }
            }
            (Some(surplus), None) | (None, Some(surplus)) => {
                if !keep_matching {
                    out.push(surplus);
                }
            }
        }
    }
}

/// Streaming digest of a whole file, read in chunks.
pub fn hash_file(path: &PathDescriptor, algorithm: HashAlgorithm) -> Result<String> {
    let mut hasher = algorithm.hasher();
    for chunk in read_chunks(path, DEFAULT_CHUNK_SIZE)? {
        hasher.update(chunk?.bytes());
    }
    Ok(to_hex(&hasher.finalize()))
}

/// Cooperative cancellation flag shared between a job owner and the copy
/// loop.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Where a copy job stands. Transitions are one-directional; a failed or
/// cancelled job must be recreated to retry.
#[derive(Debug, Clone)]
pub enum JobState {
    Pending,
    Running,
    Completed,
    Cancelled,
    Failed(FarPathError),
}

/// One copy request: source to target in `chunk_size` pieces.
#[derive(Debug)]
pub struct CopyJob {
    source: PathDescriptor,
    target: PathDescriptor,
    chunk_size: usize,
    overwrite: bool,
    cancellation: CancelToken,
    state: JobState,
    bytes_copied: u64,
}

impl CopyJob {
    pub fn new(source: PathDescriptor, target: PathDescriptor) -> Self {
        CopyJob {
            source,
            target,
            chunk_size: DEFAULT_CHUNK_SIZE,
            overwrite: false,
            cancellation: CancelToken::new(),
            state: JobState::Pending,
            bytes_copied: 0,
        }
    }

    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn source(&self) -> &PathDescriptor {
        &self.source
    }

    pub fn target(&self) -> &PathDescriptor {
        &self.target
    }

    /// Token to cancel this job from another call site.
    pub fn cancellation(&self) -> CancelToken {
        self.cancellation.clone()
    }

    pub fn state(&self) -> &JobState {
        &self.state
    }

    pub fn bytes_copied(&self) -> u64 {
        self.bytes_copied
    }

    /// Run the job to a terminal state. Only a pending job runs; calling
    /// this on any other state leaves the job untouched.
    pub fn run(&mut self) -> &JobState {
        self.run_with(|_| {})
    }

    /// Like [`Self::run`], invoking `on_chunk` after each chunk lands in
    /// the target.
    pub fn run_with<F: FnMut(&TransferChunk)>(&mut self, mut on_chunk: F) -> &JobState {
        if !matches!(self.state, JobState::Pending) {
            return &self.state;
        }
        self.state = JobState::Running;
        debug!(source = %self.source, target = %self.target, "copy job started");
        self.state = match self.execute(&mut on_chunk) {
            Ok(state) => state,
            Err(e) => JobState::Failed(e),
        };
        &self.state
    }

    fn execute<F: FnMut(&TransferChunk)>(&mut self, on_chunk: &mut F) -> Result<JobState> {
        // The source opens before the target exists; a job that cannot
        // read never creates or truncates anything.
        let source = read_chunks(&self.source, self.chunk_size)?;

        let mut options = OpenOptions::new();
        options.write(true);
        if self.overwrite {
            options.create(true).truncate(true);
        } else {
            // Fails fast with the existing-target error before any bytes
            // are written.
            options.create_new(true);
        }
        let mut target = options
            .open(self.target.fs_path())
            .map_err(|e| map_native(&e, self.target.display_name()))?;

        // Sequential writes land each chunk at its source offset. On a
        // mid-copy failure, bytes already written stay in place.
        for chunk in source {
            if self.cancellation.is_cancelled() {
                return Ok(JobState::Cancelled);
            }
            let chunk = chunk?;
            target
                .write_all(chunk.bytes())
                .map_err(|e| map_native(&e, self.target.display_name()))?;
            self.bytes_copied += chunk.len() as u64;
            on_chunk(&chunk);
        }
        target
            .flush()
            .map_err(|e| map_native(&e, self.target.display_name()))?;
        Ok(JobState::Completed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_equality_semantics() {
        let a = TransferChunk::new(0, vec![1, 2, 3]);
        let b = TransferChunk::new(0, vec![1, 2, 4]);
        let c = TransferChunk::new(4, vec![1, 2, 3]);
        assert!(a.position_eq(&b));
        assert!(!a.position_eq(&c));
        assert!(!a.content_eq(&b));
        assert!(a.content_eq(&c));
        assert!(!a.content_eq(&TransferChunk::new(0, vec![1, 2])));
    }

    #[test]
    fn chunk_digests() {
        let chunk = TransferChunk::new(0, b"hello".to_vec());
        assert_eq!(
            chunk.digest_hex(HashAlgorithm::Md5),
            "5d41402abc4b2a76b9719d911017c592"
        );
        assert_eq!(
            chunk.digest_hex(HashAlgorithm::Sha256),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[test]
    fn hex_rendering() {
        assert_eq!(to_hex(&[0x00, 0xff, 0x0a]), "00ff0a");
    }
}
