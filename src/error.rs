//! Error handling for farpath
//!
//! This module defines the fixed failure taxonomy shared by the path model,
//! the enumeration engine and the transfer engine, plus the mapping layer
//! that classifies an observed native failure into that taxonomy. No raw
//! OS status code crosses the public boundary: anything without a dedicated
//! variant is wrapped as [`FarPathError::NativeFailure`] with the code
//! preserved for diagnostics.

use std::io;

use thiserror::Error;

use crate::types::EntryKind;

/// Error type for all farpath operations
///
/// Every variant carries the offending path string so callers can report
/// failures without additional bookkeeping.
#[derive(Error, Debug, Clone)]
pub enum FarPathError {
    /// The string does not classify into any supported address space,
    /// or a component contains illegal characters
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// A local path's root is not a mounted fixed logical volume
    /// (for example a mapped network drive)
    #[error("unsupported drive kind for path: {0}")]
    UnsupportedDriveKind(String),

    /// The target, or an intermediate segment, does not exist
    #[error("path not found: {0}")]
    PathNotFound(String),

    /// Creation was requested for a path that already exists, or a copy
    /// with overwrite disabled targets an existing file
    #[error("path already exists: {0}")]
    PathAlreadyExists(String),

    /// A non-recursive delete was attempted on a non-empty directory
    #[error("directory not empty: {0}")]
    DirectoryNotEmpty(String),

    /// The caller requested one entry kind but the path holds the other
    #[error("expected {expected} but found {found}: {path}")]
    UnmatchedEntryType {
        expected: EntryKind,
        found: EntryKind,
        path: String,
    },

    /// Any other native status, preserved verbatim
    #[error("native failure (code {code}): {path}")]
    NativeFailure { code: i32, path: String },
}

/// Specialized Result type for farpath operations
pub type Result<T> = std::result::Result<T, FarPathError>;

impl FarPathError {
    /// The path string this failure was observed against.
    pub fn path(&self) -> &str {
        match self {
            Self::InvalidPath(p)
            | Self::UnsupportedDriveKind(p)
            | Self::PathNotFound(p)
            | Self::PathAlreadyExists(p)
            | Self::DirectoryNotEmpty(p) => p,
            Self::UnmatchedEntryType { path, .. } | Self::NativeFailure { path, .. } => path,
        }
    }
}

// ERROR_DIR_NOT_EMPTY / ENOTEMPTY for toolchains where the dedicated
// io::ErrorKind is not yet emitted.
#[cfg(windows)]
const NOT_EMPTY_CODE: i32 = 145;
#[cfg(not(windows))]
const NOT_EMPTY_CODE: i32 = 39;

/// Classify a native failure observed against `path`.
///
/// One-shot lookup: the filesystem is never re-inspected and nothing is
/// retried here.
pub fn map_native(err: &io::Error, path: &str) -> FarPathError {
    match err.kind() {
        io::ErrorKind::NotFound => FarPathError::PathNotFound(path.to_string()),
        io::ErrorKind::AlreadyExists => FarPathError::PathAlreadyExists(path.to_string()),
        _ => match err.raw_os_error() {
            Some(NOT_EMPTY_CODE) => FarPathError::DirectoryNotEmpty(path.to_string()),
            Some(code) => FarPathError::NativeFailure {
                code,
                path: path.to_string(),
            },
            None => FarPathError::NativeFailure {
                code: -1,
                path: path.to_string(),
            },
        },
    }
}

/// Creates a FarPathError with a formatted message
#[macro_export]
macro_rules! error {
    ($error_type:ident, $($arg:tt)*) => {
        $crate::error::FarPathError::$error_type(format!($($arg)*))
    };
}

/// Returns an error result with a formatted message
#[macro_export]
macro_rules! bail {
    ($error_type:ident, $($arg:tt)*) => {
        return Err($crate::error!($error_type, $($arg)*))
    };
}

/// Ensures a condition is true, otherwise returns an error
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $error_type:ident, $($arg:tt)*) => {
        if !($cond) {
            $crate::bail!($error_type, $($arg)*)
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_not_found() {
        let err = io::Error::new(io::ErrorKind::NotFound, "gone");
        match map_native(&err, "C:\\missing") {
            FarPathError::PathNotFound(p) => assert_eq!(p, "C:\\missing"),
            other => panic!("unexpected mapping: {other:?}"),
        }
    }

    #[test]
    fn maps_already_exists() {
        let err = io::Error::new(io::ErrorKind::AlreadyExists, "there");
        assert!(matches!(
            map_native(&err, "C:\\present"),
            FarPathError::PathAlreadyExists(_)
        ));
    }

    #[test]
    fn maps_not_empty_from_raw_code() {
        let err = io::Error::from_raw_os_error(NOT_EMPTY_CODE);
        assert!(matches!(
            map_native(&err, "C:\\full"),
            FarPathError::DirectoryNotEmpty(_)
        ));
    }

    #[test]
    fn unmapped_codes_are_preserved() {
        let err = io::Error::from_raw_os_error(1117);
        match map_native(&err, "C:\\odd") {
            FarPathError::NativeFailure { code, path } => {
                assert_eq!(code, 1117);
                assert_eq!(path, "C:\\odd");
            }
            other => panic!("unexpected mapping: {other:?}"),
        }
    }

    #[test]
    fn every_variant_reports_its_path() {
        let err = error!(InvalidPath, "junk{}", "!");
        assert_eq!(err.path(), "junk!");
    }
}
