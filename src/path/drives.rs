//! Drive roster: which drive letters back fixed logical volumes
//!
//! The path model rejects local roots that are not mounted fixed volumes
//! (mapped network drives in particular). The roster is a trait so callers
//! and tests can pin a drive list instead of racing the live system state.

/// Source of truth for which drive letters are fixed logical volumes.
pub trait DriveRoster {
    /// Whether `letter` names a mounted fixed logical volume.
    fn is_fixed(&self, letter: char) -> bool;
}

/// The live system drive list.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemDrives;

#[cfg(windows)]
impl DriveRoster for SystemDrives {
    fn is_fixed(&self, letter: char) -> bool {
        use windows::core::HSTRING;
        use windows::Win32::Storage::FileSystem::{GetDriveTypeW, GetLogicalDrives};

        let letter = letter.to_ascii_uppercase();
        let bit = (letter as u8).wrapping_sub(b'A');
        if bit >= 26 {
            return false;
        }
        let mask = unsafe { GetLogicalDrives() };
        if mask & (1u32 << bit) == 0 {
            return false;
        }
        // DRIVE_FIXED
        let root = HSTRING::from(format!("{letter}:\\"));
        unsafe { GetDriveTypeW(&root) == 3 }
    }
}

// Drive letters do not exist on this platform, so a drive-shaped path is a
// string-level construct and the live-roster check does not apply.
#[cfg(not(windows))]
impl DriveRoster for SystemDrives {
    fn is_fixed(&self, _letter: char) -> bool {
        true
    }
}

/// A pinned roster, for tests and for callers that capture the drive list
/// once instead of re-querying it per parse.
#[derive(Debug, Clone, Default)]
pub struct StaticDrives {
    fixed: Vec<char>,
}

impl StaticDrives {
    pub fn new<I: IntoIterator<Item = char>>(letters: I) -> Self {
        StaticDrives {
            fixed: letters
                .into_iter()
                .map(|c| c.to_ascii_uppercase())
                .collect(),
        }
    }
}

impl DriveRoster for StaticDrives {
    fn is_fixed(&self, letter: char) -> bool {
        self.fixed.contains(&letter.to_ascii_uppercase())
    }
}
