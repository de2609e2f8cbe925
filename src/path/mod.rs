//! Path model: parsing and classification of filesystem locations
//!
//! A [`PathDescriptor`] is an immutable value describing one filesystem
//! location across four address spaces: local-regular (`X:\...`),
//! local-extended (`\\?\X:\...`), share-regular (`\\server\share\...`) and
//! share-extended (`\\?\UNC\server\share\...`). On POSIX hosts a rooted
//! `/...` path classifies as local-regular with an identity extended form,
//! so the enumeration and transfer engines work unchanged.
//!
//! Decomposition into root, parent and leaf name happens once at parse time
//! by pure string operations; no descriptor accessor touches the filesystem.

mod drives;
mod parser;

use std::fmt;
use std::path::Path;

use serde::{Serialize, Serializer};

use crate::error::Result;

pub use drives::{DriveRoster, StaticDrives, SystemDrives};

/// Prefix marking the length-unrestricted form of a local path.
pub const EXTENDED_PREFIX: &str = r"\\?\";
/// Prefix marking the length-unrestricted form of a share path.
pub const EXTENDED_UNC_PREFIX: &str = r"\\?\UNC\";

/// Where a path points: a local volume or a network share.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Location {
    Local,
    Share,
}

/// Which textual form of a descriptor is preferred for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, clap::ValueEnum)]
pub enum PathForm {
    /// Display form: drive letter or `\\server\share` style
    #[default]
    Regular,
    /// Long-path form usable for native calls beyond the traditional limit
    Extended,
}

/// Immutable descriptor of one filesystem location.
///
/// Both textual forms always denote the same object; conversion between
/// them is total and lossless apart from trailing separators, which are
/// stripped during parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathDescriptor {
    regular_name: String,
    extended_name: String,
    name: Option<String>,
    parent: Option<Box<PathDescriptor>>,
    location: Location,
    form: PathForm,
}

impl PathDescriptor {
    /// Parse and classify a path string.
    ///
    /// Relative inputs are resolved against the current working directory
    /// before classification. Local drive-letter roots are checked against
    /// the live system drive roster; non-fixed drives are rejected with
    /// [`crate::FarPathError::UnsupportedDriveKind`].
    pub fn parse(raw: &str) -> Result<Self> {
        parser::parse_with_roster(raw, &SystemDrives)
    }

    /// Parse with an explicit drive roster instead of the live system list.
    pub fn parse_with_roster(raw: &str, roster: &dyn DriveRoster) -> Result<Self> {
        parser::parse_with_roster(raw, roster)
    }

    /// Parse an OS path value.
    pub fn from_path(path: &Path) -> Result<Self> {
        Self::parse(&path.to_string_lossy())
    }

    /// Display-form path, no trailing separator (roots excepted).
    pub fn regular_name(&self) -> &str {
        &self.regular_name
    }

    /// Long-path form usable for native calls.
    pub fn extended_name(&self) -> &str {
        &self.extended_name
    }

    /// Leaf component; `None` when this descriptor is a root.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Containing directory; `None` when this descriptor is a root.
    pub fn parent(&self) -> Option<&PathDescriptor> {
        self.parent.as_deref()
    }

    /// Volume or share root; `None` when this descriptor itself is a root.
    pub fn root(&self) -> Option<&PathDescriptor> {
        let mut current = self.parent()?;
        while let Some(up) = current.parent() {
            current = up;
        }
        Some(current)
    }

    /// True iff this descriptor has no parent.
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn location(&self) -> Location {
        self.location
    }

    /// Which textual form was supplied or preferred.
    pub fn form(&self) -> PathForm {
        self.form
    }

    /// The preferred textual form.
    pub fn display_name(&self) -> &str {
        match self.form {
            PathForm::Regular => &self.regular_name,
            PathForm::Extended => &self.extended_name,
        }
    }

    /// Same location with the preferred form switched.
    pub fn with_form(&self, form: PathForm) -> PathDescriptor {
        PathDescriptor {
            regular_name: self.regular_name.clone(),
            extended_name: self.extended_name.clone(),
            name: self.name.clone(),
            parent: self
                .parent
                .as_ref()
                .map(|p| Box::new(p.with_form(form))),
            location: self.location,
            form,
        }
    }

    /// Shorthand for [`Self::with_form`] with [`PathForm::Regular`].
    pub fn to_regular(&self) -> PathDescriptor {
        self.with_form(PathForm::Regular)
    }

    /// Shorthand for [`Self::with_form`] with [`PathForm::Extended`].
    pub fn to_extended(&self) -> PathDescriptor {
        self.with_form(PathForm::Extended)
    }

    /// Compose a child descriptor for `name` under this location.
    ///
    /// Pure string operation; the child inherits location and preferred
    /// form and keeps a parent link back to `self`.
    pub fn join(&self, name: &str) -> Result<PathDescriptor> {
        parser::join(self, name)
    }

    /// The textual form handed to native filesystem calls on this host.
    pub fn fs_path(&self) -> &Path {
        #[cfg(windows)]
        {
            Path::new(&self.extended_name)
        }
        #[cfg(not(windows))]
        {
            Path::new(&self.regular_name)
        }
    }

    /// Separator used by this descriptor's address space.
    pub(crate) fn separator(&self) -> char {
        if self.regular_name.starts_with('/') {
            '/'
        } else {
            '\\'
        }
    }

    pub(crate) fn new_root(
        regular_name: String,
        extended_name: String,
        location: Location,
        form: PathForm,
    ) -> Self {
        PathDescriptor {
            regular_name,
            extended_name,
            name: None,
            parent: None,
            location,
            form,
        }
    }

    pub(crate) fn new_child(parent: PathDescriptor, name: String) -> Self {
        let sep = parent.separator();
        let mut regular_name = parent.regular_name.clone();
        if !regular_name.ends_with(sep) {
            regular_name.push(sep);
        }
        regular_name.push_str(&name);

        let mut extended_name = parent.extended_name.clone();
        if !extended_name.ends_with(sep) {
            extended_name.push(sep);
        }
        extended_name.push_str(&name);

        let location = parent.location;
        let form = parent.form;
        PathDescriptor {
            regular_name,
            extended_name,
            name: Some(name),
            parent: Some(Box::new(parent)),
            location,
            form,
        }
    }
}

impl fmt::Display for PathDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl Serialize for PathDescriptor {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.display_name())
    }
}

/// Parse and classify a path string. See [`PathDescriptor::parse`].
pub fn parse(raw: &str) -> Result<PathDescriptor> {
    PathDescriptor::parse(raw)
}
