//! Path string classification
//!
//! Pure string parsing: the only side effects are the working-directory
//! lookup for relative inputs and the drive-roster check for local
//! drive-letter roots.

use std::env;

use once_cell::sync::Lazy;

use crate::error::{map_native, Result};
use crate::{bail, ensure};

use super::drives::DriveRoster;
use super::{Location, PathDescriptor, PathForm, EXTENDED_PREFIX, EXTENDED_UNC_PREFIX};

/// Characters never legal inside a DOS-style path component.
static ILLEGAL_DOS_CHARS: Lazy<Vec<char>> =
    Lazy::new(|| vec!['<', '>', ':', '"', '|', '?', '*', '/', '\\']);

/// The four textual shapes plus the POSIX extension and relative inputs.
enum RawShape<'a> {
    ExtendedShare(&'a str),
    ExtendedLocal(&'a str),
    Share(&'a str),
    DosLocal(&'a str),
    PosixLocal(&'a str),
    Relative,
}

fn detect_shape(raw: &str) -> RawShape<'_> {
    if let Some(rest) = raw.strip_prefix(EXTENDED_UNC_PREFIX) {
        return RawShape::ExtendedShare(rest);
    }
    if let Some(rest) = raw.strip_prefix(EXTENDED_PREFIX) {
        return RawShape::ExtendedLocal(rest);
    }
    if raw.starts_with(r"\\") || raw.starts_with("//") {
        return RawShape::Share(&raw[2..]);
    }
    if is_drive_spec(raw) {
        return RawShape::DosLocal(raw);
    }
    if raw.starts_with('/') {
        return RawShape::PosixLocal(raw);
    }
    RawShape::Relative
}

/// `X:` followed by a separator or end of string.
fn is_drive_spec(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    bytes.len() >= 2
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && (bytes.len() == 2 || bytes[2] == b'\\' || bytes[2] == b'/')
}

pub(super) fn parse_with_roster(
    raw: &str,
    roster: &dyn DriveRoster,
) -> Result<PathDescriptor> {
    ensure!(!raw.trim().is_empty(), InvalidPath, "empty path");

    match detect_shape(raw) {
        RawShape::ExtendedShare(rest) => parse_share(raw, rest, PathForm::Extended),
        RawShape::ExtendedLocal(rest) => parse_dos(raw, rest, PathForm::Extended, roster),
        RawShape::Share(rest) => parse_share(raw, rest, PathForm::Regular),
        RawShape::DosLocal(rest) => parse_dos(raw, rest, PathForm::Regular, roster),
        RawShape::PosixLocal(rest) => parse_posix(raw, rest),
        RawShape::Relative => {
            let cwd = env::current_dir().map_err(|e| map_native(&e, raw))?;
            let resolved = cwd.join(raw).to_string_lossy().into_owned();
            match detect_shape(&resolved) {
                // A relative input must land on an absolute shape once the
                // working directory is prepended.
                RawShape::Relative => bail!(InvalidPath, "{}", raw),
                _ => parse_with_roster(&resolved, roster),
            }
        }
    }
}

fn parse_dos(
    raw: &str,
    rest: &str,
    form: PathForm,
    roster: &dyn DriveRoster,
) -> Result<PathDescriptor> {
    ensure!(is_drive_spec(rest), InvalidPath, "{}", raw);

    let letter = rest.as_bytes()[0].to_ascii_uppercase() as char;
    if !roster.is_fixed(letter) {
        bail!(UnsupportedDriveKind, "{}", raw);
    }

    let tail = &rest[2..];
    let segments = split_segments(raw, tail, false)?;

    let root = PathDescriptor::new_root(
        format!("{letter}:\\"),
        format!("{EXTENDED_PREFIX}{letter}:\\"),
        Location::Local,
        form,
    );
    fold_segments(root, segments)
}

fn parse_share(raw: &str, rest: &str, form: PathForm) -> Result<PathDescriptor> {
    let mut segments = split_segments(raw, rest, false)?;
    ensure!(segments.len() >= 2, InvalidPath, "{}", raw);

    let tail = segments.split_off(2);
    let (server, share) = (segments.remove(0), segments.remove(0));

    let root = PathDescriptor::new_root(
        format!(r"\\{server}\{share}"),
        format!("{EXTENDED_UNC_PREFIX}{server}\\{share}"),
        Location::Share,
        form,
    );
    fold_segments(root, tail)
}

fn parse_posix(raw: &str, rest: &str) -> Result<PathDescriptor> {
    let segments = split_segments(raw, rest, true)?;

    // No length-restricted syscall form exists here, so the extended name
    // is the regular name.
    let root = PathDescriptor::new_root(
        "/".to_string(),
        "/".to_string(),
        Location::Local,
        PathForm::Regular,
    );
    fold_segments(root, segments)
}

fn fold_segments(root: PathDescriptor, segments: Vec<String>) -> Result<PathDescriptor> {
    let mut desc = root;
    for seg in segments {
        desc = PathDescriptor::new_child(desc, seg);
    }
    Ok(desc)
}

/// Split a path tail into validated, normalized components.
///
/// `.` components disappear, `..` pops the previous component and is
/// illegal at the root. Trailing separators are stripped; interior empty
/// components are rejected.
fn split_segments(raw: &str, tail: &str, posix: bool) -> Result<Vec<String>> {
    let trimmed = tail.trim_end_matches(['\\', '/']);
    let mut out: Vec<String> = Vec::new();

    for (idx, seg) in trimmed.split(['\\', '/']).enumerate() {
        if seg.is_empty() {
            // A leading empty component is the separator right after the
            // root spec; anything later is a doubled separator.
            ensure!(idx == 0, InvalidPath, "{}", raw);
            continue;
        }
        match seg {
            "." => continue,
            ".." => {
                ensure!(out.pop().is_some(), InvalidPath, "{}", raw);
            }
            _ => {
                validate_segment(raw, seg, posix)?;
                out.push(seg.to_string());
            }
        }
    }
    Ok(out)
}

fn validate_segment(raw: &str, seg: &str, posix: bool) -> Result<()> {
    if posix {
        ensure!(!seg.contains('\0'), InvalidPath, "{}", raw);
    } else {
        ensure!(
            !seg.chars()
                .any(|c| c < ' ' || ILLEGAL_DOS_CHARS.contains(&c)),
            InvalidPath,
            "{}",
            raw
        );
    }
    Ok(())
}

/// Compose a child descriptor. Used by the enumeration engine for every
/// record a scan yields.
pub(super) fn join(parent: &PathDescriptor, name: &str) -> Result<PathDescriptor> {
    ensure!(
        !name.is_empty() && name != "." && name != "..",
        InvalidPath,
        "{}",
        name
    );
    validate_segment(name, name, parent.separator() == '/')?;
    Ok(PathDescriptor::new_child(parent.clone(), name.to_string()))
}

#[cfg(test)]
mod tests {
    use crate::error::FarPathError;
    use crate::path::{parse, Location, PathDescriptor, PathForm, StaticDrives};

    fn parse_any(raw: &str) -> PathDescriptor {
        parse(raw).expect(raw)
    }

    #[test]
    fn classifies_local_regular() {
        let p = parse_any(r"C:\data\logs");
        assert_eq!(p.location(), Location::Local);
        assert_eq!(p.form(), PathForm::Regular);
        assert_eq!(p.regular_name(), r"C:\data\logs");
        assert_eq!(p.extended_name(), r"\\?\C:\data\logs");
        assert_eq!(p.name(), Some("logs"));
    }

    #[test]
    fn classifies_local_extended() {
        let p = parse_any(r"\\?\C:\data\logs");
        assert_eq!(p.location(), Location::Local);
        assert_eq!(p.form(), PathForm::Extended);
        assert_eq!(p.regular_name(), r"C:\data\logs");
        assert_eq!(p.display_name(), r"\\?\C:\data\logs");
    }

    #[test]
    fn classifies_share_regular() {
        let p = parse_any(r"\\srv\vol\data");
        assert_eq!(p.location(), Location::Share);
        assert_eq!(p.regular_name(), r"\\srv\vol\data");
        assert_eq!(p.extended_name(), r"\\?\UNC\srv\vol\data");
        assert_eq!(p.root().unwrap().regular_name(), r"\\srv\vol");
    }

    #[test]
    fn classifies_share_extended() {
        let p = parse_any(r"\\?\UNC\srv\vol\data");
        assert_eq!(p.location(), Location::Share);
        assert_eq!(p.form(), PathForm::Extended);
        assert_eq!(p.regular_name(), r"\\srv\vol\data");
    }

    #[test]
    fn classifies_posix_local() {
        let p = parse_any("/var/log");
        assert_eq!(p.location(), Location::Local);
        assert_eq!(p.regular_name(), "/var/log");
        assert_eq!(p.extended_name(), "/var/log");
        assert_eq!(p.root().unwrap().regular_name(), "/");
    }

    #[test]
    fn drive_root_has_no_parent_or_name() {
        for raw in [r"C:\", "C:", r"\\?\C:\"] {
            let p = parse_any(raw);
            assert!(p.is_root(), "{raw}");
            assert_eq!(p.name(), None);
            assert!(p.parent().is_none());
            assert!(p.root().is_none());
        }
    }

    #[test]
    fn share_root_detection() {
        let p = parse_any(r"\\srv\vol");
        assert!(p.is_root());
        assert_eq!(p.name(), None);
        let deeper = parse_any(r"\\srv\vol\x");
        assert!(!deeper.is_root());
    }

    #[test]
    fn parent_and_root_decomposition() {
        let p = parse_any(r"C:\a\b");
        assert_eq!(p.parent().unwrap(), &parse_any(r"C:\a"));
        assert_eq!(p.root().unwrap(), &parse_any(r"C:\"));
    }

    #[test]
    fn trailing_separators_are_stripped() {
        assert_eq!(parse_any(r"C:\a\b\").regular_name(), r"C:\a\b");
        assert_eq!(parse_any("/var/log///").regular_name(), "/var/log");
    }

    #[test]
    fn round_trip_between_forms() {
        for raw in [r"\\?\C:\a\b", r"\\?\UNC\srv\vol\a", r"C:\x", r"\\srv\vol\x"] {
            let p = parse_any(raw);
            assert_eq!(
                p.to_extended().to_regular().display_name(),
                p.to_regular().display_name(),
                "{raw}"
            );
            // Reparsing the regular spelling lands on the same extended name.
            let reparsed = parse_any(p.to_regular().display_name());
            assert_eq!(reparsed.extended_name(), p.extended_name());
        }
    }

    #[test]
    fn dot_segments_normalize() {
        assert_eq!(parse_any(r"C:\a\.\b").regular_name(), r"C:\a\b");
        assert_eq!(parse_any(r"C:\a\x\..\b").regular_name(), r"C:\a\b");
        assert!(parse(r"C:\..").is_err());
    }

    #[test]
    fn rejects_unclassifiable_shapes() {
        for raw in ["", "   ", r"\\srv", r"C:\a\<b>", "C:\\a\u{1}b", r"C:\a|b"] {
            assert!(
                matches!(parse(raw), Err(FarPathError::InvalidPath(_))),
                "{raw:?}"
            );
        }
    }

    #[test]
    fn rejects_doubled_interior_separators() {
        assert!(parse(r"C:\a\\b").is_err());
    }

    #[test]
    fn relative_paths_resolve_against_cwd() {
        let p = parse_any("src");
        assert!(!p.is_root());
        assert_eq!(p.name(), Some("src"));
        let cwd = std::env::current_dir().unwrap();
        assert!(p
            .regular_name()
            .starts_with(&*cwd.to_string_lossy()));
    }

    #[test]
    fn non_fixed_drives_are_rejected() {
        let roster = StaticDrives::new(['C']);
        assert!(PathDescriptor::parse_with_roster(r"C:\ok", &roster).is_ok());
        assert!(matches!(
            PathDescriptor::parse_with_roster(r"Z:\mapped", &roster),
            Err(FarPathError::UnsupportedDriveKind(_))
        ));
    }

    #[test]
    fn join_composes_children() {
        let dir = parse_any(r"C:\a");
        let child = dir.join("b.txt").unwrap();
        assert_eq!(child.regular_name(), r"C:\a\b.txt");
        assert_eq!(child.extended_name(), r"\\?\C:\a\b.txt");
        assert_eq!(child.parent().unwrap(), &dir);
        assert!(dir.join("x\\y").is_err());
        assert!(dir.join("..").is_err());
    }

    #[test]
    fn join_under_posix_root() {
        let root = parse_any("/");
        assert!(root.is_root());
        let child = root.join("tmp").unwrap();
        assert_eq!(child.regular_name(), "/tmp");
    }

    #[test]
    fn display_follows_preferred_form() {
        let p = parse_any(r"C:\a");
        assert_eq!(p.to_string(), r"C:\a");
        assert_eq!(p.to_extended().to_string(), r"\\?\C:\a");
    }
}
