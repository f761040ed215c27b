//! Case handling for paths inside mod and game data trees.
//!
//! Mods are authored on Windows, where `Textures\Armor.dds` and
//! `textures\armor.dds` name the same file. On Linux they do not.
//! This module provides:
//! - Case folding and relative-path formatting (`/` separated)
//! - Case-insensitive and exact lookups of a file name within its parent directory
//! - Conversion of Windows/Wine paths found in MO2 config files

use std::ffi::OsStr;
use std::io;
use std::path::{Path, PathBuf};

/// Fold a path or file name for case-insensitive comparison.
pub fn fold_case(path: &str) -> String {
    path.to_lowercase()
}

/// Check if two names are equal ignoring case.
pub fn eq_ignore_case(a: &str, b: &str) -> bool {
    fold_case(a) == fold_case(b)
}

/// Format `path` relative to `root` using `/` between components.
///
/// Returns `None` if `path` is not below `root`, is `root` itself, or has a
/// component that is not valid UTF-8.
pub fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let joined = relative
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect::<Option<Vec<_>>>()?
        .join("/");
    if joined.is_empty() {
        None
    } else {
        Some(joined)
    }
}

/// Get the file name of a path as a string.
///
/// `None` for names that are not valid UTF-8: case folding such a name
/// cannot be done without changing its bytes.
pub fn file_name(path: &Path) -> Option<String> {
    path.file_name()?.to_str().map(str::to_string)
}

/// The path with its final component lower-cased, in the same directory.
/// `Mod/Textures/Armor.DDS` -> `Mod/Textures/armor.dds`
pub fn with_lower_case_file_name(path: &Path) -> Option<PathBuf> {
    let name = file_name(path)?;
    Some(path.with_file_name(fold_case(&name)))
}

/// Look up the actual file name of `path` in its parent directory, ignoring case.
///
/// Case-insensitivity only applies to the file name, not the parent path.
/// An exact match is preferred; otherwise the first case-insensitive match
/// found in the directory listing is returned. A parent that is missing or is
/// not a directory is `Ok(None)`, any other read error is returned. Entries
/// whose names are not valid UTF-8 never match.
pub fn find_name_case_insensitive(path: &Path) -> io::Result<Option<String>> {
    let (Some(parent), Some(wanted)) = (path.parent(), file_name(path)) else {
        return Ok(None);
    };

    let Some(entries) = read_dir_if_directory(parent)? else {
        return Ok(None);
    };

    let wanted_folded = fold_case(&wanted);
    let mut first_match = None;
    for entry in entries {
        let Ok(name) = entry?.file_name().into_string() else {
            continue;
        };
        if name == wanted {
            return Ok(Some(name));
        }
        if first_match.is_none() && fold_case(&name) == wanted_folded {
            first_match = Some(name);
        }
    }
    Ok(first_match)
}

/// Check whether `name` exists in `dir` with exactly that casing.
///
/// Unlike `Path::exists`, this gives the same answer on case-insensitive
/// filesystems, where `dir/readme.txt` "exists" when only `Readme.txt` does.
/// Names are compared byte for byte.
pub fn exists_exact(dir: &Path, name: &OsStr) -> io::Result<bool> {
    let Some(entries) = read_dir_if_directory(dir)? else {
        return Ok(false);
    };
    for entry in entries {
        if entry?.file_name() == name {
            return Ok(true);
        }
    }
    Ok(false)
}

/// `read_dir`, with a missing path or a non-directory mapped to `None`.
fn read_dir_if_directory(dir: &Path) -> io::Result<Option<std::fs::ReadDir>> {
    match std::fs::read_dir(dir) {
        Ok(entries) => Ok(Some(entries)),
        Err(e) if matches!(e.kind(), io::ErrorKind::NotFound | io::ErrorKind::NotADirectory) => {
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Check whether two roots refer to the same directory.
///
/// Both are canonicalized when possible so that `Game/Data` and
/// `Game/Data/` or a symlink to it compare equal.
pub fn same_directory(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

/// Convert Windows path separators to Linux
/// `Data\Textures\armor.dds` -> `Data/Textures/armor.dds`
pub fn to_linux_path(path: &str) -> String {
    path.replace('\\', "/")
}

/// Convert a Wine Z: drive path to a Linux path.
/// `Z:\home\user\file` → `/home/user/file`
/// Passes through paths that are already Linux format.
pub fn wine_to_linux(path: &str) -> String {
    let bytes = path.as_bytes();
    if bytes.len() >= 3
        && bytes[0].eq_ignore_ascii_case(&b'z')
        && bytes[1] == b':'
        && (bytes[2] == b'\\' || bytes[2] == b'/')
    {
        to_linux_path(&path[2..])
    } else {
        to_linux_path(path)
    }
}
