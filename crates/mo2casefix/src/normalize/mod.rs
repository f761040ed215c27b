//! Capitalization repair for mod directories.
//!
//! Each entry in a mod is renamed to lower case, unless the game's data
//! directory already has the same relative path under a different casing, in
//! which case the mod entry takes the game's casing instead. The game data
//! directory itself is never modified.
//!
//! Renaming a directory invalidates every path below it, so only one rename is
//! done per walk of the tree. The walk is restarted until a full pass finds
//! nothing left to rename.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::detect::ModTree;
use crate::error::NormalizeError;
use crate::paths::{
    exists_exact, file_name, find_name_case_insensitive, same_directory,
    with_lower_case_file_name,
};

/// What should happen to one entry of a mod tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenameDecision {
    /// Casing is already correct.
    Keep,
    /// No counterpart in game data; rename to the lower-cased name.
    LowerCase(PathBuf),
    /// Game data has this path with different casing; rename to match it.
    MatchGameData(PathBuf),
}

impl RenameDecision {
    fn target(&self) -> Option<&Path> {
        match self {
            RenameDecision::Keep => None,
            RenameDecision::LowerCase(to) | RenameDecision::MatchGameData(to) => Some(to),
        }
    }
}

/// Decide how the entry at `path` (inside `mod_root`) should be named.
///
/// Entries whose names are not valid UTF-8 are kept as they are; entries
/// below them are still decided on their own names.
pub fn decide(
    path: &Path,
    mod_root: &Path,
    data_dir: &Path,
) -> Result<RenameDecision, NormalizeError> {
    let relative = match path.strip_prefix(mod_root) {
        Ok(relative) if !relative.as_os_str().is_empty() => relative,
        _ => return Ok(RenameDecision::Keep),
    };
    let Some(current_name) = file_name(path) else {
        tracing::warn!("Skipping {:?}: name is not valid UTF-8", path);
        return Ok(RenameDecision::Keep);
    };
    let game_path = data_dir.join(relative);

    let game_name = match find_name_case_insensitive(&game_path) {
        Ok(name) => name,
        Err(source) => {
            return Err(NormalizeError::Lookup {
                path: game_path,
                source: Some(source),
            })
        }
    };

    match game_name {
        // Not in game data under any casing: lower case it
        None => match with_lower_case_file_name(path) {
            Some(lower) if lower != path => Ok(RenameDecision::LowerCase(lower)),
            _ => Ok(RenameDecision::Keep),
        },
        Some(game_name) if game_name.is_empty() => Err(NormalizeError::Lookup {
            path: game_path,
            source: None,
        }),
        // Follow the game's casing
        Some(game_name) if game_name != current_name => {
            Ok(RenameDecision::MatchGameData(path.with_file_name(game_name)))
        }
        Some(_) => Ok(RenameDecision::Keep),
    }
}

/// Rename `from` to `to`, refusing to replace an existing entry.
///
/// `std::fs::rename` silently replaces files on Linux, which would destroy
/// one of two files that differ only in case (`Readme.txt` and `readme.txt`).
fn rename_entry(from: &Path, to: &Path) -> Result<(), NormalizeError> {
    let rename_error = |source: io::Error| NormalizeError::Rename {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    };

    if let (Some(dir), Some(name)) = (to.parent(), to.file_name()) {
        if exists_exact(dir, name).map_err(rename_error)? {
            return Err(rename_error(io::Error::new(
                io::ErrorKind::AlreadyExists,
                "destination already exists",
            )));
        }
    }

    std::fs::rename(from, to).map_err(rename_error)
}

/// Rename the next entry in `mod_root` that needs renaming.
///
/// Returns `Ok(true)` after exactly one rename, `Ok(false)` if a full walk
/// found nothing to rename.
pub fn rename_next(mod_root: &Path, data_dir: &Path) -> Result<bool, NormalizeError> {
    for entry in walkdir::WalkDir::new(mod_root)
        .min_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        let decision = decide(path, mod_root, data_dir)?;
        let Some(to) = decision.target() else {
            continue;
        };

        rename_entry(path, to)?;
        tracing::debug!("Renamed {} to {}", path.display(), to.display());
        return Ok(true);
    }
    Ok(false)
}

/// Normalize capitalization of every entry in `mod_root`.
///
/// Returns the number of renames performed. A mod located at the game data
/// directory (DLC) is left untouched. Errors are logged here and returned;
/// entries renamed before the failure stay renamed.
pub fn normalize_tree(mod_root: &Path, data_dir: &Path) -> Result<usize, NormalizeError> {
    if same_directory(mod_root, data_dir) {
        tracing::debug!(
            "Skipping {}: located inside the game data directory",
            mod_root.display()
        );
        return Ok(0);
    }

    let started = Instant::now();
    let mut renamed = 0;
    loop {
        match rename_next(mod_root, data_dir) {
            Ok(true) => renamed += 1,
            Ok(false) => break,
            Err(e) => {
                match &e {
                    NormalizeError::Rename { .. } => tracing::error!("{e}"),
                    NormalizeError::Lookup { .. } => tracing::warn!("{e}"),
                }
                return Err(e);
            }
        }
    }

    tracing::debug!(
        "normalize_tree({}) took {:?}, {} renamed",
        mod_root.display(),
        started.elapsed(),
        renamed
    );
    Ok(renamed)
}

/// Result of normalizing every mod.
#[derive(Debug, Default)]
pub struct FixSummary {
    /// Total number of renamed entries
    pub renamed: usize,
    /// Mods whose normalization was aborted, with the reason
    pub failed: Vec<(String, NormalizeError)>,
}

impl FixSummary {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Normalize every mod, in order. A failing mod does not stop the others.
pub fn fix_inconsistent_paths(mods: &[ModTree], data_dir: &Path) -> FixSummary {
    let mut summary = FixSummary::default();
    for m in mods {
        match normalize_tree(&m.path, data_dir) {
            Ok(n) => summary.renamed += n,
            Err(e) => summary.failed.push((m.name.clone(), e)),
        }
    }
    tracing::info!(
        "Renamed {} path(s) across {} mod(s), {} failed",
        summary.renamed,
        mods.len(),
        summary.failed.len()
    );
    summary
}
