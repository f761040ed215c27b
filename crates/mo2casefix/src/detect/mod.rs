//! Inconsistent capitalization detection across mods and game data.
//!
//! Every file and directory in every mod, followed by the game's data
//! directory, is indexed by its case-folded relative path. The first time two
//! entries fold to the same key but differ in casing, the layout is reported
//! as inconsistent: a case-sensitive filesystem would treat them as two
//! different files where the game expects one.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::paths::{fold_case, relative_path};

/// A mod directory participating in the virtual filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModTree {
    /// Mod name as shown in the mod list
    pub name: String,
    /// Absolute path to the mod directory
    pub path: PathBuf,
}

impl ModTree {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        ModTree {
            name: name.into(),
            path: path.into(),
        }
    }
}

/// Two relative paths that fold to the same key but differ in casing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inconsistency {
    /// The casing recorded first for this key
    pub first_seen: String,
    /// The differing casing that triggered the report
    pub conflicting: String,
    /// Root of the tree `conflicting` was found in
    pub root: PathBuf,
}

/// Outcome of recording a relative path in a [`CaseFoldIndex`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexOutcome {
    /// First entry for this folded key
    Inserted,
    /// Key already present with identical casing
    Matched,
    /// Key already present with different casing; holds the first-seen casing
    Collision(String),
}

/// Case-folded relative path -> first-seen original casing.
#[derive(Debug, Default)]
pub struct CaseFoldIndex {
    entries: HashMap<String, String>,
}

impl CaseFoldIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `relative`. The first-seen casing is never replaced.
    pub fn record(&mut self, relative: &str) -> IndexOutcome {
        let folded = fold_case(relative);
        match self.entries.get(&folded) {
            Some(existing) if existing == relative => IndexOutcome::Matched,
            Some(existing) => IndexOutcome::Collision(existing.clone()),
            None => {
                self.entries.insert(folded, relative.to_string());
                IndexOutcome::Inserted
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Walk every entry below `root` into the index, stopping at the first collision.
    ///
    /// A missing or unreadable root contributes nothing. Entries whose names
    /// are not valid UTF-8 are skipped along with everything below them.
    pub fn scan_tree(&mut self, root: &Path) -> Option<Inconsistency> {
        let mut walker = walkdir::WalkDir::new(root).min_depth(1).into_iter();
        while let Some(entry) = walker.next() {
            let Ok(entry) = entry else {
                continue;
            };
            let Some(relative) = relative_path(root, entry.path()) else {
                tracing::warn!("Skipping {:?}: name is not valid UTF-8", entry.path());
                if entry.file_type().is_dir() {
                    walker.skip_current_dir();
                }
                continue;
            };

            if let IndexOutcome::Collision(first_seen) = self.record(&relative) {
                return Some(Inconsistency {
                    first_seen,
                    conflicting: relative,
                    root: root.to_path_buf(),
                });
            }
        }
        None
    }
}

/// Find the first pair of paths that differ only in capitalization.
///
/// Mods are scanned in the given order, then `data_dir`, all into one index,
/// so a mod path that disagrees with the game's own casing is found as well.
/// Which pair is reported depends on scan order.
pub fn first_inconsistency(mods: &[ModTree], data_dir: &Path) -> Option<Inconsistency> {
    let started = Instant::now();
    let mut index = CaseFoldIndex::new();

    let found = mods
        .iter()
        .map(|m| m.path.as_path())
        .chain(std::iter::once(data_dir))
        .find_map(|root| index.scan_tree(root));

    tracing::debug!(
        "first_inconsistency() took {:?} ({} paths indexed)",
        started.elapsed(),
        index.len()
    );
    found
}

/// Check whether any mod or game data paths are inconsistently capitalized.
pub fn has_inconsistent_paths(mods: &[ModTree], data_dir: &Path) -> bool {
    first_inconsistency(mods, data_dir).is_some()
}
