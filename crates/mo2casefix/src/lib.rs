//! Detection and repair of inconsistent path capitalization in MO2 mods.
//!
//! Mods written for Windows freely mix `Textures/` and `textures/`. Once
//! their files are layered over the game's data directory on a case-sensitive
//! filesystem, such paths no longer merge. [`detect`] finds them and
//! [`normalize`] renames mod entries to lower case, or to the game's own
//! casing where the game already has the path.

pub mod config;
pub mod detect;
pub mod diagnose;
pub mod error;
pub mod global_settings;
pub mod instance;
pub mod normalize;
pub mod paths;

pub use detect::{first_inconsistency, has_inconsistent_paths, Inconsistency, ModTree};
pub use diagnose::{CaseDiagnosis, Organizer, PluginSettings, PROBLEM_INCONSISTENT_CAPITALIZATION};
pub use error::{DiagnoseError, NormalizeError};
pub use instance::Instance;
pub use normalize::{fix_inconsistent_paths, normalize_tree, rename_next, FixSummary};
