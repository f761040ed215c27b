//! Diagnosis of capitalization problems, as offered to the mod manager.
//!
//! The manager asks which problems are active, shows their descriptions and
//! may run the guided fix. It also calls two hooks at lifecycle points:
//! - [`CaseDiagnosis::on_mod_installed`] after a mod has been installed
//! - [`CaseDiagnosis::on_about_to_run`] before launching an executable
//!
//! Both are plain synchronous calls that block on filesystem I/O.

use std::io;
use std::path::PathBuf;

use serde::Serialize;

use crate::detect::{has_inconsistent_paths, ModTree};
use crate::error::{DiagnoseError, NormalizeError};
use crate::normalize::{fix_inconsistent_paths, normalize_tree, FixSummary};

/// The only problem this diagnosis reports.
pub const PROBLEM_INCONSISTENT_CAPITALIZATION: u32 = 1;

pub const PLUGIN_NAME: &str = "Diagnosis plugin for case sensitive filesystems";
pub const PLUGIN_DESCRIPTION: &str = "Diagnostic plugin for case-sensitive file systems.";

pub const SETTING_PREVENT_LAUNCH: &str = "prevent_launch";
pub const SETTING_AUTO_RENAME: &str = "auto_rename_to_lower_case";

/// What the diagnosis needs from the mod manager.
pub trait Organizer {
    /// Every mod, in the manager's order.
    fn mods(&self) -> io::Result<Vec<ModTree>>;

    /// The game's data directory. Never modified.
    fn game_data_directory(&self) -> PathBuf;

    /// Current values of the plugin settings.
    fn plugin_settings(&self) -> PluginSettings;
}

/// User-configurable behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PluginSettings {
    /// Block application launch while problems are unresolved
    pub prevent_launch: bool,
    /// Normalize newly installed mods automatically
    pub auto_rename_to_lower_case: bool,
}

impl PluginSettings {
    /// Value of the setting named `key`, if there is one.
    pub fn value(&self, key: &str) -> Option<bool> {
        match key {
            SETTING_PREVENT_LAUNCH => Some(self.prevent_launch),
            SETTING_AUTO_RENAME => Some(self.auto_rename_to_lower_case),
            _ => None,
        }
    }
}

impl Default for PluginSettings {
    fn default() -> Self {
        PluginSettings {
            prevent_launch: true,
            auto_rename_to_lower_case: true,
        }
    }
}

/// Description of one plugin setting for the manager's settings UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PluginSetting {
    pub key: &'static str,
    pub description: &'static str,
    pub default_value: bool,
}

/// Capitalization diagnosis bound to a mod manager.
pub struct CaseDiagnosis<O> {
    organizer: O,
}

impl<O: Organizer> CaseDiagnosis<O> {
    pub fn new(organizer: O) -> Self {
        CaseDiagnosis { organizer }
    }

    pub fn organizer(&self) -> &O {
        &self.organizer
    }

    pub fn name(&self) -> &'static str {
        PLUGIN_NAME
    }

    pub fn description(&self) -> &'static str {
        PLUGIN_DESCRIPTION
    }

    pub fn version(&self) -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    pub fn settings(&self) -> Vec<PluginSetting> {
        let defaults = PluginSettings::default();
        vec![
            PluginSetting {
                key: SETTING_PREVENT_LAUNCH,
                description: "Prevent application launch if any issues have been found",
                default_value: defaults.prevent_launch,
            },
            PluginSetting {
                key: SETTING_AUTO_RENAME,
                description: "Automatically rename paths to lower case on mod installation \
                              (excluding paths that exist inside game directory)",
                default_value: defaults.auto_rename_to_lower_case,
            },
        ]
    }

    /// Check mods and game data for paths differing only in capitalization.
    ///
    /// A mod list that cannot be read counts as a problem, so the launch gate
    /// stays closed until the mods can be checked.
    pub fn has_inconsistent_paths(&self) -> bool {
        match self.organizer.mods() {
            Ok(mods) => has_inconsistent_paths(&mods, &self.organizer.game_data_directory()),
            Err(e) => {
                tracing::warn!("Failed to list mods: {e}");
                true
            }
        }
    }

    pub fn active_problems(&self) -> Vec<u32> {
        let mut result = Vec::new();
        if self.has_inconsistent_paths() {
            result.push(PROBLEM_INCONSISTENT_CAPITALIZATION);
        }
        result
    }

    pub fn short_description(&self, key: u32) -> Result<&'static str, DiagnoseError> {
        match key {
            PROBLEM_INCONSISTENT_CAPITALIZATION => Ok("Mods contain inconsistent paths"),
            _ => Err(DiagnoseError::InvalidProblemKey(key)),
        }
    }

    pub fn full_description(&self, key: u32) -> Result<&'static str, DiagnoseError> {
        match key {
            PROBLEM_INCONSISTENT_CAPITALIZATION => Ok(
                "The installed mods use different capitalization for file paths that are \
                 otherwise identical. This will most likely cause issues on case \
                 sensitive file systems.",
            ),
            _ => Err(DiagnoseError::InvalidProblemKey(key)),
        }
    }

    pub fn has_guided_fix(&self, key: u32) -> Result<bool, DiagnoseError> {
        match key {
            PROBLEM_INCONSISTENT_CAPITALIZATION => Ok(true),
            _ => Err(DiagnoseError::InvalidProblemKey(key)),
        }
    }

    /// Run the fix for `key`: normalize every mod against game data.
    pub fn start_guided_fix(&self, key: u32) -> Result<FixSummary, DiagnoseError> {
        match key {
            PROBLEM_INCONSISTENT_CAPITALIZATION => self.fix_inconsistent_paths(),
            _ => Err(DiagnoseError::InvalidProblemKey(key)),
        }
    }

    pub fn fix_inconsistent_paths(&self) -> Result<FixSummary, DiagnoseError> {
        let mods = self.organizer.mods().map_err(DiagnoseError::ModList)?;
        Ok(fix_inconsistent_paths(&mods, &self.organizer.game_data_directory()))
    }

    /// Normalize a single mod, excluding paths that exist in game data.
    pub fn rename_mod_paths(&self, mod_tree: &ModTree) -> Result<usize, NormalizeError> {
        tracing::info!("Normalizing capitalization of '{}'", mod_tree.name);
        normalize_tree(&mod_tree.path, &self.organizer.game_data_directory())
    }

    /// Hook for a newly installed mod.
    ///
    /// Returns `None` when automatic renaming is disabled.
    pub fn on_mod_installed(
        &self,
        mod_tree: &ModTree,
    ) -> Option<Result<usize, NormalizeError>> {
        if !self.organizer.plugin_settings().auto_rename_to_lower_case {
            return None;
        }
        Some(self.rename_mod_paths(mod_tree))
    }

    /// Hook run before launching `executable`. Returns `false` to block the launch.
    pub fn on_about_to_run(&self, executable: &str) -> bool {
        if self.organizer.plugin_settings().prevent_launch && self.has_inconsistent_paths() {
            tracing::info!(
                "{} aborted application launch because there are unresolved issues. \
                 You can disable this behaviour in plugin settings.",
                self.name()
            );
            tracing::debug!("Blocked launch of {executable}");
            return false;
        }
        true
    }
}
