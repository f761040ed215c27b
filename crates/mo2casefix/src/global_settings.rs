//! Global MO2Linux settings stored at `~/.config/MO2Linux/settings.ini`.
//!
//! Only read here: the manager owns this file. We use it to find the
//! last-used instance and the global instances directory.

use std::path::PathBuf;

use crate::config::ini::IniFile;

/// Global application settings shared with the mod manager.
#[derive(Debug, Default)]
pub struct GlobalSettings {
    ini: IniFile,
}

impl GlobalSettings {
    /// Load global settings from `~/.config/MO2Linux/settings.ini`.
    /// A missing file yields empty settings.
    pub fn load() -> anyhow::Result<Self> {
        let path = Self::config_dir().join("settings.ini");

        let ini = if path.exists() {
            IniFile::read(&path)?
        } else {
            IniFile::default()
        };

        Ok(GlobalSettings { ini })
    }

    /// Get the last-used instance path.
    pub fn last_instance(&self) -> Option<&str> {
        self.ini
            .get("General", "lastInstance")
            .filter(|p| !p.trim().is_empty())
    }

    /// Get the global instances root directory (`~/.local/share/MO2Linux/`).
    pub fn global_instances_root() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("~/.local/share"))
            .join("MO2Linux")
    }

    /// Config directory path (`~/.config/MO2Linux/`).
    fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("MO2Linux")
    }
}
