//! Reader for `ModOrganizer.ini` - the main MO2 configuration file.
//!
//! Key sections:
//! - `[General]` - gameName, gamePath, selected_profile
//! - `[Settings]` - base_directory, overwrite_directory, profiles_directory
//! - `[Plugins]` - per-plugin settings as `<plugin name>\<key>=<value>`
//!
//! This wraps the generic IniFile with typed accessors for known fields.

use std::path::{Path, PathBuf};

use super::ini::IniFile;
use crate::paths::wine_to_linux;

/// Parsed ModOrganizer.ini
#[derive(Debug, Clone)]
pub struct OrganizerIni {
    pub ini: IniFile,
}

impl OrganizerIni {
    /// Decode a path value, which may be `@ByteArray(...)`-wrapped, use
    /// QSettings-escaped backslashes, or point into Wine's `Z:` drive.
    fn decode_qsettings_path(raw: &str) -> PathBuf {
        let unescaped = Self::strip_byte_array(raw).replace("\\\\", "\\");
        PathBuf::from(wine_to_linux(&unescaped))
    }

    /// Strip a QSettings `@ByteArray(...)` wrapper, if present.
    fn strip_byte_array(raw: &str) -> &str {
        raw.strip_prefix("@ByteArray(")
            .and_then(|s| s.strip_suffix(')'))
            .unwrap_or(raw)
    }

    /// Parse from string content.
    pub fn parse(content: &str) -> Self {
        OrganizerIni {
            ini: IniFile::parse(content),
        }
    }

    /// Read from file.
    pub fn read(path: &Path) -> anyhow::Result<Self> {
        let ini = IniFile::read(path)?;
        Ok(OrganizerIni { ini })
    }

    // --- General section ---

    pub fn game_name(&self) -> Option<&str> {
        self.ini.get("General", "gameName")
    }

    /// Name of the active profile.
    pub fn selected_profile(&self) -> Option<&str> {
        self.ini
            .get("General", "selected_profile")
            .map(Self::strip_byte_array)
    }

    /// Game directory path. May use QSettings `@ByteArray(...)` encoding or plain path.
    pub fn game_directory(&self) -> Option<PathBuf> {
        self.ini
            .get("General", "gamePath")
            .map(Self::decode_qsettings_path)
    }

    // --- Settings section ---

    /// Base directory for mod storage. Defaults to `<instance>/mods`.
    pub fn base_directory(&self) -> Option<PathBuf> {
        self.ini
            .get("Settings", "base_directory")
            .map(Self::decode_qsettings_path)
    }

    /// Profiles directory. Defaults to `<instance>/profiles`.
    pub fn profiles_directory(&self) -> Option<PathBuf> {
        self.ini
            .get("Settings", "profiles_directory")
            .map(Self::decode_qsettings_path)
    }

    /// Overwrite directory. Defaults to `<instance>/overwrite`.
    pub fn overwrite_directory(&self) -> Option<PathBuf> {
        self.ini
            .get("Settings", "overwrite_directory")
            .map(Self::decode_qsettings_path)
    }

    // --- Plugins section ---

    /// A boolean plugin setting, or `None` if unset or unparseable.
    pub fn plugin_setting_bool(&self, plugin: &str, key: &str) -> Option<bool> {
        self.ini.get_bool("Plugins", &format!("{plugin}\\{key}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
[General]\r\n\
gameName=Skyrim Special Edition\r\n\
selected_profile=Default\r\n\
gamePath=@ByteArray(/home/user/.steam/steam/steamapps/common/Skyrim Special Edition)\r\n\
\r\n\
[Settings]\r\n\
base_directory=@ByteArray(/home/user/MO2/mods)\r\n\
\r\n\
[Plugins]\r\n\
Diagnosis plugin for case sensitive filesystems\\prevent_launch=false\r\n";

    #[test]
    fn test_parse() {
        let ini = OrganizerIni::parse(SAMPLE);
        assert_eq!(ini.game_name(), Some("Skyrim Special Edition"));
        assert_eq!(ini.selected_profile(), Some("Default"));
    }

    #[test]
    fn test_selected_profile_byte_array() {
        let ini = OrganizerIni::parse("[General]\nselected_profile=@ByteArray(My Profile)\n");
        assert_eq!(ini.selected_profile(), Some("My Profile"));
    }

    #[test]
    fn test_game_directory() {
        let ini = OrganizerIni::parse(SAMPLE);
        assert_eq!(
            ini.game_directory(),
            Some(PathBuf::from(
                "/home/user/.steam/steam/steamapps/common/Skyrim Special Edition"
            ))
        );
    }

    #[test]
    fn test_game_directory_backslashes_normalized() {
        let ini = OrganizerIni::parse(
            "[General]\n\
             gameName=Skyrim Special Edition\n\
             gamePath=@ByteArray(\\\\home\\\\user\\\\Games\\\\Skyrim\\\\Stock Game)\n",
        );
        assert_eq!(
            ini.game_directory(),
            Some(PathBuf::from("/home/user/Games/Skyrim/Stock Game"))
        );
    }

    #[test]
    fn test_game_directory_wine_drive() {
        let ini = OrganizerIni::parse(
            "[General]\n\
             gamePath=@ByteArray(Z:\\\\games\\\\Morrowind)\n",
        );
        assert_eq!(ini.game_directory(), Some(PathBuf::from("/games/Morrowind")));
    }

    #[test]
    fn test_directories() {
        let ini = OrganizerIni::parse(SAMPLE);
        assert_eq!(
            ini.base_directory(),
            Some(PathBuf::from("/home/user/MO2/mods"))
        );
        assert_eq!(ini.overwrite_directory(), None);
        assert_eq!(ini.profiles_directory(), None);
    }

    #[test]
    fn test_plugin_setting() {
        let ini = OrganizerIni::parse(SAMPLE);
        let plugin = "Diagnosis plugin for case sensitive filesystems";
        assert_eq!(ini.plugin_setting_bool(plugin, "prevent_launch"), Some(false));
        assert_eq!(
            ini.plugin_setting_bool(plugin, "auto_rename_to_lower_case"),
            None
        );
    }
}
