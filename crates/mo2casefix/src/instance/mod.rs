//! MO2 instance as seen by the capitalization diagnosis.
//!
//! An instance is a complete MO2 setup for a specific game, containing:
//! - ModOrganizer.ini (main config, including plugin settings)
//! - mods/ directory
//! - profiles/ directory (mod order in each profile's modlist.txt)
//! - overwrite/ directory
//!
//! Mods are re-read from disk on every query so renames and installs made
//! between calls are always visible.

use std::io;
use std::path::{Path, PathBuf};

use crate::config::modlist::ModList;
use crate::config::organizer_ini::OrganizerIni;
use crate::detect::ModTree;
use crate::diagnose::{
    Organizer, PluginSettings, PLUGIN_NAME, SETTING_AUTO_RENAME, SETTING_PREVENT_LAUNCH,
};
use crate::global_settings::GlobalSettings;
use crate::paths::{eq_ignore_case, file_name, fold_case};

/// Name of the game's data directory relative to the game root.
/// "Data" for most games, "Data Files" for Morrowind.
pub fn data_dir_name(game_name: Option<&str>) -> &'static str {
    match game_name.map(fold_case).as_deref() {
        Some("morrowind") | Some("tes iii: morrowind") | Some("openmw") => "Data Files",
        _ => "Data",
    }
}

/// An MO2 instance (one game's complete mod setup).
#[derive(Debug)]
pub struct Instance {
    /// Root directory of this instance
    pub root: PathBuf,
    /// Parsed ModOrganizer.ini
    pub config: OrganizerIni,
    /// The game's data directory
    pub data_dir: PathBuf,
}

impl Instance {
    /// Load an instance from its root directory.
    ///
    /// The data directory is `<gamePath>/Data` (`Data Files` for Morrowind)
    /// unless `data_dir` is given.
    pub fn load(root: &Path, data_dir: Option<PathBuf>) -> anyhow::Result<Self> {
        let config_path = root.join("ModOrganizer.ini");
        if !config_path.exists() {
            anyhow::bail!(
                "Not an MO2 instance: ModOrganizer.ini not found in {:?}",
                root
            );
        }

        let config = OrganizerIni::read(&config_path)?;
        let data_dir = match data_dir {
            Some(path) => path,
            None => match config.game_directory() {
                Some(game_dir) => game_dir.join(data_dir_name(config.game_name())),
                None => anyhow::bail!(
                    "No game directory configured in {:?}; pass the data directory explicitly",
                    config_path
                ),
            },
        };

        Ok(Instance {
            root: root.to_path_buf(),
            config,
            data_dir,
        })
    }

    /// Get the mods directory.
    pub fn mods_dir(&self) -> PathBuf {
        self.config
            .base_directory()
            .unwrap_or_else(|| self.root.join("mods"))
    }

    /// Get the profiles directory.
    pub fn profiles_dir(&self) -> PathBuf {
        self.config
            .profiles_directory()
            .unwrap_or_else(|| self.root.join("profiles"))
    }

    /// Directory of the active profile: the selected one if it exists,
    /// otherwise the first profile (by name) that has a modlist.txt.
    pub fn active_profile_dir(&self) -> Option<PathBuf> {
        let profiles_dir = self.profiles_dir();
        if let Some(selected) = self.config.selected_profile() {
            let p = profiles_dir.join(selected);
            if p.is_dir() {
                return Some(p);
            }
        }

        let mut names: Vec<String> = std::fs::read_dir(&profiles_dir)
            .ok()?
            .filter_map(|e| e.ok())
            .filter(|e| e.path().join("modlist.txt").is_file())
            .filter_map(|e| e.file_name().into_string().ok())
            .collect();
        names.sort();
        names.into_iter().next().map(|name| profiles_dir.join(name))
    }

    /// The active profile's mod list, or `None` if there is no profile.
    pub fn active_modlist(&self) -> io::Result<Option<ModList>> {
        let Some(profile_dir) = self.active_profile_dir() else {
            return Ok(None);
        };
        let path = profile_dir.join("modlist.txt");
        if !path.is_file() {
            return Ok(None);
        }
        ModList::read(&path).map(Some)
    }

    /// Get the overwrite directory.
    pub fn overwrite_dir(&self) -> PathBuf {
        self.config
            .overwrite_directory()
            .unwrap_or_else(|| self.root.join("overwrite"))
    }

    /// Get the game name.
    pub fn game_name(&self) -> Option<&str> {
        self.config.game_name()
    }

    /// List every mod directory followed by the overwrite directory if present.
    ///
    /// Mods are in the active profile's priority order, lowest first. Mods the
    /// profile does not mention come after those, sorted by name
    /// (case-insensitive). Without a profile the whole list is sorted by name.
    pub fn list_mods(&self) -> io::Result<Vec<ModTree>> {
        let mut mods = Vec::new();
        let mods_dir = self.mods_dir();

        if mods_dir.exists() {
            for entry in std::fs::read_dir(&mods_dir)? {
                let entry = entry?;
                if !entry.file_type()?.is_dir() {
                    continue;
                }
                let path = entry.path();
                match file_name(&path) {
                    Some(name) => mods.push(ModTree::new(name, path)),
                    None => tracing::warn!("Skipping mod with invalid name: {:?}", path),
                }
            }
        }
        mods.sort_by_key(|m| fold_case(&m.name));
        if let Some(modlist) = self.active_modlist()? {
            mods.sort_by_key(|m| modlist.priority(&m.name).unwrap_or(i32::MAX));
        }

        let overwrite_dir = self.overwrite_dir();
        if overwrite_dir.is_dir() {
            mods.push(ModTree::new("Overwrite", overwrite_dir));
        }

        Ok(mods)
    }

    /// Find a mod by name (case-insensitive).
    pub fn find_mod(&self, name: &str) -> io::Result<Option<ModTree>> {
        Ok(self
            .list_mods()?
            .into_iter()
            .find(|m| eq_ignore_case(&m.name, name)))
    }
}

impl Organizer for Instance {
    fn mods(&self) -> io::Result<Vec<ModTree>> {
        self.list_mods().inspect_err(|e| {
            tracing::warn!("Failed to list mods in {:?}: {}", self.mods_dir(), e);
        })
    }

    fn game_data_directory(&self) -> PathBuf {
        self.data_dir.clone()
    }

    fn plugin_settings(&self) -> PluginSettings {
        let defaults = PluginSettings::default();
        PluginSettings {
            prevent_launch: self
                .config
                .plugin_setting_bool(PLUGIN_NAME, SETTING_PREVENT_LAUNCH)
                .unwrap_or(defaults.prevent_launch),
            auto_rename_to_lower_case: self
                .config
                .plugin_setting_bool(PLUGIN_NAME, SETTING_AUTO_RENAME)
                .unwrap_or(defaults.auto_rename_to_lower_case),
        }
    }
}

/// Resolve an instance argument: an instance directory, or the name of a
/// global instance in `~/.local/share/MO2Linux/`. With no argument, the
/// last-used instance from the global settings.
pub fn resolve_instance_root(arg: Option<&str>) -> anyhow::Result<PathBuf> {
    let Some(arg) = arg else {
        let settings = GlobalSettings::load()?;
        return match settings.last_instance() {
            Some(last) => Ok(PathBuf::from(last)),
            None => anyhow::bail!("No instance given and no last-used instance recorded"),
        };
    };

    let direct = PathBuf::from(arg);
    if direct.join("ModOrganizer.ini").exists() {
        return Ok(direct);
    }

    let global = GlobalSettings::global_instances_root().join(arg);
    if global.join("ModOrganizer.ini").exists() {
        return Ok(global);
    }

    anyhow::bail!("No MO2 instance found at {:?} or {:?}", direct, global)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_instance(root: &Path, ini: &str) {
        std::fs::create_dir_all(root.join("mods")).unwrap();
        std::fs::create_dir_all(root.join("overwrite")).unwrap();
        std::fs::write(root.join("ModOrganizer.ini"), ini).unwrap();
    }

    fn game_ini(game_dir: &Path) -> String {
        format!(
            "[General]\r\ngameName=Skyrim Special Edition\r\ngamePath=@ByteArray({})\r\n",
            game_dir.display()
        )
    }

    #[test]
    fn test_load_requires_ini() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(Instance::load(tmp.path(), None).is_err());
    }

    #[test]
    fn test_load_requires_game_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("instance");
        create_instance(&root, "[General]\r\ngameName=Skyrim\r\n");

        assert!(Instance::load(&root, None).is_err());
        let instance = Instance::load(&root, Some(tmp.path().join("Data"))).unwrap();
        assert_eq!(instance.data_dir, tmp.path().join("Data"));
    }

    #[test]
    fn test_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("instance");
        let game = tmp.path().join("Skyrim Special Edition");
        create_instance(&root, &game_ini(&game));

        let instance = Instance::load(&root, None).unwrap();
        assert_eq!(instance.mods_dir(), root.join("mods"));
        assert_eq!(instance.overwrite_dir(), root.join("overwrite"));
        assert_eq!(instance.data_dir, game.join("Data"));

        let overridden = Instance::load(&root, Some(tmp.path().join("Elsewhere"))).unwrap();
        assert_eq!(overridden.game_data_directory(), tmp.path().join("Elsewhere"));
    }

    #[test]
    fn test_data_dir_name() {
        assert_eq!(data_dir_name(Some("Skyrim Special Edition")), "Data");
        assert_eq!(data_dir_name(Some("Morrowind")), "Data Files");
        assert_eq!(data_dir_name(None), "Data");
    }

    #[test]
    fn test_list_mods_sorted_with_overwrite_last() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("instance");
        create_instance(&root, &game_ini(&tmp.path().join("game")));
        std::fs::create_dir_all(root.join("mods/zeta")).unwrap();
        std::fs::create_dir_all(root.join("mods/Alpha")).unwrap();
        std::fs::create_dir_all(root.join("mods/beta")).unwrap();
        std::fs::write(root.join("mods/stray.txt"), "").unwrap();

        let instance = Instance::load(&root, None).unwrap();
        let names: Vec<String> = instance
            .mods()
            .unwrap()
            .into_iter()
            .map(|m| m.name)
            .collect();
        assert_eq!(names, vec!["Alpha", "beta", "zeta", "Overwrite"]);

        let found = instance.find_mod("ALPHA").unwrap().unwrap();
        assert_eq!(found.path, root.join("mods/Alpha"));
        assert!(instance.find_mod("gamma").unwrap().is_none());
    }

    #[test]
    fn test_plugin_settings() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("instance");
        let ini = format!(
            "{}[Plugins]\r\n{}\\{}=false\r\n",
            game_ini(&tmp.path().join("game")),
            PLUGIN_NAME,
            SETTING_AUTO_RENAME
        );
        create_instance(&root, &ini);

        let instance = Instance::load(&root, None).unwrap();
        let settings = instance.plugin_settings();
        assert!(settings.prevent_launch);
        assert!(!settings.auto_rename_to_lower_case);
    }

    #[test]
    fn test_resolve_instance_root_direct() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("instance");
        create_instance(&root, "");

        let arg = root.to_string_lossy().to_string();
        assert_eq!(resolve_instance_root(Some(&arg)).unwrap(), root);
        assert!(resolve_instance_root(Some("/definitely/not/an/instance")).is_err());
    }

    #[test]
    fn test_instance_end_to_end() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("instance");
        let game = tmp.path().join("game");
        create_instance(&root, &game_ini(&game));

        let data = game.join("Data");
        std::fs::create_dir_all(data.join("meshes")).unwrap();
        std::fs::write(data.join("meshes/Sword.nif"), "").unwrap();
        std::fs::create_dir_all(root.join("mods/Weapons/MESHES")).unwrap();
        std::fs::write(root.join("mods/Weapons/MESHES/Sword.nif"), "").unwrap();

        let diagnosis = crate::diagnose::CaseDiagnosis::new(Instance::load(&root, None).unwrap());
        assert!(diagnosis.has_inconsistent_paths());
        assert!(diagnosis.fix_inconsistent_paths().unwrap().is_success());
        assert!(!diagnosis.has_inconsistent_paths());
        assert!(root.join("mods/Weapons/meshes/Sword.nif").exists());
    }

    #[test]
    fn test_list_mods_follows_profile_order() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("instance");
        let ini = format!(
            "{}selected_profile=@ByteArray(Survival)\r\n",
            game_ini(&tmp.path().join("game"))
        );
        create_instance(&root, &ini);
        for name in ["Alpha", "Beta", "Gamma", "Unlisted"] {
            std::fs::create_dir_all(root.join("mods").join(name)).unwrap();
        }
        std::fs::create_dir_all(root.join("profiles/Survival")).unwrap();
        std::fs::write(
            root.join("profiles/Survival/modlist.txt"),
            "# This file was automatically generated by Mod Organizer.\r\n\
             +Beta\r\n\
             -Gamma\r\n\
             *DLC: Dawnguard\r\n\
             +Alpha\r\n",
        )
        .unwrap();

        let instance = Instance::load(&root, None).unwrap();
        assert_eq!(
            instance.active_profile_dir(),
            Some(root.join("profiles/Survival"))
        );
        let names: Vec<String> = instance
            .mods()
            .unwrap()
            .into_iter()
            .map(|m| m.name)
            .collect();
        assert_eq!(names, vec!["Alpha", "Gamma", "Beta", "Unlisted", "Overwrite"]);
    }

    #[test]
    fn test_unreadable_mods_dir_blocks_launch() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("instance");
        let game = tmp.path().join("game");
        std::fs::create_dir_all(game.join("Data")).unwrap();
        std::fs::create_dir_all(&root).unwrap();
        std::fs::write(root.join("ModOrganizer.ini"), game_ini(&game)).unwrap();
        // A file where the mods directory should be
        std::fs::write(root.join("mods"), "").unwrap();

        let instance = Instance::load(&root, None).unwrap();
        assert!(instance.mods().is_err());

        let diagnosis = crate::diagnose::CaseDiagnosis::new(instance);
        assert!(diagnosis.has_inconsistent_paths());
        assert!(!diagnosis.on_about_to_run("SkyrimSE.exe"));
    }
}
