//! Persisted defaults
//!
//! Settings are stored in a JSON file at the platform-appropriate config location:
//! - macOS: ~/Library/Application Support/jpeg-corrupt/settings.json
//! - Windows: %APPDATA%/jpeg-corrupt/settings.json
//! - Linux: ~/.config/jpeg-corrupt/settings.json
//!
//! Command line flags override whatever is loaded here.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::codec::OutputEncoding;
use crate::corrupt::{GuardMode, DEFAULT_CORRUPTION_COUNT};
use crate::error::SettingsError;

/// Input directory used when none is given
pub const DEFAULT_INPUT_DIR: &str = "Images";

/// Corruption settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorruptSettings {
    /// Directory scanned for JPEG files
    pub input_dir: PathBuf,

    /// Offsets drawn per file
    pub corruption_count: usize,

    /// Which offsets are spared
    pub guard: GuardMode,

    /// How corrupted buffers are written
    pub output: OutputEncoding,

    /// Re-encode inputs before splitting them
    pub normalize: bool,

    /// Open each output in the default viewer
    pub open_viewer: bool,
}

impl Default for CorruptSettings {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from(DEFAULT_INPUT_DIR),
            corruption_count: DEFAULT_CORRUPTION_COUNT,
            guard: GuardMode::default(),
            output: OutputEncoding::default(),
            normalize: false,
            open_viewer: false,
        }
    }
}

impl CorruptSettings {
    /// Get the path to the settings file
    pub fn settings_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut path| {
            path.push("jpeg-corrupt");
            path.push("settings.json");
            path
        })
    }

    /// Load settings from the config directory, or return defaults
    pub fn load() -> Self {
        match Self::settings_path() {
            Some(path) => Self::load_from(&path),
            None => {
                log::warn!("Could not determine config directory, using defaults");
                Self::default()
            }
        }
    }

    /// Load settings from `path`; a missing file silently yields defaults,
    /// an unreadable or invalid one yields defaults with a warning
    pub fn load_from(path: &Path) -> Self {
        match Self::read(path) {
            Ok(Some(settings)) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Ok(None) => Self::default(),
            Err(e) => {
                log::warn!("{}, using defaults", e);
                Self::default()
            }
        }
    }

    fn read(path: &Path) -> Result<Option<Self>, SettingsError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(SettingsError::Io(e)),
        };
        Ok(Some(serde_json::from_str(&contents)?))
    }

    /// Save settings to the config directory, logging any failure
    pub fn save(&self) {
        let Some(path) = Self::settings_path() else {
            log::warn!("Could not determine config directory, settings not saved");
            return;
        };
        match self.save_to(&path) {
            Ok(()) => log::info!("Saved settings to {}", path.display()),
            Err(e) => log::warn!("{}", e),
        }
    }

    /// Write settings as pretty JSON to `path`, creating its parent directory
    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = CorruptSettings::default();
        assert_eq!(settings.input_dir, PathBuf::from("Images"));
        assert_eq!(settings.corruption_count, 400);
        assert_eq!(settings.guard, GuardMode::Literal);
        assert_eq!(settings.output, OutputEncoding::Raw);
        assert!(!settings.normalize);
        assert!(!settings.open_viewer);
    }

    #[test]
    fn test_serialize_deserialize() {
        let settings = CorruptSettings {
            corruption_count: 12,
            guard: GuardMode::PairAware,
            output: OutputEncoding::Bitmap,
            ..Default::default()
        };

        let json = serde_json::to_string(&settings).unwrap();
        assert!(json.contains("\"pair-aware\""));
        let loaded: CorruptSettings = serde_json::from_str(&json).unwrap();

        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let loaded: CorruptSettings = serde_json::from_str(r#"{"corruption_count": 9}"#).unwrap();
        assert_eq!(loaded.corruption_count, 9);
        assert_eq!(loaded.guard, GuardMode::Literal);
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");

        let settings = CorruptSettings {
            normalize: true,
            ..Default::default()
        };
        settings.save_to(&path).unwrap();

        assert_eq!(CorruptSettings::load_from(&path), settings);
    }

    #[test]
    fn test_load_invalid_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "not json").unwrap();

        assert_eq!(CorruptSettings::load_from(&path), CorruptSettings::default());
        assert_eq!(
            CorruptSettings::load_from(&dir.path().join("missing.json")),
            CorruptSettings::default()
        );
    }

    #[test]
    fn test_read_distinguishes_missing_from_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        assert!(matches!(CorruptSettings::read(&path), Ok(None)));

        std::fs::write(&path, "{").unwrap();
        assert!(matches!(
            CorruptSettings::read(&path),
            Err(SettingsError::Json(_))
        ));
    }
}
