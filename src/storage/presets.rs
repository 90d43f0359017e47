//! Preset storage and persistence.
//!
//! Handles saving and loading named fan presets to/from disk.
//! Cross-platform: uses appropriate config directories for each OS.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::config::FanPreset;
use crate::error::{EkLoopError, Result};
use crate::protocol::NUM_FANS;

// =============================================================================
// Config Path
// =============================================================================

const APP_NAME: &str = "ek-loop-connect";
const PRESET_FILE: &str = "presets.json";

/// Get the configuration directory path.
/// - Linux: ~/.config/ek-loop-connect/
/// - Windows: %APPDATA%\ek-loop-connect\
pub fn get_config_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|p| p.join(APP_NAME))
        .ok_or_else(|| EkLoopError::InvalidPreset("Could not find config directory".into()))
}

/// Get the full path to the preset file.
pub fn get_preset_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join(PRESET_FILE))
}

// =============================================================================
// Storage Structures
// =============================================================================

/// On-disk preset collection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PresetFile {
    /// Stored presets by name.
    #[serde(default)]
    pub presets: HashMap<String, StoredPreset>,
    /// Name of the most recently applied preset.
    #[serde(default)]
    pub active_preset: Option<String>,
}

/// Stored per-channel duty targets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredPreset {
    /// Duty percentage per fan channel, F1 first.
    pub duties: [u8; NUM_FANS],
}

impl StoredPreset {
    /// Convert to an applicable preset.
    pub fn to_preset(&self) -> FanPreset {
        FanPreset::Custom(self.duties)
    }
}

// =============================================================================
// Storage Functions
// =============================================================================

/// Load the preset file from disk.
pub fn load_presets() -> Result<PresetFile> {
    let path = get_preset_path()?;

    if !path.exists() {
        return Ok(PresetFile::default());
    }

    let content = std::fs::read_to_string(&path)
        .map_err(|e| EkLoopError::InvalidPreset(format!("Failed to read presets: {}", e)))?;

    serde_json::from_str(&content)
        .map_err(|e| EkLoopError::InvalidPreset(format!("Failed to parse presets: {}", e)))
}

/// Save the preset file to disk.
pub fn save_presets(file: &PresetFile) -> Result<()> {
    let dir = get_config_dir()?;
    let path = dir.join(PRESET_FILE);

    std::fs::create_dir_all(&dir)
        .map_err(|e| EkLoopError::InvalidPreset(format!("Failed to create config dir: {}", e)))?;

    let content = serde_json::to_string_pretty(file)
        .map_err(|e| EkLoopError::InvalidPreset(format!("Failed to serialize presets: {}", e)))?;

    std::fs::write(&path, content)
        .map_err(|e| EkLoopError::InvalidPreset(format!("Failed to write presets: {}", e)))?;

    Ok(())
}

/// Get a stored preset by name.
pub fn get_preset(name: &str) -> Result<FanPreset> {
    let file = load_presets()?;
    file.presets
        .get(&name.to_lowercase())
        .map(StoredPreset::to_preset)
        .ok_or_else(|| EkLoopError::InvalidPreset(format!("Preset '{}' not found", name)))
}

/// Store per-channel duties under a name.
pub fn store_preset(name: &str, duties: [u8; NUM_FANS]) -> Result<()> {
    let mut file = load_presets()?;
    file.presets
        .insert(name.to_lowercase(), StoredPreset { duties });
    save_presets(&file)
}
