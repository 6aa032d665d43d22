//! TOML persistence for [`Preset`].
//!
//! The value types live in `timbre-synth` (behind its `serde` feature);
//! this module owns reading and writing them as files.
//!
//! # TOML Format
//!
//! ```toml
//! name = "Glass Keys"
//! algorithm = "dual_serial"
//! master_volume = 0.8
//!
//! [[operators]]
//! ratio = 1.0
//! level = 80.0
//! attack = 0.005
//! decay = 0.3
//! sustain = 0.5
//! release = 0.6
//! feedback = 0.0
//!
//! [[lfos]]
//! waveform = "triangle"
//! rate = { synced = "eighth" }
//! depth = 0.6
//! phase_degrees = 90.0
//! destination = "filter_cutoff"
//! amount = 0.5
//! ```

use std::path::Path;

use timbre_synth::Preset;

use crate::error::ConfigError;

/// Loads a preset from a TOML file.
///
/// Loaded values are clamped to their valid ranges rather than rejected, so
/// a preset hand-edited out of range still loads.
pub fn load(path: impl AsRef<Path>) -> Result<Preset, ConfigError> {
    let path = path.as_ref();
    let content =
        std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
    from_toml(&content)
}

/// Parses a preset from a TOML string.
pub fn from_toml(toml_str: &str) -> Result<Preset, ConfigError> {
    let preset: Preset = toml::from_str(toml_str)?;
    Ok(preset.clamped())
}

/// Saves a preset to a TOML file, creating parent directories as needed.
pub fn save(preset: &Preset, path: impl AsRef<Path>) -> Result<(), ConfigError> {
    let path = path.as_ref();

    if let Some(parent) = path.parent()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
    }

    let content = to_toml(preset)?;
    std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
    Ok(())
}

/// Serializes a preset to a TOML string.
pub fn to_toml(preset: &Preset) -> Result<String, ConfigError> {
    Ok(toml::to_string_pretty(preset)?)
}

/// Loads a preset by name from a directory, appending the `.toml` extension.
pub fn load_named(dir: impl AsRef<Path>, name: &str) -> Result<Preset, ConfigError> {
    let path = dir.as_ref().join(format!("{name}.toml"));
    if !path.exists() {
        return Err(ConfigError::PresetNotFound(name.into()));
    }
    load(path)
}
