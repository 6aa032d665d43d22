//! Platform-specific paths for presets and configuration.
//!
//! # Directory Structure
//!
//! - **User presets**: `~/.config/timbre/presets/` (Linux),
//!   `~/Library/Application Support/timbre/presets/` (macOS),
//!   `%APPDATA%\timbre\presets\` (Windows)
//! - **User config**: the same tree one level up

use std::path::PathBuf;

/// Application name used for directory paths.
const APP_NAME: &str = "timbre";

/// Subdirectory name for presets.
const PRESETS_SUBDIR: &str = "presets";

/// Returns the user-specific presets directory.
///
/// Falls back to the current directory if the platform config directory
/// cannot be determined.
pub fn user_presets_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
        .join(PRESETS_SUBDIR)
}

/// Returns the user-specific configuration directory.
pub fn user_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Returns the path a preset with `name` would be stored at.
pub fn preset_path(name: &str) -> PathBuf {
    user_presets_dir().join(format!("{name}.toml"))
}

/// Lists the names of presets present in a directory, sorted.
pub fn list_presets(dir: impl AsRef<std::path::Path>) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .into_iter()
        .flatten()
        .flatten()
        .filter_map(|entry| {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "toml") {
                path.file_stem().map(|s| s.to_string_lossy().into_owned())
            } else {
                None
            }
        })
        .collect();
    names.sort();
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preset_path_ends_with_toml() {
        let path = preset_path("warm_pad");
        assert!(path.to_string_lossy().ends_with("warm_pad.toml"));
        assert!(path.starts_with(user_presets_dir()));
    }

    #[test]
    fn user_dirs_nest_under_app_name() {
        assert!(user_presets_dir().starts_with(user_config_dir()));
    }

    #[test]
    fn list_presets_on_missing_dir_is_empty() {
        assert!(list_presets("/definitely/not/a/real/dir").is_empty());
    }
}
