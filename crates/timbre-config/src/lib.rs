//! Timbre Config - Preset persistence for the timbre FM synthesizer.
//!
//! Presets are TOML files mapping onto [`timbre_synth::Preset`]. This crate
//! owns the file format, platform preset directories, a small factory bank,
//! and the error taxonomy for everything that can go wrong on the way.
//!
//! # Example
//!
//! ```rust,no_run
//! use timbre_config::{factory, preset_file, paths};
//!
//! let preset = factory::factory_preset("Glass Keys").unwrap();
//! preset_file::save(&preset, paths::preset_path("my_keys"))?;
//!
//! let loaded = preset_file::load(paths::preset_path("my_keys"))?;
//! assert_eq!(loaded, preset);
//! # Ok::<(), timbre_config::ConfigError>(())
//! ```

pub mod error;
pub mod factory;
pub mod paths;
pub mod preset_file;

pub use error::ConfigError;
pub use factory::{FACTORY_PRESET_NAMES, all_factory_presets, factory_preset};
