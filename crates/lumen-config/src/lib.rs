//! Configuration and preset management for lumen voices.
//!
//! # Features
//!
//! - **Presets**: Load and save voice presets as TOML
//! - **Validation**: Range-check every voice parameter, reporting all problems
//! - **Paths**: Platform-specific preset and config directories
//! - **Factory Presets**: Built-in presets for common voice characters
//!
//! # Example
//!
//! ```rust
//! use lumen_config::{Preset, get_factory_preset};
//! use lumen_core::render_offline;
//!
//! let preset = get_factory_preset("saw-lead").unwrap();
//! let ctx = preset.context().unwrap();
//! let mut voice = preset.create_voice(&ctx).unwrap();
//! voice.trigger_attack_release("A3".parse::<lumen_synth::Note>().unwrap(), 0.2, None, None).unwrap();
//! let audio = render_offline(&ctx, &mut voice, 0.5);
//! assert!(audio.iter().any(|&s| s != 0.0));
//!
//! let toml = preset.to_toml().unwrap();
//! assert_eq!(Preset::from_toml(&toml).unwrap(), preset);
//! ```

mod error;
mod preset;

/// Platform-specific paths for presets and configuration.
pub mod paths;

/// Preset validation.
pub mod validation;

/// Factory presets bundled with the library.
pub mod factory_presets;

pub use error::ConfigError;
pub use factory_presets::{
    FACTORY_PRESET_NAMES, factory_preset_names, factory_presets, get_factory_preset,
    is_factory_preset,
};
pub use paths::{
    ensure_user_config_dir, ensure_user_presets_dir, find_preset, list_all_presets,
    list_system_presets, list_user_presets, load_preset, preset_name_from_path,
    system_presets_dir, user_config_dir, user_presets_dir,
};
pub use preset::Preset;
pub use validation::{
    ParamRange, SAMPLE_RATE_RANGE, VOICE_PARAMS, ValidationError, ValidationResult, param_range,
    validate_preset, validate_voice_options,
};
