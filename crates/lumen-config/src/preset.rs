//! Preset file format and operations.

use serde::{Deserialize, Serialize};
use std::path::Path;

use lumen_core::AudioContext;
use lumen_synth::{Voice, VoiceOptions};

use crate::error::ConfigError;

/// A named voice configuration.
///
/// Presets are stored as TOML files holding a [`VoiceOptions`] table. Any
/// field left out takes its default, so a preset only needs to name what
/// it changes.
///
/// # TOML Format
///
/// ```toml
/// name = "Saw Lead"
/// description = "Bright gliding lead"
/// sample_rate = 48000
///
/// [voice]
/// portamento = 0.05
/// volume = -6.0
///
/// [voice.oscillator]
/// type = "sawtooth"
///
/// [voice.envelope]
/// attack = 0.01
/// release = 0.3
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Preset {
    /// Name of the preset.
    pub name: String,

    /// Optional description of the preset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Sample rate hint (defaults to 48000).
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// Voice options.
    #[serde(default)]
    pub voice: VoiceOptions,
}

fn default_sample_rate() -> u32 {
    48000
}

impl Preset {
    /// Create a preset with default voice options.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            sample_rate: default_sample_rate(),
            voice: VoiceOptions::default(),
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the sample rate hint.
    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    /// Replace the voice options.
    pub fn with_voice(mut self, voice: VoiceOptions) -> Self {
        self.voice = voice;
        self
    }

    /// Load a preset from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml(&content)
    }

    /// Load a preset from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Save the preset to a TOML file, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Convert the preset to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Create an audio context at the preset's sample rate.
    pub fn context(&self) -> Result<AudioContext, ConfigError> {
        Ok(AudioContext::new(self.sample_rate as f32)?)
    }

    /// Validate the preset and build its voice on `context`.
    ///
    /// The context's own sample rate is used; the preset's rate is only a
    /// hint for [`context`](Self::context).
    pub fn create_voice(&self, context: &AudioContext) -> Result<Voice, ConfigError> {
        crate::validation::validate_preset(self)?;
        Ok(Voice::new(context, self.voice.clone())?)
    }
}

impl Default for Preset {
    fn default() -> Self {
        Self::new("Untitled")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_synth::OscillatorType;

    #[test]
    fn new_uses_default_voice() {
        let preset = Preset::new("Test Preset");
        assert_eq!(preset.name, "Test Preset");
        assert!(preset.description.is_none());
        assert_eq!(preset.sample_rate, 48000);
        assert_eq!(preset.voice, VoiceOptions::default());
    }

    #[test]
    fn builder_sets_fields() {
        let mut voice = VoiceOptions::default();
        voice.portamento = 0.1;
        let preset = Preset::new("Glide")
            .with_description("Slow glide")
            .with_sample_rate(44100)
            .with_voice(voice.clone());

        assert_eq!(preset.description.as_deref(), Some("Slow glide"));
        assert_eq!(preset.sample_rate, 44100);
        assert_eq!(preset.voice, voice);
    }

    #[test]
    fn from_toml_fills_omitted_fields() {
        let toml = r#"
name = "Saw Lead"
sample_rate = 44100

[voice]
portamento = 0.05

[voice.oscillator]
type = "sawtooth"

[voice.envelope]
attack = 0.01
release = 0.3
"#;

        let preset = Preset::from_toml(toml).unwrap();
        assert_eq!(preset.name, "Saw Lead");
        assert_eq!(preset.sample_rate, 44100);
        assert_eq!(preset.voice.portamento, 0.05);
        assert_eq!(preset.voice.volume, 0.0);
        assert_eq!(
            preset.voice.oscillator.oscillator_type,
            OscillatorType::Sawtooth
        );
        assert_eq!(preset.voice.oscillator.frequency, 440.0);
        assert_eq!(preset.voice.envelope.attack, 0.01);
        assert_eq!(preset.voice.envelope.decay, 0.1);
        assert_eq!(preset.voice.envelope.sustain, 0.3);
        assert_eq!(preset.voice.envelope.release, 0.3);
    }

    #[test]
    fn minimal_toml() {
        let preset = Preset::from_toml("name = \"Minimal\"").unwrap();
        assert_eq!(preset.name, "Minimal");
        assert!(preset.description.is_none());
        assert_eq!(preset.sample_rate, 48000);
        assert_eq!(preset.voice, VoiceOptions::default());
    }

    #[test]
    fn to_toml_writes_voice_tables() {
        let mut preset = Preset::new("Test").with_description("Test description");
        preset.voice.oscillator.oscillator_type = OscillatorType::Square;

        let toml = preset.to_toml().unwrap();
        assert!(toml.contains("name = \"Test\""));
        assert!(toml.contains("description = \"Test description\""));
        assert!(toml.contains("[voice.oscillator]"));
        assert!(toml.contains("type = \"square\""));

        assert_eq!(Preset::from_toml(&toml).unwrap(), preset);
    }

    #[test]
    fn unknown_waveform_is_a_parse_error() {
        let toml = r#"
name = "Bad"
[voice.oscillator]
type = "noise"
"#;
        assert!(matches!(
            Preset::from_toml(toml),
            Err(ConfigError::TomlParse(_))
        ));
    }

    #[test]
    fn create_voice_rejects_invalid_preset() {
        let ctx = AudioContext::new(48000.0).unwrap();
        let mut preset = Preset::new("Broken");
        preset.voice.envelope.sustain = 2.0;
        assert!(matches!(
            preset.create_voice(&ctx),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn create_voice_applies_options() {
        let mut preset = Preset::new("Square");
        preset.voice.oscillator.oscillator_type = OscillatorType::Square;
        preset.voice.envelope.attack = 0.2;

        let ctx = preset.context().unwrap();
        assert_eq!(ctx.sample_rate(), 48000.0);
        let voice = preset.create_voice(&ctx).unwrap();
        assert_eq!(
            voice.oscillator().unwrap().oscillator_type(),
            OscillatorType::Square
        );
        assert_eq!(voice.envelope().unwrap().attack(), 0.2);
    }
}
