//! Preset validation.
//!
//! A preset can carry values that a [`Voice`](lumen_synth::Voice) would
//! accept but that make no musical sense (a ten-minute attack, a 50 kHz
//! oscillator). [`validate_preset`] checks every numeric field against the
//! ranges in [`VOICE_PARAMS`] and reports all violations at once.
//!
//! # Example
//!
//! ```rust
//! use lumen_config::{Preset, ValidationError, validate_preset};
//!
//! let mut preset = Preset::new("Too Slow");
//! preset.voice.envelope.attack = 600.0;
//!
//! let err = validate_preset(&preset).unwrap_err();
//! assert!(matches!(err, ValidationError::OutOfRange { ref param, .. } if param == "envelope.attack"));
//! ```

use lumen_synth::VoiceOptions;
use thiserror::Error;

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// The preset has no name.
    #[error("preset name is empty")]
    EmptyName,

    /// Sample rate hint outside the supported range.
    #[error("sample rate {value} out of range [{min}, {max}]")]
    SampleRate {
        /// The sample rate in the preset.
        value: u32,
        /// Minimum supported rate.
        min: u32,
        /// Maximum supported rate.
        max: u32,
    },

    /// Parameter value out of range.
    #[error("parameter '{param}' value {value} out of range [{min}, {max}]")]
    OutOfRange {
        /// Dotted path of the parameter, e.g. `envelope.sustain`.
        param: String,
        /// The value that was out of range.
        value: f32,
        /// Minimum allowed value.
        min: f32,
        /// Maximum allowed value.
        max: f32,
    },

    /// Multiple validation errors.
    #[error("multiple validation errors: {}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    Multiple(Vec<ValidationError>),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Range metadata for one voice parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamRange {
    /// Dotted path of the parameter inside a preset's `[voice]` table.
    pub name: &'static str,
    /// Minimum value (inclusive).
    pub min: f32,
    /// Maximum value (inclusive).
    pub max: f32,
    /// Value used when the field is omitted.
    pub default: f32,
}

impl ParamRange {
    const fn new(name: &'static str, min: f32, max: f32, default: f32) -> Self {
        Self {
            name,
            min,
            max,
            default,
        }
    }

    /// Check `value` against this range. NaN is always out of range.
    pub fn check(&self, value: f32) -> ValidationResult<()> {
        if value >= self.min && value <= self.max {
            Ok(())
        } else {
            Err(ValidationError::OutOfRange {
                param: self.name.to_string(),
                value,
                min: self.min,
                max: self.max,
            })
        }
    }
}

/// Supported sample rate hints, in Hz.
pub const SAMPLE_RATE_RANGE: (u32, u32) = (8000, 192_000);

/// Ranges for every numeric field of [`VoiceOptions`].
pub const VOICE_PARAMS: &[ParamRange] = &[
    ParamRange::new("portamento", 0.0, 10.0, 0.0),
    ParamRange::new("volume", -96.0, 24.0, 0.0),
    ParamRange::new("oscillator.frequency", 0.0, 20000.0, 440.0),
    ParamRange::new("oscillator.detune", -4800.0, 4800.0, 0.0),
    ParamRange::new("oscillator.phase", -360.0, 360.0, 0.0),
    ParamRange::new("oscillator.width", 0.01, 0.99, 0.5),
    ParamRange::new("envelope.attack", 0.0, 60.0, 0.005),
    ParamRange::new("envelope.decay", 0.0, 60.0, 0.1),
    ParamRange::new("envelope.sustain", 0.0, 1.0, 0.3),
    ParamRange::new("envelope.release", 0.0, 60.0, 1.0),
];

/// Look up the range for a parameter by its dotted path.
pub fn param_range(name: &str) -> Option<&'static ParamRange> {
    VOICE_PARAMS.iter().find(|p| p.name == name)
}

/// Read the field named by a [`VOICE_PARAMS`] entry.
fn field(options: &VoiceOptions, name: &str) -> Option<f32> {
    let value = match name {
        "portamento" => options.portamento,
        "volume" => options.volume,
        "oscillator.frequency" => options.oscillator.frequency,
        "oscillator.detune" => options.oscillator.detune,
        "oscillator.phase" => options.oscillator.phase,
        "oscillator.width" => options.oscillator.width,
        "envelope.attack" => options.envelope.attack,
        "envelope.decay" => options.envelope.decay,
        "envelope.sustain" => options.envelope.sustain,
        "envelope.release" => options.envelope.release,
        _ => return None,
    };
    Some(value)
}

/// Validate voice options, collecting every out-of-range field.
pub fn validate_voice_options(options: &VoiceOptions) -> ValidationResult<()> {
    collect(voice_errors(options))
}

fn voice_errors(options: &VoiceOptions) -> Vec<ValidationError> {
    VOICE_PARAMS
        .iter()
        .filter_map(|range| {
            let value = field(options, range.name)?;
            range.check(value).err()
        })
        .collect()
}

/// Validate a complete preset.
///
/// Returns the single error when there is one, otherwise
/// [`ValidationError::Multiple`] with every problem found.
pub fn validate_preset(preset: &crate::Preset) -> ValidationResult<()> {
    let mut errors = Vec::new();

    if preset.name.trim().is_empty() {
        errors.push(ValidationError::EmptyName);
    }

    let (min, max) = SAMPLE_RATE_RANGE;
    if !(min..=max).contains(&preset.sample_rate) {
        errors.push(ValidationError::SampleRate {
            value: preset.sample_rate,
            min,
            max,
        });
    }

    errors.extend(voice_errors(&preset.voice));
    collect(errors)
}

fn collect(mut errors: Vec<ValidationError>) -> ValidationResult<()> {
    match errors.len() {
        0 => Ok(()),
        1 => Err(errors.remove(0)),
        _ => Err(ValidationError::Multiple(errors)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Preset;

    #[test]
    fn defaults_are_valid() {
        assert!(validate_voice_options(&VoiceOptions::default()).is_ok());
        assert!(validate_preset(&Preset::default()).is_ok());
    }

    #[test]
    fn every_range_has_a_field() {
        let options = VoiceOptions::default();
        for range in VOICE_PARAMS {
            let value = field(&options, range.name);
            assert_eq!(value, Some(range.default), "{}", range.name);
            assert!(range.min <= range.default && range.default <= range.max);
        }
    }

    #[test]
    fn single_error_is_not_wrapped() {
        let mut options = VoiceOptions::default();
        options.envelope.sustain = 1.5;
        assert_eq!(
            validate_voice_options(&options),
            Err(ValidationError::OutOfRange {
                param: "envelope.sustain".to_string(),
                value: 1.5,
                min: 0.0,
                max: 1.0,
            })
        );
    }

    #[test]
    fn reports_every_problem() {
        let mut preset = Preset::new(" ").with_sample_rate(1000);
        preset.voice.portamento = -1.0;
        preset.voice.oscillator.width = 1.0;

        let Err(ValidationError::Multiple(errors)) = validate_preset(&preset) else {
            panic!("expected multiple errors");
        };
        assert_eq!(errors.len(), 4);
        assert_eq!(errors[0], ValidationError::EmptyName);
        assert!(matches!(errors[1], ValidationError::SampleRate { value: 1000, .. }));
        let params: Vec<_> = errors[2..]
            .iter()
            .filter_map(|e| match e {
                ValidationError::OutOfRange { param, .. } => Some(param.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(params, vec!["portamento", "oscillator.width"]);
    }

    #[test]
    fn nan_is_out_of_range() {
        let range = param_range("volume").unwrap();
        assert!(range.check(f32::NAN).is_err());
        assert!(range.check(-6.0).is_ok());
    }

    #[test]
    fn multiple_display_joins_messages() {
        let err = ValidationError::Multiple(vec![
            ValidationError::EmptyName,
            param_range("volume").unwrap().check(30.0).unwrap_err(),
        ]);
        assert_eq!(
            err.to_string(),
            "multiple validation errors: preset name is empty; parameter 'volume' value 30 out of range [-96, 24]"
        );
    }
}
