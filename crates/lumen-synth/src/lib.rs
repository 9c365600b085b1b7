//! Lumen Synth - a monophonic synthesizer voice
//!
//! This crate provides a single-oscillator voice shaped by an amplitude
//! envelope, along with the oscillator, envelope and note helpers it is
//! built from.
//!
//! # Core Components
//!
//! ## Voice
//!
//! - [`Voice`] - Oscillator → envelope → output, with scheduled note triggers
//! - [`VoiceOptions`] - Construction options, defaulting field by field
//! - [`Monophonic`] - Output stage and portamento shared by single-note instruments
//!
//! ```rust
//! use lumen_core::{AudioContext, render_offline};
//! use lumen_synth::Voice;
//!
//! let ctx = AudioContext::new(48000.0).unwrap();
//! let mut voice = Voice::with_defaults(&ctx).unwrap();
//! voice.trigger_attack_release(69_u8, 0.25, None, Some(0.9)).unwrap();
//! let audio = render_offline(&ctx, &mut voice, 0.5);
//! assert_eq!(audio.len(), 24000);
//! ```
//!
//! ## Oscillators
//!
//! Audio-rate oscillators with PolyBLEP anti-aliasing:
//!
//! - [`Oscillator`] - Signal-driven oscillator with start/stop scheduling
//! - [`OscillatorType`] - Waveform types (sine, square, triangle, sawtooth, pulse)
//!
//! ## Envelopes
//!
//! - [`AmplitudeEnvelope`] - Linear ADSR gain stage with sample-accurate triggers
//! - [`EnvelopeStage`] - Envelope stage tracking
//!
//! ## Pitch
//!
//! - [`Note`] - Frequency, MIDI number, or scientific pitch name
//! - [`midi_to_freq`], [`freq_to_midi`], [`cents_to_ratio`]
//!
//! # Features
//!
//! - `serde` - Serialize/deserialize [`VoiceOptions`] and its parts
//! - `tracing` - Debug events for construction, wiring and disposal

pub mod envelope;
pub mod error;
pub mod monophonic;
pub mod note;
pub mod oscillator;
pub mod voice;

pub use envelope::{AmplitudeEnvelope, EnvelopeOptions, EnvelopeStage, MAX_PENDING_TRIGGERS};
pub use error::{EnvelopeError, NoteError, OscillatorError, VoiceError};
pub use lumen_core::cents_to_ratio;
pub use monophonic::Monophonic;
pub use note::{Note, freq_to_midi, midi_to_freq};
pub use oscillator::{Oscillator, OscillatorOptions, OscillatorType, SourceState};
pub use voice::{Voice, VoiceOptions};
