//! Error types for the voice and its collaborators.

use lumen_core::CoreError;
use thiserror::Error;

/// Errors raised while building or reconfiguring an [`Oscillator`](crate::Oscillator).
#[derive(Debug, Error, Clone, PartialEq)]
pub enum OscillatorError {
    /// The waveform name is not one of sine, square, triangle, sawtooth, pulse.
    #[error("unknown oscillator type: '{0}'")]
    UnknownType(String),

    /// Frequency was negative or not finite.
    #[error("invalid oscillator frequency: {0} Hz")]
    InvalidFrequency(f32),

    /// Detune was not finite.
    #[error("invalid oscillator detune: {0} cents")]
    InvalidDetune(f32),

    /// Phase was not finite.
    #[error("invalid oscillator phase: {0} degrees")]
    InvalidPhase(f32),

    /// Pulse width outside the open interval (0, 1).
    #[error("invalid pulse width: {0} (must be between 0 and 1, exclusive)")]
    InvalidWidth(f32),
}

/// Errors raised by the [`AmplitudeEnvelope`](crate::AmplitudeEnvelope).
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EnvelopeError {
    /// An envelope option is out of range.
    #[error("invalid envelope {param}: {value} ({reason})")]
    InvalidParameter {
        /// Option name (attack, decay, sustain, release).
        param: &'static str,
        /// Rejected value.
        value: f32,
        /// What the value must satisfy.
        reason: &'static str,
    },
}

/// Errors raised when parsing a [`Note`](crate::Note).
#[derive(Debug, Error, Clone, PartialEq)]
pub enum NoteError {
    /// Not a note name ("C4", "A#3", "Eb5"), a frequency, or a MIDI number.
    #[error("invalid note: '{0}'")]
    Invalid(String),

    /// Resolved pitch is outside the MIDI range 0-127.
    #[error("note out of range: {0}")]
    OutOfRange(i32),
}

/// Errors raised by the [`Voice`](crate::Voice) and its [`Monophonic`](crate::Monophonic) base.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum VoiceError {
    /// Oscillator construction or reconfiguration failed.
    #[error(transparent)]
    Oscillator(#[from] OscillatorError),

    /// Envelope construction or reconfiguration failed.
    #[error(transparent)]
    Envelope(#[from] EnvelopeError),

    /// A host primitive failed.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Attempted to replace a member that is read-only while the voice is live.
    #[error("cannot assign '{member}': member is read-only")]
    ReadOnly {
        /// Name of the protected member.
        member: &'static str,
    },

    /// The voice has already been disposed.
    #[error("voice has been disposed")]
    Disposed,

    /// Portamento was negative or not finite.
    #[error("invalid portamento: {0} s")]
    InvalidPortamento(f32),

    /// Volume was not finite.
    #[error("invalid volume: {0} dB")]
    InvalidVolume(f32),
}

impl VoiceError {
    /// Map a protected-cell failure, surfacing read-only rejections as their own variant.
    pub(crate) fn from_protected(err: CoreError) -> Self {
        match err {
            CoreError::ReadOnly { member } => VoiceError::ReadOnly { member },
            other => VoiceError::Core(other),
        }
    }
}
