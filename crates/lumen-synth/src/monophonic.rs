//! Shared behaviour of single-note instruments.
//!
//! [`Monophonic`] owns what every monophonic instrument has regardless of
//! how it makes sound: the output stage with its volume control and the
//! portamento (glide) time used whenever a new pitch is set. Instruments
//! hold one and delegate to it.

use lumen_core::{AudioContext, Output, Processor, Signal};

use crate::error::VoiceError;

/// Output stage plus portamento for a single-note instrument.
#[derive(Debug)]
pub struct Monophonic {
    portamento: f32,
    output: Output,
}

impl Monophonic {
    /// Create a base with `portamento` seconds of glide and `volume_db` output level.
    pub fn new(
        context: &AudioContext,
        portamento: f32,
        volume_db: f32,
    ) -> Result<Self, VoiceError> {
        validate_portamento(portamento)?;
        if !volume_db.is_finite() {
            return Err(VoiceError::InvalidVolume(volume_db));
        }
        Ok(Self {
            portamento,
            output: Output::new(context, volume_db),
        })
    }

    /// Glide time in seconds.
    pub fn portamento(&self) -> f32 {
        self.portamento
    }

    /// Set the glide time in seconds. Zero disables glide.
    pub fn set_portamento(&mut self, seconds: f32) -> Result<(), VoiceError> {
        validate_portamento(seconds)?;
        self.portamento = seconds;
        Ok(())
    }

    /// Output volume in dB.
    pub fn volume(&self) -> &Signal {
        self.output.volume()
    }

    /// The output stage.
    pub fn output(&self) -> &Output {
        &self.output
    }

    /// Schedule `frequency` to move to `hz` at `time`.
    ///
    /// With portamento enabled the pitch holds whatever value the timeline
    /// gives at `time` and glides exponentially to `hz` over `portamento`
    /// seconds; otherwise it jumps. Automation already scheduled at or after
    /// `time` is replaced.
    pub fn set_note(&self, frequency: &Signal, hz: f32, time: f64) {
        let from = frequency.value_at_time(time);
        frequency.cancel_scheduled_values(time);
        if self.portamento > 0.0 {
            frequency.set_value_at_time(from, time);
            frequency.exponential_ramp_to_value_at_time(hz, time + f64::from(self.portamento));
        } else {
            frequency.set_value_at_time(hz, time);
        }
    }

    /// Silence and disconnect the output stage.
    pub fn dispose(&mut self) {
        self.output.dispose();
    }
}

impl Processor for Monophonic {
    fn process(&mut self, buffer: &mut [f32], start_frame: u64) {
        self.output.process(buffer, start_frame);
    }
}

fn validate_portamento(seconds: f32) -> Result<(), VoiceError> {
    if seconds.is_finite() && seconds >= 0.0 {
        Ok(())
    } else {
        Err(VoiceError::InvalidPortamento(seconds))
    }
}
