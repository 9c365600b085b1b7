//! The monophonic synth voice.
//!
//! A [`Voice`] is one oscillator shaped by one amplitude envelope, feeding
//! the output stage of its [`Monophonic`] base:
//!
//! ```text
//! Oscillator ──► AmplitudeEnvelope ──► Output (volume)
//! ```
//!
//! The voice owns its oscillator and envelope and republishes the
//! oscillator's `frequency` and `detune` signals as aliases: writing through
//! [`Voice::frequency`] changes the oscillator's pitch directly. These four
//! members are read-only for as long as the voice is live; they can be
//! mutated in place but not replaced. [`Voice::dispose`] tears the chain
//! down exactly once, after which every operation fails with
//! [`VoiceError::Disposed`] and rendering produces silence.
//!
//! # Example
//!
//! ```rust
//! use lumen_core::{AudioContext, render_offline};
//! use lumen_synth::{Voice, VoiceOptions, OscillatorType};
//!
//! let ctx = AudioContext::new(48000.0).unwrap();
//! let mut options = VoiceOptions::default();
//! options.oscillator.oscillator_type = OscillatorType::Sawtooth;
//! let mut voice = Voice::new(&ctx, options).unwrap();
//!
//! voice
//!     .trigger_note_attack("C4".parse::<lumen_synth::Note>().unwrap(), Some(0.0), Some(0.8))
//!     .unwrap()
//!     .trigger_release(Some(0.5))
//!     .unwrap();
//!
//! let audio = render_offline(&ctx, &mut voice, 1.0);
//! assert!(audio.iter().any(|&s| s.abs() > 0.1));
//!
//! voice.dispose().unwrap();
//! assert!(voice.oscillator().is_none());
//! ```

use lumen_core::{AudioContext, MAX_BLOCK_SIZE, Processor, Protected, Signal, Source};

use crate::envelope::{AmplitudeEnvelope, EnvelopeOptions};
use crate::error::VoiceError;
use crate::monophonic::Monophonic;
use crate::note::Note;
use crate::oscillator::{Oscillator, OscillatorOptions};

/// Voice configuration. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct VoiceOptions {
    /// Glide time in seconds from one note to the next.
    pub portamento: f32,
    /// Output volume in dB.
    pub volume: f32,
    /// Oscillator options (default: triangle at 440 Hz).
    pub oscillator: OscillatorOptions,
    /// Envelope options (default: 0.005 / 0.1 / 0.3 / 1).
    pub envelope: EnvelopeOptions,
}

/// A single oscillator, monophonic synthesizer voice.
#[derive(Debug)]
pub struct Voice {
    context: AudioContext,
    monophonic: Monophonic,
    oscillator: Protected<Oscillator>,
    frequency: Protected<Signal>,
    detune: Protected<Signal>,
    envelope: Protected<AmplitudeEnvelope>,
    disposed: bool,
}

impl Voice {
    /// Build the voice, wire its chain and start the oscillator now.
    ///
    /// Any collaborator failure is returned unchanged and no voice is built.
    pub fn new(context: &AudioContext, options: VoiceOptions) -> Result<Self, VoiceError> {
        let monophonic = Monophonic::new(context, options.portamento, options.volume)?;

        let oscillator = Oscillator::new(context, &options.oscillator)?;
        let frequency = oscillator.frequency().clone();
        let detune = oscillator.detune().clone();

        let envelope = AmplitudeEnvelope::new(context, &options.envelope)?;

        let mut voice = Self {
            context: context.clone(),
            monophonic,
            oscillator: Protected::writable("oscillator", oscillator),
            frequency: Protected::writable("frequency", frequency),
            detune: Protected::writable("detune", detune),
            envelope: Protected::writable("envelope", envelope),
            disposed: false,
        };

        if let Some(osc) = voice.oscillator.get_mut() {
            osc.connect();
            osc.start(None);
        }

        voice.oscillator.make_read_only();
        voice.frequency.make_read_only();
        voice.detune.make_read_only();
        voice.envelope.make_read_only();

        #[cfg(feature = "tracing")]
        tracing::debug!(
            oscillator_type = %options.oscillator.oscillator_type,
            sample_rate = context.sample_rate(),
            "voice created"
        );

        Ok(voice)
    }

    /// Build a voice with default options.
    pub fn with_defaults(context: &AudioContext) -> Result<Self, VoiceError> {
        Self::new(context, VoiceOptions::default())
    }

    /// The audio context this voice schedules against.
    pub fn context(&self) -> &AudioContext {
        &self.context
    }

    /// True once [`dispose`](Self::dispose) has run.
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// The oscillator, or `None` after disposal.
    pub fn oscillator(&self) -> Option<&Oscillator> {
        self.oscillator.get()
    }

    /// Mutable oscillator access (waveform, width), or `None` after disposal.
    pub fn oscillator_mut(&mut self) -> Option<&mut Oscillator> {
        self.oscillator.get_mut()
    }

    /// The amplitude envelope, or `None` after disposal.
    pub fn envelope(&self) -> Option<&AmplitudeEnvelope> {
        self.envelope.get()
    }

    /// Mutable envelope access (times, sustain), or `None` after disposal.
    pub fn envelope_mut(&mut self) -> Option<&mut AmplitudeEnvelope> {
        self.envelope.get_mut()
    }

    /// Alias of the oscillator's frequency signal (Hz), or `None` after disposal.
    pub fn frequency(&self) -> Option<&Signal> {
        self.frequency.get()
    }

    /// Alias of the oscillator's detune signal (cents), or `None` after disposal.
    pub fn detune(&self) -> Option<&Signal> {
        self.detune.get()
    }

    /// Output volume signal (dB), or `None` after disposal.
    pub fn volume(&self) -> Option<&Signal> {
        (!self.disposed).then_some(self.monophonic.volume())
    }

    /// Glide time in seconds.
    pub fn portamento(&self) -> f32 {
        self.monophonic.portamento()
    }

    /// Set the glide time in seconds.
    pub fn set_portamento(&mut self, seconds: f32) -> Result<&mut Self, VoiceError> {
        self.ensure_live()?;
        self.monophonic.set_portamento(seconds)?;
        Ok(self)
    }

    /// Start the envelope's attack at `time` (default now) with `velocity` (default 1).
    pub fn trigger_attack(
        &mut self,
        time: Option<f64>,
        velocity: Option<f32>,
    ) -> Result<&mut Self, VoiceError> {
        self.live_envelope()?.trigger_attack(time, velocity);
        Ok(self)
    }

    /// Start the envelope's release at `time` (default now).
    pub fn trigger_envelope_release(&mut self, time: Option<f64>) -> Result<&mut Self, VoiceError> {
        self.live_envelope()?.trigger_release(time);
        Ok(self)
    }

    /// Set the pitch to `note` and start the attack, both at `time` (default now).
    pub fn trigger_note_attack(
        &mut self,
        note: impl Into<Note>,
        time: Option<f64>,
        velocity: Option<f32>,
    ) -> Result<&mut Self, VoiceError> {
        let time = self.context.resolve(time);
        self.trigger_attack(Some(time), velocity)?;
        self.set_note(note, Some(time))
    }

    /// Release the note at `time` (default now).
    pub fn trigger_release(&mut self, time: Option<f64>) -> Result<&mut Self, VoiceError> {
        self.trigger_envelope_release(time)
    }

    /// Play `note` at `time` (default now) and release it `duration` seconds later.
    pub fn trigger_attack_release(
        &mut self,
        note: impl Into<Note>,
        duration: f64,
        time: Option<f64>,
        velocity: Option<f32>,
    ) -> Result<&mut Self, VoiceError> {
        let time = self.context.resolve(time);
        self.trigger_note_attack(note, Some(time), velocity)?;
        self.trigger_envelope_release(Some(time + duration.max(0.0)))
    }

    /// Change the pitch at `time` (default now), gliding over the portamento time.
    pub fn set_note(
        &mut self,
        note: impl Into<Note>,
        time: Option<f64>,
    ) -> Result<&mut Self, VoiceError> {
        self.ensure_live()?;
        let time = self.context.resolve(time);
        let frequency = self.frequency.get().ok_or(VoiceError::Disposed)?;
        self.monophonic
            .set_note(frequency, note.into().frequency(), time);
        Ok(self)
    }

    /// Attempt to replace the oscillator. Fails while the voice is live.
    pub fn replace_oscillator(&mut self, oscillator: Oscillator) -> Result<(), VoiceError> {
        self.ensure_live()?;
        self.oscillator
            .set(oscillator)
            .map_err(VoiceError::from_protected)
    }

    /// Attempt to replace the envelope. Fails while the voice is live.
    pub fn replace_envelope(&mut self, envelope: AmplitudeEnvelope) -> Result<(), VoiceError> {
        self.ensure_live()?;
        self.envelope
            .set(envelope)
            .map_err(VoiceError::from_protected)
    }

    /// Tear down the voice.
    ///
    /// Disposes the base, lifts the read-only guard, disposes the oscillator
    /// and the envelope, then releases the frequency and detune aliases. A
    /// second call fails with [`VoiceError::Disposed`].
    pub fn dispose(&mut self) -> Result<(), VoiceError> {
        self.ensure_live()?;
        self.disposed = true;

        self.monophonic.dispose();

        self.oscillator.make_writable();
        self.frequency.make_writable();
        self.detune.make_writable();
        self.envelope.make_writable();

        self.oscillator.take()?.dispose();
        self.envelope.take()?.dispose();
        drop(self.frequency.take()?);
        drop(self.detune.take()?);

        #[cfg(feature = "tracing")]
        tracing::debug!("voice disposed");

        Ok(())
    }

    fn ensure_live(&self) -> Result<(), VoiceError> {
        if self.disposed {
            Err(VoiceError::Disposed)
        } else {
            Ok(())
        }
    }

    fn live_envelope(&mut self) -> Result<&mut AmplitudeEnvelope, VoiceError> {
        self.ensure_live()?;
        self.envelope.get_mut().ok_or(VoiceError::Disposed)
    }
}

impl Source for Voice {
    fn render(&mut self, out: &mut [f32], start_frame: u64) {
        let (Some(oscillator), Some(envelope)) =
            (self.oscillator.get_mut(), self.envelope.get_mut())
        else {
            out.fill(0.0);
            return;
        };

        let mut frame = start_frame;
        for chunk in out.chunks_mut(MAX_BLOCK_SIZE) {
            oscillator.render(chunk, frame);
            envelope.process(chunk, frame);
            self.monophonic.process(chunk, frame);
            frame += chunk.len() as u64;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::EnvelopeStage;
    use crate::error::{EnvelopeError, OscillatorError};
    use crate::oscillator::{OscillatorType, SourceState};
    use lumen_core::render_offline;

    fn ctx() -> AudioContext {
        AudioContext::new(48000.0).unwrap()
    }

    #[test]
    fn defaults_build_a_running_triangle_voice() {
        let ctx = ctx();
        let voice = Voice::with_defaults(&ctx).unwrap();

        let osc = voice.oscillator().unwrap();
        assert_eq!(osc.oscillator_type(), OscillatorType::Triangle);
        assert_eq!(osc.state(), SourceState::Started);
        assert!(osc.is_connected());

        let env = voice.envelope().unwrap();
        assert_eq!(env.options(), EnvelopeOptions::default());
        assert_eq!(env.stage(), EnvelopeStage::Idle);

        assert!(voice.frequency().is_some());
        assert!(voice.detune().is_some());
        assert_eq!(voice.frequency().unwrap().value(), 440.0);
        assert!(!voice.is_disposed());
    }

    #[test]
    fn frequency_and_detune_alias_the_oscillator() {
        let ctx = ctx();
        let voice = Voice::with_defaults(&ctx).unwrap();
        voice.frequency().unwrap().set_value(261.63);
        voice.detune().unwrap().set_value(-25.0);

        let osc = voice.oscillator().unwrap();
        assert_eq!(osc.frequency().value(), 261.63);
        assert_eq!(osc.detune().value(), -25.0);
        assert!(osc.frequency().same_signal(voice.frequency().unwrap()));
        assert!(osc.detune().same_signal(voice.detune().unwrap()));
    }

    #[test]
    fn collaborator_errors_propagate() {
        let ctx = ctx();
        let err = Voice::new(
            &ctx,
            VoiceOptions {
                envelope: EnvelopeOptions {
                    attack: -1.0,
                    ..EnvelopeOptions::default()
                },
                ..VoiceOptions::default()
            },
        )
        .unwrap_err();
        assert!(matches!(
            err,
            VoiceError::Envelope(EnvelopeError::InvalidParameter {
                param: "attack",
                ..
            })
        ));

        let err = Voice::new(
            &ctx,
            VoiceOptions {
                oscillator: OscillatorOptions {
                    width: 0.0,
                    ..OscillatorOptions::default()
                },
                ..VoiceOptions::default()
            },
        )
        .unwrap_err();
        assert_eq!(err, VoiceError::Oscillator(OscillatorError::InvalidWidth(0.0)));

        let err = Voice::new(
            &ctx,
            VoiceOptions {
                portamento: -1.0,
                ..VoiceOptions::default()
            },
        )
        .unwrap_err();
        assert_eq!(err, VoiceError::InvalidPortamento(-1.0));
    }

    #[test]
    fn members_cannot_be_replaced_while_live() {
        let ctx = ctx();
        let mut voice = Voice::with_defaults(&ctx).unwrap();

        let other = Oscillator::new(&ctx, &OscillatorOptions::default()).unwrap();
        assert_eq!(
            voice.replace_oscillator(other),
            Err(VoiceError::ReadOnly {
                member: "oscillator"
            })
        );

        let other = AmplitudeEnvelope::new(&ctx, &EnvelopeOptions::default()).unwrap();
        assert_eq!(
            voice.replace_envelope(other),
            Err(VoiceError::ReadOnly { member: "envelope" })
        );

        // The originals are untouched
        assert_eq!(
            voice.oscillator().unwrap().state(),
            SourceState::Started
        );
    }

    #[test]
    fn held_members_stay_mutable() {
        let ctx = ctx();
        let mut voice = Voice::with_defaults(&ctx).unwrap();
        voice
            .oscillator_mut()
            .unwrap()
            .set_type(OscillatorType::Sawtooth);
        voice.envelope_mut().unwrap().set_sustain(0.9).unwrap();
        assert_eq!(
            voice.oscillator().unwrap().oscillator_type(),
            OscillatorType::Sawtooth
        );
        assert_eq!(voice.envelope().unwrap().sustain(), 0.9);
    }

    #[test]
    fn dispose_vacates_everything_once() {
        let ctx = ctx();
        let mut voice = Voice::with_defaults(&ctx).unwrap();
        voice.dispose().unwrap();

        assert!(voice.is_disposed());
        assert!(voice.oscillator().is_none());
        assert!(voice.envelope().is_none());
        assert!(voice.frequency().is_none());
        assert!(voice.detune().is_none());
        assert!(voice.volume().is_none());

        assert_eq!(voice.dispose(), Err(VoiceError::Disposed));
    }

    #[test]
    fn operations_after_dispose_fail() {
        let ctx = ctx();
        let mut voice = Voice::with_defaults(&ctx).unwrap();
        voice.dispose().unwrap();

        assert!(matches!(
            voice.trigger_attack(None, None),
            Err(VoiceError::Disposed)
        ));
        assert!(matches!(
            voice.trigger_envelope_release(None),
            Err(VoiceError::Disposed)
        ));
        assert!(matches!(
            voice.trigger_note_attack(60_u8, None, None),
            Err(VoiceError::Disposed)
        ));
        assert!(matches!(
            voice.set_portamento(0.1),
            Err(VoiceError::Disposed)
        ));
        let osc = Oscillator::new(&ctx, &OscillatorOptions::default()).unwrap();
        assert_eq!(voice.replace_oscillator(osc), Err(VoiceError::Disposed));
    }

    #[test]
    fn disposed_voice_renders_silence() {
        let ctx = ctx();
        let mut voice = Voice::with_defaults(&ctx).unwrap();
        voice.trigger_attack(Some(0.0), None).unwrap();
        voice.dispose().unwrap();
        let audio = render_offline(&ctx, &mut voice, 0.05);
        assert!(audio.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn double_attack_keeps_oscillator_running() {
        let ctx = ctx();
        let mut voice = Voice::with_defaults(&ctx).unwrap();
        voice
            .trigger_attack(Some(0.0), None)
            .unwrap()
            .trigger_attack(Some(0.01), Some(0.5))
            .unwrap();
        render_offline(&ctx, &mut voice, 0.1);

        let osc = voice.oscillator().unwrap();
        assert_eq!(osc.state(), SourceState::Started);
        assert!(osc.is_connected());
        assert!(voice.envelope().unwrap().is_active());
    }

    #[test]
    fn silent_until_triggered() {
        let ctx = ctx();
        let mut voice = Voice::with_defaults(&ctx).unwrap();
        let audio = render_offline(&ctx, &mut voice, 0.02);
        assert!(audio.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn note_attack_sets_pitch_at_trigger_time() {
        let ctx = ctx();
        let mut voice = Voice::with_defaults(&ctx).unwrap();
        voice.trigger_note_attack(Note::Midi(57), Some(0.01), None).unwrap();
        let freq = voice.frequency().unwrap();
        assert_eq!(freq.value_at_time(0.0), 440.0);
        assert!((freq.value_at_time(0.01) - 220.0).abs() < 0.01);
    }

    #[test]
    fn portamento_retargets_mid_glide() {
        let ctx = ctx();
        let mut voice = Voice::new(
            &ctx,
            VoiceOptions {
                portamento: 0.1,
                ..VoiceOptions::default()
            },
        )
        .unwrap();
        voice.trigger_note_attack(220.0_f32, Some(0.0), None).unwrap();
        render_offline(&ctx, &mut voice, 0.05);

        // Halfway through the 440 -> 220 glide, redirect to 880
        voice.set_note(880.0_f32, None).unwrap();
        let freq = voice.frequency().unwrap();
        let now = ctx.now();
        let start = freq.value_at_time(now);
        assert!((start - 311.13).abs() < 1.0, "glide start {start}");
        assert!((freq.value_at_time(now + 0.1) - 880.0).abs() < 0.01);
        assert!((freq.value_at_time(now + 0.5) - 880.0).abs() < 0.01);
    }

    #[test]
    fn volume_scales_output() {
        let ctx = ctx();
        let mut loud = Voice::with_defaults(&ctx).unwrap();
        loud.trigger_attack(Some(0.0), None).unwrap();
        let loud_audio = render_offline(&ctx, &mut loud, 0.05);

        let ctx = AudioContext::new(48000.0).unwrap();
        let mut quiet = Voice::new(
            &ctx,
            VoiceOptions {
                volume: -20.0,
                ..VoiceOptions::default()
            },
        )
        .unwrap();
        quiet.trigger_attack(Some(0.0), None).unwrap();
        let quiet_audio = render_offline(&ctx, &mut quiet, 0.05);

        let peak = |a: &[f32]| a.iter().fold(0.0_f32, |m, &s| m.max(s.abs()));
        let ratio = peak(&quiet_audio) / peak(&loud_audio);
        assert!((ratio - 0.1).abs() < 0.01, "ratio {ratio}");
    }
}
