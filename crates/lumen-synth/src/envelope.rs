//! Amplitude envelope with sample-accurate scheduled triggers.
//!
//! [`AmplitudeEnvelope`] is an attack-decay-sustain-release gain stage. Note
//! on/off requests are scheduled against the [`AudioContext`] clock and take
//! effect on the exact frame they were scheduled for when the envelope
//! processes that frame.
//!
//! ## Scheduling
//!
//! A new trigger cancels every pending trigger at or after its own time and
//! is then appended, so the most recent request always wins for the future
//! while earlier requests still play out. Triggers whose time has already
//! passed apply at the start of the next processed block.
//!
//! ## Curve
//!
//! All stages are linear ramps that start from the current level, so
//! retriggering or releasing mid-stage never jumps:
//!
//! - **Attack**: current level → velocity over `attack` seconds
//! - **Decay**: velocity → `sustain × velocity` over `decay` seconds
//! - **Sustain**: hold until released
//! - **Release**: current level → 0 over `release` seconds

use std::collections::VecDeque;

use lumen_core::{AudioContext, Processor};

use crate::error::EnvelopeError;

/// Pending-trigger slots reserved at construction.
pub const MAX_PENDING_TRIGGERS: usize = 32;

/// Envelope stages.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EnvelopeStage {
    /// Envelope is inactive: output is zero.
    #[default]
    Idle,
    /// Attack stage: output ramps toward the trigger velocity.
    Attack,
    /// Decay stage: output falls toward the sustain level.
    Decay,
    /// Sustain stage: output holds until released.
    Sustain,
    /// Release stage: output falls to zero.
    Release,
}

/// Envelope times in seconds and sustain as a gain.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct EnvelopeOptions {
    /// Attack time in seconds.
    pub attack: f32,
    /// Decay time in seconds.
    pub decay: f32,
    /// Sustain level in [0, 1], relative to the trigger velocity.
    pub sustain: f32,
    /// Release time in seconds.
    pub release: f32,
}

impl Default for EnvelopeOptions {
    fn default() -> Self {
        Self {
            attack: 0.005,
            decay: 0.1,
            sustain: 0.3,
            release: 1.0,
        }
    }
}

impl EnvelopeOptions {
    /// Check every field, returning the first violation.
    pub fn validate(&self) -> Result<(), EnvelopeError> {
        validate_time("attack", self.attack)?;
        validate_time("decay", self.decay)?;
        validate_sustain(self.sustain)?;
        validate_time("release", self.release)
    }
}

fn validate_time(param: &'static str, value: f32) -> Result<(), EnvelopeError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(EnvelopeError::InvalidParameter {
            param,
            value,
            reason: "must be a non-negative number of seconds",
        })
    }
}

fn validate_sustain(value: f32) -> Result<(), EnvelopeError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(EnvelopeError::InvalidParameter {
            param: "sustain",
            value,
            reason: "must be between 0 and 1",
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum TriggerKind {
    Attack { velocity: f32 },
    Release,
}

#[derive(Clone, Copy, Debug)]
struct Trigger {
    frame: u64,
    kind: TriggerKind,
}

/// ADSR gain stage driven by scheduled triggers.
///
/// # Example
///
/// ```rust
/// use lumen_core::{AudioContext, Processor};
/// use lumen_synth::{AmplitudeEnvelope, EnvelopeOptions, EnvelopeStage};
///
/// let ctx = AudioContext::new(1000.0).unwrap();
/// let mut env = AmplitudeEnvelope::new(&ctx, &EnvelopeOptions {
///     attack: 0.01,
///     decay: 0.01,
///     sustain: 0.5,
///     release: 0.01,
/// })
/// .unwrap();
///
/// env.trigger_attack(Some(0.0), Some(1.0));
/// let mut block = [1.0; 30];
/// env.process(&mut block, 0);
/// assert_eq!(env.stage(), EnvelopeStage::Sustain);
/// assert!((env.level() - 0.5).abs() < 1e-6);
/// ```
#[derive(Debug)]
pub struct AmplitudeEnvelope {
    context: AudioContext,
    attack: f32,
    decay: f32,
    sustain: f32,
    release: f32,

    stage: EnvelopeStage,
    level: f32,
    velocity: f32,

    // Current linear segment
    ramp_from: f32,
    ramp_to: f32,
    ramp_len: u64,
    ramp_pos: u64,

    pending: VecDeque<Trigger>,
}

impl AmplitudeEnvelope {
    /// Create an idle envelope.
    pub fn new(context: &AudioContext, options: &EnvelopeOptions) -> Result<Self, EnvelopeError> {
        options.validate()?;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            attack = options.attack,
            decay = options.decay,
            sustain = options.sustain,
            release = options.release,
            "envelope created"
        );

        Ok(Self {
            context: context.clone(),
            attack: options.attack,
            decay: options.decay,
            sustain: options.sustain,
            release: options.release,
            stage: EnvelopeStage::Idle,
            level: 0.0,
            velocity: 1.0,
            ramp_from: 0.0,
            ramp_to: 0.0,
            ramp_len: 0,
            ramp_pos: 0,
            pending: VecDeque::with_capacity(MAX_PENDING_TRIGGERS),
        })
    }

    /// Current options.
    pub fn options(&self) -> EnvelopeOptions {
        EnvelopeOptions {
            attack: self.attack,
            decay: self.decay,
            sustain: self.sustain,
            release: self.release,
        }
    }

    /// Attack time in seconds.
    pub fn attack(&self) -> f32 {
        self.attack
    }

    /// Set attack time in seconds. Applies from the next attack.
    pub fn set_attack(&mut self, seconds: f32) -> Result<(), EnvelopeError> {
        validate_time("attack", seconds)?;
        self.attack = seconds;
        Ok(())
    }

    /// Decay time in seconds.
    pub fn decay(&self) -> f32 {
        self.decay
    }

    /// Set decay time in seconds. Applies from the next decay.
    pub fn set_decay(&mut self, seconds: f32) -> Result<(), EnvelopeError> {
        validate_time("decay", seconds)?;
        self.decay = seconds;
        Ok(())
    }

    /// Sustain level.
    pub fn sustain(&self) -> f32 {
        self.sustain
    }

    /// Set sustain level in [0, 1].
    pub fn set_sustain(&mut self, level: f32) -> Result<(), EnvelopeError> {
        validate_sustain(level)?;
        self.sustain = level;
        Ok(())
    }

    /// Release time in seconds.
    pub fn release(&self) -> f32 {
        self.release
    }

    /// Set release time in seconds. Applies from the next release.
    pub fn set_release(&mut self, seconds: f32) -> Result<(), EnvelopeError> {
        validate_time("release", seconds)?;
        self.release = seconds;
        Ok(())
    }

    /// Level produced by the most recently processed frame.
    pub fn level(&self) -> f32 {
        self.level
    }

    /// Stage as of the most recently processed frame.
    pub fn stage(&self) -> EnvelopeStage {
        self.stage
    }

    /// True unless idle.
    pub fn is_active(&self) -> bool {
        self.stage != EnvelopeStage::Idle
    }

    /// Number of triggers waiting to be applied.
    pub fn pending_triggers(&self) -> usize {
        self.pending.len()
    }

    /// Schedule the attack at `time` (default now) peaking at `velocity` (default 1).
    pub fn trigger_attack(&mut self, time: Option<f64>, velocity: Option<f32>) -> &mut Self {
        let velocity = velocity.unwrap_or(1.0);
        let velocity = if velocity.is_finite() {
            velocity.max(0.0)
        } else {
            0.0
        };
        let time = self.context.resolve(time);
        self.schedule(time, TriggerKind::Attack { velocity });
        self
    }

    /// Schedule the release at `time` (default now).
    pub fn trigger_release(&mut self, time: Option<f64>) -> &mut Self {
        let time = self.context.resolve(time);
        self.schedule(time, TriggerKind::Release);
        self
    }

    /// Schedule an attack at `time` and a release `duration` seconds later.
    pub fn trigger_attack_release(
        &mut self,
        duration: f64,
        time: Option<f64>,
        velocity: Option<f32>,
    ) -> &mut Self {
        let time = self.context.resolve(time);
        self.trigger_attack(Some(time), velocity);
        self.trigger_release(Some(time + duration.max(0.0)));
        self
    }

    /// Drop every pending trigger at or after `time` (default now).
    pub fn cancel(&mut self, time: Option<f64>) -> &mut Self {
        let frame = self.context.seconds_to_frames(self.context.resolve(time));
        self.pending.retain(|t| t.frame < frame);
        self
    }

    /// Drop all pending triggers and fall silent.
    pub fn dispose(mut self) {
        self.pending.clear();
        self.stage = EnvelopeStage::Idle;
        self.level = 0.0;
        #[cfg(feature = "tracing")]
        tracing::debug!("envelope disposed");
    }

    fn schedule(&mut self, time: f64, kind: TriggerKind) {
        let frame = self.context.seconds_to_frames(time);
        self.pending.retain(|t| t.frame < frame);
        if self.pending.len() == MAX_PENDING_TRIGGERS {
            self.pending.pop_front();
            #[cfg(feature = "tracing")]
            tracing::warn!(
                capacity = MAX_PENDING_TRIGGERS,
                "envelope trigger queue full, dropping oldest trigger"
            );
        }
        self.pending.push_back(Trigger { frame, kind });
    }

    fn apply(&mut self, kind: TriggerKind) {
        match kind {
            TriggerKind::Attack { velocity } => {
                self.velocity = velocity;
                self.begin(EnvelopeStage::Attack, velocity, self.attack, 0);
            }
            TriggerKind::Release => {
                if self.stage != EnvelopeStage::Idle {
                    self.begin(EnvelopeStage::Release, 0.0, self.release, 0);
                }
            }
        }
    }

    fn begin(&mut self, stage: EnvelopeStage, target: f32, seconds: f32, pos: u64) {
        self.stage = stage;
        self.ramp_from = self.level;
        self.ramp_to = target;
        self.ramp_len = self.context.seconds_to_frames(f64::from(seconds));
        self.ramp_pos = pos;
    }

    /// Move past a finished ramp. The current frame already output the
    /// ramp's end value, which is the next ramp's start, so it counts as
    /// that ramp's first frame.
    fn finish_stage(&mut self) {
        match self.stage {
            EnvelopeStage::Attack => {
                let target = self.sustain * self.velocity;
                self.begin(EnvelopeStage::Decay, target, self.decay, 1);
            }
            EnvelopeStage::Decay => self.stage = EnvelopeStage::Sustain,
            EnvelopeStage::Release => {
                self.stage = EnvelopeStage::Idle;
                self.level = 0.0;
            }
            EnvelopeStage::Idle | EnvelopeStage::Sustain => {}
        }
    }

    /// Advance one frame and return the level.
    #[inline]
    fn advance(&mut self) -> f32 {
        match self.stage {
            EnvelopeStage::Idle => {}
            EnvelopeStage::Sustain => self.level = self.sustain * self.velocity,
            EnvelopeStage::Attack | EnvelopeStage::Decay | EnvelopeStage::Release => {
                if self.ramp_pos >= self.ramp_len {
                    self.level = self.ramp_to;
                    self.finish_stage();
                } else {
                    let progress = self.ramp_pos as f32 / self.ramp_len as f32;
                    self.level = self.ramp_from + (self.ramp_to - self.ramp_from) * progress;
                    self.ramp_pos += 1;
                }
            }
        }
        self.level
    }
}

impl Processor for AmplitudeEnvelope {
    fn process(&mut self, buffer: &mut [f32], start_frame: u64) {
        for (i, sample) in buffer.iter_mut().enumerate() {
            let frame = start_frame + i as u64;
            while self.pending.front().is_some_and(|t| t.frame <= frame) {
                if let Some(trigger) = self.pending.pop_front() {
                    self.apply(trigger.kind);
                }
            }
            *sample *= self.advance();
        }
    }
}
