//! Shared, schedulable control signals.
//!
//! A [`Signal`] is a control-rate parameter (frequency, detune, volume, ...)
//! that can be written from the control path while the render path reads it.
//! Cloning a `Signal` produces an *alias*: both handles refer to the same
//! parameter, so a write through either is observed by both.
//!
//! ## Writes
//!
//! - [`set_value`](Signal::set_value) replaces the value immediately and
//!   discards any scheduled automation.
//! - [`set_value_at_time`](Signal::set_value_at_time),
//!   [`linear_ramp_to_value_at_time`](Signal::linear_ramp_to_value_at_time) and
//!   [`exponential_ramp_to_value_at_time`](Signal::exponential_ramp_to_value_at_time)
//!   schedule automation against the [`AudioContext`] clock. A ramp starts at
//!   the previous event (or the last immediate write) and ends at its own time.
//!
//! ## Render path
//!
//! [`fill_block`](Signal::fill_block) writes one value per frame. It takes the
//! automation lock with `try_lock`; if the control path holds the lock, the
//! block is filled with the last known value instead of waiting.
//!
//! ```rust
//! use lumen_core::{AudioContext, Signal, SignalUnits};
//!
//! let ctx = AudioContext::new(1000.0).unwrap();
//! let freq = Signal::new(&ctx, SignalUnits::Frequency, 440.0);
//! let alias = freq.clone();
//!
//! alias.set_value(220.0);
//! assert_eq!(freq.value(), 220.0);
//!
//! freq.linear_ramp_to_value_at_time(320.0, 0.1);
//! let mut block = [0.0; 101];
//! freq.fill_block(0, &mut block);
//! assert!((block[50] - 270.0).abs() < 1e-3);
//! assert!((block[100] - 320.0).abs() < 1e-3);
//! ```

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use libm::powf;
use parking_lot::Mutex;

use crate::context::AudioContext;

/// Initial automation capacity, reserved so typical scheduling never reallocates.
const TIMELINE_CAPACITY: usize = 32;

/// Smallest value an exponential ramp may target.
pub const MIN_EXPONENTIAL_VALUE: f32 = 1e-5;

/// Units a signal's value is expressed in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SignalUnits {
    /// Frequency in Hz, never negative.
    Frequency,
    /// Pitch offset in cents (100 cents = 1 semitone).
    Cents,
    /// Level in decibels.
    Decibels,
    /// Linear gain, never negative.
    Gain,
    /// Unitless value.
    Number,
}

impl SignalUnits {
    /// Clamp a value into the range these units allow.
    #[inline]
    pub fn clamp(self, value: f32) -> f32 {
        match self {
            SignalUnits::Frequency | SignalUnits::Gain => value.max(0.0),
            SignalUnits::Cents | SignalUnits::Decibels | SignalUnits::Number => value,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Ramp {
    Step,
    Linear,
    Exponential,
}

#[derive(Clone, Copy, Debug)]
struct Automation {
    ramp: Ramp,
    time: f64,
    value: f32,
}

/// Scheduled automation, sorted by time.
///
/// `anchor_*` is the most recent event that is already in the past; ramps
/// interpolate from it to the next pending event.
#[derive(Debug)]
struct Timeline {
    anchor_time: f64,
    anchor_value: f32,
    events: VecDeque<Automation>,
}

impl Timeline {
    fn new(value: f32) -> Self {
        Self {
            anchor_time: 0.0,
            anchor_value: value,
            events: VecDeque::with_capacity(TIMELINE_CAPACITY),
        }
    }

    /// Insert after any events at the same time so issue order is kept.
    fn insert(&mut self, event: Automation) {
        let idx = self
            .events
            .iter()
            .position(|e| e.time > event.time)
            .unwrap_or(self.events.len());
        self.events.insert(idx, event);
    }

    fn cancel_from(&mut self, time: f64) {
        self.events.retain(|e| e.time < time);
    }

    /// Drop events that are no longer in the future, keeping the last as anchor.
    fn retire(&mut self, t: f64) {
        while let Some(event) = self.events.front() {
            if event.time > t {
                break;
            }
            self.anchor_time = event.time;
            self.anchor_value = event.value;
            self.events.pop_front();
        }
    }

    fn evaluate(&self, t: f64) -> f32 {
        let mut anchor_time = self.anchor_time;
        let mut anchor_value = self.anchor_value;

        for event in &self.events {
            if event.time <= t {
                anchor_time = event.time;
                anchor_value = event.value;
                continue;
            }
            let span = event.time - anchor_time;
            let progress = if span > 0.0 {
                ((t - anchor_time) / span).clamp(0.0, 1.0) as f32
            } else {
                1.0
            };
            return match event.ramp {
                Ramp::Step => anchor_value,
                Ramp::Linear => anchor_value + (event.value - anchor_value) * progress,
                Ramp::Exponential => {
                    if anchor_value > 0.0 {
                        anchor_value * powf(event.value / anchor_value, progress)
                    } else {
                        anchor_value
                    }
                }
            };
        }

        anchor_value
    }
}

struct SignalInner {
    context: AudioContext,
    units: SignalUnits,
    /// Last written or rendered value, as f32 bits.
    value: AtomicU32,
    timeline: Mutex<Timeline>,
}

/// A schedulable control parameter shared between control and render paths.
///
/// Clones are aliases of the same parameter. See the [module docs](self).
#[derive(Clone)]
pub struct Signal {
    inner: Arc<SignalInner>,
}

impl Signal {
    /// Create a signal holding `initial` (clamped to `units`).
    pub fn new(context: &AudioContext, units: SignalUnits, initial: f32) -> Self {
        let initial = units.clamp(initial);
        Self {
            inner: Arc::new(SignalInner {
                context: context.clone(),
                units,
                value: AtomicU32::new(initial.to_bits()),
                timeline: Mutex::new(Timeline::new(initial)),
            }),
        }
    }

    /// Current value: the last immediate write or the last rendered frame.
    #[inline]
    pub fn value(&self) -> f32 {
        f32::from_bits(self.inner.value.load(Ordering::Acquire))
    }

    /// Units of this signal.
    pub fn units(&self) -> SignalUnits {
        self.inner.units
    }

    /// True if `other` is an alias of this signal.
    pub fn same_signal(&self, other: &Signal) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Set the value now, cancelling all scheduled automation.
    ///
    /// Non-finite values are ignored.
    pub fn set_value(&self, value: f32) -> &Self {
        if !value.is_finite() {
            return self;
        }
        let value = self.inner.units.clamp(value);
        let mut timeline = self.inner.timeline.lock();
        timeline.events.clear();
        timeline.anchor_time = self.inner.context.now();
        timeline.anchor_value = value;
        self.store(value);
        self
    }

    /// Jump to `value` at `time` (seconds on the context clock).
    pub fn set_value_at_time(&self, value: f32, time: f64) -> &Self {
        self.schedule(Ramp::Step, value, time)
    }

    /// Ramp linearly from the previous event to `value`, arriving at `end_time`.
    pub fn linear_ramp_to_value_at_time(&self, value: f32, end_time: f64) -> &Self {
        self.schedule(Ramp::Linear, value, end_time)
    }

    /// Ramp exponentially from the previous event to `value`, arriving at `end_time`.
    ///
    /// Targets below [`MIN_EXPONENTIAL_VALUE`] are raised to it. If the
    /// starting value is not positive the ramp holds until `end_time`.
    pub fn exponential_ramp_to_value_at_time(&self, value: f32, end_time: f64) -> &Self {
        self.schedule(Ramp::Exponential, value.max(MIN_EXPONENTIAL_VALUE), end_time)
    }

    /// Remove every scheduled event at or after `time`.
    pub fn cancel_scheduled_values(&self, time: f64) -> &Self {
        self.inner.timeline.lock().cancel_from(time);
        self
    }

    /// True if automation events are still pending.
    pub fn has_scheduled_values(&self) -> bool {
        !self.inner.timeline.lock().events.is_empty()
    }

    /// Value the automation yields at `time`, without rendering.
    pub fn value_at_time(&self, time: f64) -> f32 {
        self.inner.timeline.lock().evaluate(time)
    }

    /// Fill `out` with one value per frame, starting at `start_frame`.
    ///
    /// Render-path safe: never blocks and never allocates.
    pub fn fill_block(&self, start_frame: u64, out: &mut [f32]) {
        let sample_rate = f64::from(self.inner.context.sample_rate());
        if let Some(mut timeline) = self.inner.timeline.try_lock() {
            for (i, slot) in out.iter_mut().enumerate() {
                let t = (start_frame + i as u64) as f64 / sample_rate;
                timeline.retire(t);
                *slot = timeline.evaluate(t);
            }
            if let Some(&last) = out.last() {
                self.store(last);
            }
        } else {
            out.fill(self.value());
        }
    }

    fn schedule(&self, ramp: Ramp, value: f32, time: f64) -> &Self {
        if !value.is_finite() || time.is_nan() {
            return self;
        }
        let value = self.inner.units.clamp(value);
        self.inner.timeline.lock().insert(Automation { ramp, time, value });
        self
    }

    #[inline]
    fn store(&self, value: f32) {
        self.inner.value.store(value.to_bits(), Ordering::Release);
    }
}

impl fmt::Debug for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("units", &self.inner.units)
            .field("value", &self.value())
            .finish()
    }
}
