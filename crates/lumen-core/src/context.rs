//! Audio context: sample rate plus the shared audio clock.
//!
//! Every component that schedules against time holds a clone of the same
//! [`AudioContext`]. Clones share one clock, so "now" means the same instant
//! on the control path and the render path.
//!
//! The clock counts rendered frames. The host renders a block starting at
//! [`AudioContext::current_frame`] and then calls [`AudioContext::advance`]
//! with the block length.
//!
//! ```rust
//! use lumen_core::AudioContext;
//!
//! let ctx = AudioContext::new(48000.0).unwrap();
//! assert_eq!(ctx.now(), 0.0);
//!
//! ctx.advance(24000);
//! assert!((ctx.now() - 0.5).abs() < 1e-9);
//!
//! // Omitted times resolve to "now"
//! assert_eq!(ctx.resolve(None), ctx.now());
//! assert_eq!(ctx.resolve(Some(2.0)), 2.0);
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::CoreError;

/// Frame counter shared between all clones of a context.
#[derive(Debug, Default)]
struct AudioClock {
    frame: AtomicU64,
}

/// Sample rate and audio clock shared by a set of components.
#[derive(Debug, Clone)]
pub struct AudioContext {
    sample_rate: f32,
    clock: Arc<AudioClock>,
}

impl AudioContext {
    /// Create a context with its clock at frame zero.
    pub fn new(sample_rate: f32) -> Result<Self, CoreError> {
        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            return Err(CoreError::InvalidSampleRate(sample_rate));
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(sample_rate, "audio context created");
        Ok(Self {
            sample_rate,
            clock: Arc::new(AudioClock::default()),
        })
    }

    /// Sample rate in Hz.
    #[inline]
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Index of the next frame to be rendered.
    #[inline]
    pub fn current_frame(&self) -> u64 {
        self.clock.frame.load(Ordering::Acquire)
    }

    /// Current clock time in seconds.
    #[inline]
    pub fn now(&self) -> f64 {
        self.frames_to_seconds(self.current_frame())
    }

    /// Move the clock forward after a block has been rendered.
    #[inline]
    pub fn advance(&self, frames: u64) {
        self.clock.frame.fetch_add(frames, Ordering::AcqRel);
    }

    /// Resolve an optional scheduling time, defaulting to [`now`](Self::now).
    #[inline]
    pub fn resolve(&self, time: Option<f64>) -> f64 {
        time.unwrap_or_else(|| self.now())
    }

    /// Convert seconds to the nearest frame index. Negative times map to 0.
    #[inline]
    pub fn seconds_to_frames(&self, seconds: f64) -> u64 {
        if seconds.is_nan() || seconds <= 0.0 {
            0
        } else {
            (seconds * f64::from(self.sample_rate)).round() as u64
        }
    }

    /// Convert a frame index to seconds.
    #[inline]
    pub fn frames_to_seconds(&self, frames: u64) -> f64 {
        frames as f64 / f64::from(self.sample_rate)
    }

    /// True if both handles share the same clock.
    pub fn shares_clock_with(&self, other: &AudioContext) -> bool {
        Arc::ptr_eq(&self.clock, &other.clock)
    }
}
