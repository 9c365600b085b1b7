//! One-pole parameter smoothing for click-free gain changes.
//!
//! [`SmoothedParam`] follows a target value with an exponential (RC-like)
//! response. The output stage uses it to turn per-block volume reads into a
//! per-sample gain without zipper noise.
//!
//! ```rust
//! use lumen_core::SmoothedParam;
//!
//! let mut gain = SmoothedParam::with_config(0.0, 48000.0, 5.0);
//! gain.set_target(1.0);
//! for _ in 0..4800 {
//!     gain.advance();
//! }
//! assert!((gain.get() - 1.0).abs() < 0.01);
//! ```

use libm::expf;

/// Smoothing time used by output stages, in milliseconds.
pub const DEFAULT_SMOOTHING_MS: f32 = 5.0;

/// A value that glides toward its target one sample at a time.
#[derive(Debug, Clone)]
pub struct SmoothedParam {
    current: f32,
    target: f32,
    /// 1.0 = instant, smaller = slower
    coeff: f32,
    sample_rate: f32,
    smoothing_time_ms: f32,
}

impl SmoothedParam {
    /// Create a parameter with smoothing disabled.
    pub fn new(initial: f32) -> Self {
        Self {
            current: initial,
            target: initial,
            coeff: 1.0,
            sample_rate: 48000.0,
            smoothing_time_ms: 0.0,
        }
    }

    /// Create a parameter with the given sample rate and time constant.
    pub fn with_config(initial: f32, sample_rate: f32, smoothing_time_ms: f32) -> Self {
        let mut param = Self::new(initial);
        param.sample_rate = sample_rate;
        param.smoothing_time_ms = smoothing_time_ms;
        param.recalculate_coeff();
        param
    }

    /// Set the value to glide toward.
    #[inline]
    pub fn set_target(&mut self, target: f32) {
        self.target = target;
    }

    /// Jump to `value` with no glide.
    #[inline]
    pub fn set_immediate(&mut self, value: f32) {
        self.target = value;
        self.current = value;
    }

    /// Advance one sample and return the smoothed value.
    #[inline]
    pub fn advance(&mut self) -> f32 {
        self.current += self.coeff * (self.target - self.current);
        self.current
    }

    /// Current value without advancing.
    #[inline]
    pub fn get(&self) -> f32 {
        self.current
    }

    /// Target value.
    #[inline]
    pub fn target(&self) -> f32 {
        self.target
    }

    /// True once the value is within 1e-6 of the target.
    #[inline]
    pub fn is_settled(&self) -> bool {
        (self.current - self.target).abs() < 1e-6
    }

    // coeff = 1 - exp(-1 / (tau * sample_rate)), tau in seconds
    fn recalculate_coeff(&mut self) {
        if self.smoothing_time_ms <= 0.0 || self.sample_rate <= 0.0 {
            self.coeff = 1.0;
        } else {
            let samples = self.smoothing_time_ms / 1000.0 * self.sample_rate;
            self.coeff = 1.0 - expf(-1.0 / samples);
        }
    }
}

impl Default for SmoothedParam {
    fn default() -> Self {
        Self::new(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instant_without_smoothing() {
        let mut param = SmoothedParam::new(1.0);
        param.set_target(0.5);
        assert!((param.advance() - 0.5).abs() < 1e-6);
        assert!(param.is_settled());
    }

    #[test]
    fn one_time_constant_reaches_63_percent() {
        let mut param = SmoothedParam::with_config(0.0, 48000.0, 10.0);
        param.set_target(1.0);
        for _ in 0..480 {
            param.advance();
        }
        let expected = 1.0 - expf(-1.0);
        assert!(
            (param.get() - expected).abs() < 0.05,
            "expected ~{expected}, got {}",
            param.get()
        );
    }

    #[test]
    fn set_immediate_skips_glide() {
        let mut param = SmoothedParam::with_config(0.0, 48000.0, 50.0);
        param.set_immediate(0.25);
        assert_eq!(param.get(), 0.25);
        assert_eq!(param.target(), 0.25);
    }
}
