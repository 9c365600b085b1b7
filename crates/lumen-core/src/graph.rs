//! Signal-graph traits and the output gain stage.
//!
//! A [`Source`] produces audio (an oscillator, a whole voice); a
//! [`Processor`] transforms a block in place (an envelope, a gain stage).
//! Both receive the absolute frame index of the first sample so scheduled
//! events land on the exact frame they were scheduled for.
//!
//! Implementations must not allocate, lock or block inside `render` /
//! `process`.

use crate::context::AudioContext;
use crate::math::db_to_linear;
use crate::param::{DEFAULT_SMOOTHING_MS, SmoothedParam};
use crate::signal::{Signal, SignalUnits};

/// Largest block rendered in one pass. Longer buffers are split.
pub const MAX_BLOCK_SIZE: usize = 512;

/// Something that writes audio into a buffer.
pub trait Source {
    /// Overwrite `out` with audio for frames `start_frame..start_frame + out.len()`.
    fn render(&mut self, out: &mut [f32], start_frame: u64);
}

/// Something that transforms audio in place.
pub trait Processor {
    /// Process `buffer`, whose first sample is frame `start_frame`.
    fn process(&mut self, buffer: &mut [f32], start_frame: u64);
}

/// Connection state of a node's output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Port {
    /// Output is not routed anywhere; the node contributes silence.
    #[default]
    Disconnected,
    /// Output feeds the next node in the chain.
    Connected,
}

impl Port {
    /// True when connected.
    #[inline]
    pub fn is_connected(self) -> bool {
        self == Port::Connected
    }
}

/// Final gain stage with a volume control in decibels.
///
/// The volume [`Signal`] is read once per frame and turned into a smoothed
/// linear gain, so volume changes never click.
///
/// ```rust
/// use lumen_core::{AudioContext, Output, Processor};
///
/// let ctx = AudioContext::new(48000.0).unwrap();
/// let mut out = Output::new(&ctx, -6.0);
/// let mut block = [1.0_f32; 64];
/// out.process(&mut block, 0);
/// assert!((block[63] - 0.501).abs() < 0.01);
/// ```
#[derive(Debug)]
pub struct Output {
    volume: Signal,
    gain: SmoothedParam,
    scratch: Box<[f32]>,
    port: Port,
}

impl Output {
    /// Create a connected output stage at `volume_db`.
    pub fn new(context: &AudioContext, volume_db: f32) -> Self {
        let mut gain =
            SmoothedParam::with_config(1.0, context.sample_rate(), DEFAULT_SMOOTHING_MS);
        gain.set_immediate(db_to_linear(volume_db));
        Self {
            volume: Signal::new(context, SignalUnits::Decibels, volume_db),
            gain,
            scratch: vec![0.0; MAX_BLOCK_SIZE].into_boxed_slice(),
            port: Port::Connected,
        }
    }

    /// Volume in dB. Clones of the returned signal are live aliases.
    pub fn volume(&self) -> &Signal {
        &self.volume
    }

    /// Connection state.
    pub fn port(&self) -> Port {
        self.port
    }

    /// Route the output again after [`disconnect`](Self::disconnect).
    pub fn connect(&mut self) {
        self.port = Port::Connected;
    }

    /// Silence the output.
    pub fn disconnect(&mut self) {
        self.port = Port::Disconnected;
    }

    /// Disconnect and cancel any scheduled volume automation.
    pub fn dispose(&mut self) {
        #[cfg(feature = "tracing")]
        tracing::debug!("output stage disposed");
        self.disconnect();
        self.volume.cancel_scheduled_values(0.0);
    }
}

impl Processor for Output {
    fn process(&mut self, buffer: &mut [f32], start_frame: u64) {
        if !self.port.is_connected() {
            buffer.fill(0.0);
            return;
        }

        let mut frame = start_frame;
        for chunk in buffer.chunks_mut(MAX_BLOCK_SIZE) {
            let levels = &mut self.scratch[..chunk.len()];
            self.volume.fill_block(frame, levels);
            for (sample, &db) in chunk.iter_mut().zip(levels.iter()) {
                self.gain.set_target(db_to_linear(db));
                *sample *= self.gain.advance();
            }
            frame += chunk.len() as u64;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> AudioContext {
        AudioContext::new(48000.0).unwrap()
    }

    #[test]
    fn unity_at_zero_db() {
        let mut out = Output::new(&ctx(), 0.0);
        let mut block = [0.5_f32; 32];
        out.process(&mut block, 0);
        assert!(block.iter().all(|&s| (s - 0.5).abs() < 1e-6));
    }

    #[test]
    fn disconnected_output_is_silent() {
        let mut out = Output::new(&ctx(), 0.0);
        out.disconnect();
        assert_eq!(out.port(), Port::Disconnected);
        let mut block = [1.0_f32; 16];
        out.process(&mut block, 0);
        assert!(block.iter().all(|&s| s == 0.0));

        out.connect();
        let mut block = [1.0_f32; 16];
        out.process(&mut block, 16);
        assert!(block.iter().all(|&s| s > 0.99));
    }

    #[test]
    fn volume_change_is_smoothed() {
        let mut out = Output::new(&ctx(), 0.0);
        out.volume().set_value(-60.0);
        let mut block = [1.0_f32; 2048];
        out.process(&mut block, 0);
        // First sample moves only a little, tail has settled
        assert!(block[0] > 0.9);
        assert!(block[2047] < 0.01);
        // Monotonic fade
        assert!(block.windows(2).all(|w| w[1] <= w[0] + 1e-6));
    }

    #[test]
    fn handles_blocks_longer_than_scratch() {
        let mut out = Output::new(&ctx(), -6.0);
        let mut block = vec![1.0_f32; MAX_BLOCK_SIZE * 3 + 7];
        out.process(&mut block, 0);
        let expected = db_to_linear(-6.0);
        assert!(block.iter().all(|&s| (s - expected).abs() < 1e-4));
    }

    #[test]
    fn dispose_silences_and_clears_automation() {
        let mut out = Output::new(&ctx(), 0.0);
        out.volume().linear_ramp_to_value_at_time(-12.0, 1.0);
        out.dispose();
        assert!(!out.volume().has_scheduled_values());
        assert!(!out.port().is_connected());
    }
}
