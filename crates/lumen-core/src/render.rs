//! Offline rendering.

use crate::context::AudioContext;
use crate::graph::Source;

/// Block size used by [`render_offline`], matching a typical host quantum.
pub const RENDER_QUANTUM: usize = 128;

/// Render `seconds` of audio from `source`, advancing the context clock.
///
/// Rendering starts at the context's current frame and proceeds in blocks
/// of [`RENDER_QUANTUM`], advancing the clock after each block exactly as a
/// real-time host would. Non-positive durations yield an empty buffer.
///
/// ```rust
/// use lumen_core::{AudioContext, Source, render_offline};
///
/// struct Dc;
/// impl Source for Dc {
///     fn render(&mut self, out: &mut [f32], _start_frame: u64) {
///         out.fill(0.25);
///     }
/// }
///
/// let ctx = AudioContext::new(1000.0).unwrap();
/// let audio = render_offline(&ctx, &mut Dc, 0.5);
/// assert_eq!(audio.len(), 500);
/// assert_eq!(ctx.current_frame(), 500);
/// ```
pub fn render_offline<S: Source + ?Sized>(
    context: &AudioContext,
    source: &mut S,
    seconds: f64,
) -> Vec<f32> {
    let total = context.seconds_to_frames(seconds) as usize;
    let mut audio = vec![0.0; total];
    for block in audio.chunks_mut(RENDER_QUANTUM) {
        let start = context.current_frame();
        source.render(block, start);
        context.advance(block.len() as u64);
    }
    audio
}
