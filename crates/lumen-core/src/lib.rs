//! Lumen Core - host primitives for a real-time synthesizer voice
//!
//! This crate provides the engine pieces a voice is built on: a shared audio
//! clock, schedulable control signals, read-only member cells, and the
//! render-path traits.
//!
//! # Core Abstractions
//!
//! ## Timing
//!
//! - [`AudioContext`] - Sample rate plus a frame clock shared by all clones
//! - [`render_offline`] - Render a [`Source`] for a duration, advancing the clock
//!
//! ## Control Signals
//!
//! - [`Signal`] - Control parameter with immediate and scheduled writes;
//!   clones are live aliases of one parameter
//! - [`SignalUnits`] - Value range of a signal (Hz, cents, dB, gain)
//! - [`SmoothedParam`] - One-pole smoothing for click-free gain changes
//!
//! ## Signal Graph
//!
//! - [`Source`] - Produces audio into a block
//! - [`Processor`] - Transforms a block in place
//! - [`Port`] - Connection state of a node
//! - [`Output`] - Final gain stage with a volume signal in dB
//!
//! ## Ownership
//!
//! - [`Protected`] - Member cell that rejects reassignment while read-only
//!
//! ## Utilities
//!
//! - Math functions: [`db_to_linear`], [`linear_to_db`], [`cents_to_ratio`]
//!
//! # Example
//!
//! ```rust
//! use lumen_core::{AudioContext, Signal, SignalUnits};
//!
//! let ctx = AudioContext::new(48000.0).unwrap();
//! let volume = Signal::new(&ctx, SignalUnits::Decibels, 0.0);
//!
//! // Fade out over one second, starting now
//! volume.set_value_at_time(0.0, ctx.now());
//! volume.linear_ramp_to_value_at_time(-60.0, ctx.now() + 1.0);
//! assert!((volume.value_at_time(0.5) + 30.0).abs() < 1e-3);
//! ```
//!
//! # Design Principles
//!
//! - **Real-time safe**: No allocation, locking or waiting on the render path
//! - **Sample accurate**: Scheduled events land on their exact frame
//! - **Shared, not copied**: Signals are handles, so aliases stay in sync

pub mod context;
pub mod error;
pub mod graph;
pub mod math;
pub mod param;
pub mod protected;
pub mod render;
pub mod signal;

// Re-export main types at crate root
pub use context::AudioContext;
pub use error::CoreError;
pub use graph::{MAX_BLOCK_SIZE, Output, Port, Processor, Source};
pub use math::{cents_to_ratio, db_to_linear, linear_to_db};
pub use param::{DEFAULT_SMOOTHING_MS, SmoothedParam};
pub use protected::Protected;
pub use render::{RENDER_QUANTUM, render_offline};
pub use signal::{MIN_EXPONENTIAL_VALUE, Signal, SignalUnits};
