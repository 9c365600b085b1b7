//! Render a short phrase from one voice to a 32-bit float WAV file.
//!
//! Run with: cargo run -p lumen-synth --features tracing --example render_voice [output.wav]
//!
//! Set `RUST_LOG=debug` to see voice lifecycle events.

use std::error::Error;
use std::path::PathBuf;

use hound::{SampleFormat, WavSpec, WavWriter};
use lumen_core::{AudioContext, render_offline};
use lumen_synth::{EnvelopeOptions, Note, OscillatorOptions, OscillatorType, Voice, VoiceOptions};
use tracing_subscriber::EnvFilter;

const SAMPLE_RATE: u32 = 48000;

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::temp_dir().join("lumen_voice.wav"));

    let ctx = AudioContext::new(SAMPLE_RATE as f32)?;
    let mut voice = Voice::new(
        &ctx,
        VoiceOptions {
            portamento: 0.03,
            volume: -6.0,
            oscillator: OscillatorOptions {
                oscillator_type: OscillatorType::Sawtooth,
                ..OscillatorOptions::default()
            },
            envelope: EnvelopeOptions {
                attack: 0.01,
                decay: 0.2,
                sustain: 0.5,
                release: 0.3,
            },
        },
    )?;

    // Legato phrase: one attack, pitch changes glide, one release
    let phrase = ["C4", "Eb4", "G4", "Bb4", "C5"];
    let step = 0.25;
    voice.trigger_note_attack(phrase[0].parse::<Note>()?, Some(0.0), Some(0.8))?;
    let mut audio = render_offline(&ctx, &mut voice, step);
    for name in &phrase[1..] {
        voice.set_note(name.parse::<Note>()?, None)?;
        audio.extend(render_offline(&ctx, &mut voice, step));
    }
    voice.trigger_release(None)?;
    audio.extend(render_offline(&ctx, &mut voice, 0.5));
    voice.dispose()?;

    let spec = WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };
    let mut writer = WavWriter::create(&path, spec)?;
    for &sample in &audio {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;

    let peak = audio.iter().fold(0.0_f32, |m, &s| m.max(s.abs()));
    tracing::info!(
        path = %path.display(),
        frames = audio.len(),
        peak,
        "wrote voice render"
    );

    Ok(())
}
