//! Factory presets bundled with the lumen library.
//!
//! These are embedded at compile time and always available without external
//! files. Each one is a starting point for a common voice character.

use crate::Preset;

/// Names of the factory presets, in listing order.
pub static FACTORY_PRESET_NAMES: &[&str] = &[
    "default",
    "saw-lead",
    "square-bass",
    "sine-pad",
    "pulse-pluck",
];

static FACTORY_PRESETS_TOML: &[(&str, &str)] = &[
    ("default", DEFAULT_PRESET),
    ("saw-lead", SAW_LEAD_PRESET),
    ("square-bass", SQUARE_BASS_PRESET),
    ("sine-pad", SINE_PAD_PRESET),
    ("pulse-pluck", PULSE_PLUCK_PRESET),
];

/// Default voice - triangle with a short attack and long release.
const DEFAULT_PRESET: &str = r#"
name = "Default"
description = "Triangle oscillator with the stock envelope"
sample_rate = 48000
"#;

/// Saw lead - bright, gliding monophonic lead.
const SAW_LEAD_PRESET: &str = r#"
name = "Saw Lead"
description = "Bright sawtooth lead with legato glide"
sample_rate = 48000

[voice]
portamento = 0.05
volume = -6.0

[voice.oscillator]
type = "sawtooth"

[voice.envelope]
attack = 0.01
decay = 0.2
sustain = 0.5
release = 0.3
"#;

/// Square bass - punchy, one octave down, fast decay.
const SQUARE_BASS_PRESET: &str = r#"
name = "Square Bass"
description = "Punchy square bass with a quick decay"
sample_rate = 48000

[voice]
volume = -3.0

[voice.oscillator]
type = "square"
frequency = 110.0

[voice.envelope]
attack = 0.002
decay = 0.15
sustain = 0.4
release = 0.08
"#;

/// Sine pad - slow swell and long tail.
const SINE_PAD_PRESET: &str = r#"
name = "Sine Pad"
description = "Soft sine pad with a slow swell and long tail"
sample_rate = 48000

[voice]
portamento = 0.2
volume = -9.0

[voice.oscillator]
type = "sine"
detune = 5.0

[voice.envelope]
attack = 0.8
decay = 1.0
sustain = 0.7
release = 2.5
"#;

/// Pulse pluck - narrow pulse, no sustain.
const PULSE_PLUCK_PRESET: &str = r#"
name = "Pulse Pluck"
description = "Narrow pulse with a plucked, zero-sustain envelope"
sample_rate = 48000

[voice]
volume = -6.0

[voice.oscillator]
type = "pulse"
width = 0.2

[voice.envelope]
attack = 0.001
decay = 0.25
sustain = 0.0
release = 0.1
"#;

/// All factory presets, parsed.
pub fn factory_presets() -> Vec<Preset> {
    FACTORY_PRESETS_TOML
        .iter()
        .filter_map(|(_, toml)| Preset::from_toml(toml).ok())
        .collect()
}

/// Get a factory preset by id (`"saw-lead"`) or display name (`"Saw Lead"`),
/// case-insensitively.
pub fn get_factory_preset(name: &str) -> Option<Preset> {
    let name_lower = name.to_lowercase();

    if let Some((_, toml)) = FACTORY_PRESETS_TOML
        .iter()
        .find(|(id, _)| *id == name_lower)
    {
        return Preset::from_toml(toml).ok();
    }

    factory_presets()
        .into_iter()
        .find(|preset| preset.name.to_lowercase() == name_lower)
}

/// Factory preset ids.
pub fn factory_preset_names() -> Vec<&'static str> {
    FACTORY_PRESET_NAMES.to_vec()
}

/// Whether `name` refers to a factory preset.
pub fn is_factory_preset(name: &str) -> bool {
    get_factory_preset(name).is_some()
}
