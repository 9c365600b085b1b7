//! Integration tests for lumen-config.
//!
//! These tests verify presets end to end: disk round-trips, validation, and
//! voices built from presets producing sound.

use lumen_config::{
    ConfigError, Preset, ValidationError, factory_presets, get_factory_preset, paths,
};
use lumen_core::render_offline;
use lumen_synth::{Note, OscillatorType};
use tempfile::TempDir;

#[test]
fn preset_save_load_roundtrip() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let preset_path = temp_dir.path().join("nested").join("lead.toml");

    let mut original = Preset::new("Roundtrip Test")
        .with_description("Testing serialization")
        .with_sample_rate(96000);
    original.voice.portamento = 0.08;
    original.voice.oscillator.oscillator_type = OscillatorType::Pulse;
    original.voice.oscillator.width = 0.3;
    original.voice.envelope.sustain = 0.6;

    original.save(&preset_path).expect("should save preset");
    assert!(preset_path.is_file());

    let loaded = Preset::load(&preset_path).expect("should load preset");
    assert_eq!(loaded, original);

    // Listing sees the saved file
    let listed = paths::list_presets_in_dir(preset_path.parent().unwrap());
    assert_eq!(listed, vec![preset_path.clone()]);
    assert_eq!(
        paths::preset_name_from_path(&listed[0]).as_deref(),
        Some("lead")
    );
}

#[test]
fn load_missing_file_reports_path() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("missing.toml");
    match Preset::load(&missing) {
        Err(ConfigError::ReadFile { path, .. }) => assert_eq!(path, missing),
        other => panic!("expected ReadFile error, got {other:?}"),
    }
}

#[test]
fn malformed_file_is_a_parse_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("bad.toml");
    std::fs::write(&path, "name = \"Bad\"\n[voice]\nportamento = \"slow\"\n").unwrap();
    assert!(matches!(Preset::load(&path), Err(ConfigError::TomlParse(_))));
}

#[test]
fn hand_written_preset_builds_a_voice() {
    let toml = r#"
name = "Hand Written"
sample_rate = 44100

[voice]
volume = -12.0

[voice.oscillator]
type = "square"

[voice.envelope]
attack = 0.001
release = 0.05
"#;
    let preset = Preset::from_toml(toml).unwrap();
    let ctx = preset.context().unwrap();
    assert_eq!(ctx.sample_rate(), 44100.0);

    let mut voice = preset.create_voice(&ctx).unwrap();
    assert_eq!(voice.volume().unwrap().value(), -12.0);
    voice
        .trigger_attack_release("C3".parse::<Note>().unwrap(), 0.1, Some(0.0), None)
        .unwrap();
    let audio = render_offline(&ctx, &mut voice, 0.3);

    assert!(audio.iter().all(|s| s.is_finite()));
    assert!(audio[..4410].iter().any(|&s| s.abs() > 0.01));
    assert!(audio[audio.len() - 100..].iter().all(|&s| s == 0.0));
}

#[test]
fn every_factory_preset_plays() {
    for preset in factory_presets() {
        let ctx = preset.context().unwrap();
        let mut voice = preset
            .create_voice(&ctx)
            .unwrap_or_else(|e| panic!("factory preset '{}' failed: {e}", preset.name));
        voice.trigger_note_attack(57_u8, Some(0.0), None).unwrap();
        let audio = render_offline(&ctx, &mut voice, 0.1);
        assert!(
            audio.iter().all(|s| s.is_finite()),
            "preset '{}' produced non-finite output",
            preset.name
        );
        assert!(
            audio.iter().any(|&s| s != 0.0),
            "preset '{}' is silent",
            preset.name
        );
    }
}

#[test]
fn invalid_preset_never_builds() {
    let mut preset = get_factory_preset("sine-pad").unwrap();
    preset.voice.envelope.release = -1.0;
    preset.voice.volume = 100.0;
    let ctx = preset.context().unwrap();

    match preset.create_voice(&ctx) {
        Err(ConfigError::Validation(ValidationError::Multiple(errors))) => {
            assert_eq!(errors.len(), 2)
        }
        other => panic!("expected validation failure, got {other:?}"),
    }
}
