//! End-to-end tests driving the `keybpm` binary

use serde_json::Value;
use std::f32::consts::PI;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn keybpm(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_keybpm"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run keybpm")
}

fn json_lines(bytes: &[u8]) -> Vec<Value> {
    std::str::from_utf8(bytes)
        .unwrap()
        .lines()
        .filter_map(|line| serde_json::from_str(line).ok())
        .collect()
}

fn error_record(output: &Output) -> Value {
    json_lines(&output.stderr)
        .into_iter()
        .find(|v| v.get("error").is_some())
        .expect("stderr should carry an error record")
}

fn write_wav(path: &Path, sample_rate: u32, samples: &[f32]) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for &s in samples {
        writer
            .write_sample((s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)
            .unwrap();
    }
    writer.finalize().unwrap();
}

/// A minor triad with 880 Hz clicks on every beat
fn a_minor_click_track(sample_rate: u32, bpm: f32, secs: f32) -> Vec<f32> {
    let len = (sample_rate as f32 * secs) as usize;
    let mut samples: Vec<f32> = (0..len)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            [220.0f32, 261.63, 329.63]
                .iter()
                .map(|f| (2.0 * PI * f * t).sin() + 0.5 * (4.0 * PI * f * t).sin())
                .sum::<f32>()
                * 0.08
        })
        .collect();

    let beat_samples = 60.0 / bpm * sample_rate as f32;
    let click_len = (sample_rate as f32 * 0.05) as usize;
    let mut beat = 0.0f32;
    while (beat as usize) < len {
        let start = beat as usize;
        for i in 0..click_len.min(len - start) {
            let t = i as f32 / sample_rate as f32;
            let env = (-(i as f32) / (click_len as f32 / 5.0)).exp();
            samples[start + i] += 0.5 * (2.0 * PI * 880.0 * t).sin() * env;
        }
        beat += beat_samples;
    }
    samples
}

fn assert_key_shape(key: &str) {
    if key == "N/A" {
        return;
    }
    let (note, mode) = key.split_once(' ').expect("key should be '<Note> <mode>'");
    let notes = ["C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B"];
    assert!(notes.contains(&note), "unexpected note {}", note);
    assert!(mode == "major" || mode == "minor", "unexpected mode {}", mode);
}

#[test]
fn test_missing_file_fails_with_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("missing.wav");
    let path_str = path.to_str().unwrap();

    let output = keybpm(&[path_str]);

    assert!(!output.status.success());
    assert!(output.stdout.is_empty(), "no result on stdout");
    let record = error_record(&output);
    assert!(record["error"].as_str().unwrap().contains("missing.wav"));
    assert_eq!(record["file_path"], path_str);
}

#[test]
fn test_no_argument_fails() {
    let output = keybpm(&[]);

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    assert_eq!(
        error_record(&output)["error"],
        "No audio file path provided."
    );
}

#[test]
fn test_startup_diagnostics_on_stderr() {
    let output = keybpm(&[]);
    let first = json_lines(&output.stderr)
        .into_iter()
        .next()
        .expect("diagnostics record");
    assert!(first.get("diagnostic_version").is_some());
    assert!(first.get("error").is_none());
}

#[test]
fn test_unsupported_file_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("notes.txt");
    std::fs::write(&path, "this is not audio").unwrap();

    let output = keybpm(&[path.to_str().unwrap()]);

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    assert_eq!(error_record(&output)["file_path"], path.to_str().unwrap());
}

#[test]
fn test_short_clip_has_no_bpm() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("short.wav");
    write_wav(&path, 44100, &a_minor_click_track(44100, 120.0, 1.5));

    let output = keybpm(&[path.to_str().unwrap()]);

    assert!(output.status.success());
    let results = json_lines(&output.stdout);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["bpm"], "N/A");
    assert_key_shape(results[0]["key"].as_str().unwrap());
}

#[test]
fn test_silence_is_not_available() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("silence.wav");
    write_wav(&path, 22050, &vec![0.0; 22050 * 3]);

    let output = keybpm(&[path.to_str().unwrap()]);

    assert!(output.status.success());
    assert_eq!(
        json_lines(&output.stdout),
        vec![serde_json::json!({"bpm": "N/A", "key": "N/A"})]
    );
}

#[test]
fn test_click_track_end_to_end() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("click.wav");
    write_wav(&path, 44100, &a_minor_click_track(44100, 120.0, 10.0));

    let output = keybpm(&[path.to_str().unwrap()]);

    assert!(output.status.success());
    let results = json_lines(&output.stdout);
    assert_eq!(results.len(), 1);

    let bpm = results[0]["bpm"].as_u64().expect("integer bpm");
    assert!((115..=125).contains(&bpm), "expected ~120 BPM, got {}", bpm);
    assert_eq!(results[0]["key"], "A minor");
}
