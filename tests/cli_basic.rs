//! Integration tests for basic CLI behavior.
//!
//! Tests that the binary exists, accepts standard flags, and each subcommand
//! responds to `--help` with appropriate text.

#![allow(deprecated)] // cargo_bin deprecation, replacement not yet stable

use assert_cmd::Command;
use predicates::prelude::*;

/// Helper: get a Command for the `beanflow` binary.
fn beanflow() -> Command {
    Command::cargo_bin("beanflow").expect("binary 'beanflow' should be built")
}

// ─── Top-level flags ─────────────────────────────────────────────────────────

#[test]
fn help_flag_shows_usage() {
    beanflow()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage: beanflow"))
        .stdout(predicate::str::contains("generate"))
        .stdout(predicate::str::contains("check"))
        .stdout(predicate::str::contains("slides"))
        .stdout(predicate::str::contains("--output-dir"));
}

#[test]
fn short_help_flag_shows_usage() {
    beanflow()
        .arg("-h")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage: beanflow"));
}

#[test]
fn version_flag_shows_semver() {
    beanflow()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"^beanflow \d+\.\d+\.\d+\n$").unwrap());
}

#[test]
fn unknown_subcommand_fails() {
    beanflow()
        .arg("render-everything")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

// ─── Subcommand help ─────────────────────────────────────────────────────────

#[test]
fn generate_help_lists_flags() {
    beanflow()
        .args(["generate", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--no-prompt"))
        .stdout(predicate::str::contains("--keep-work"))
        .stdout(predicate::str::contains("--text"));
}

#[test]
fn slides_help_lists_flags() {
    beanflow()
        .args(["slides", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--dir"))
        .stdout(predicate::str::contains("--text"));
}

#[test]
fn check_help() {
    beanflow()
        .args(["check", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ffmpeg"));
}

// ─── Slides ──────────────────────────────────────────────────────────────────

#[test]
fn slides_writes_one_png_per_sentence() {
    let dir = tempfile::tempdir().unwrap();
    let slides = dir.path().join("slides");

    beanflow()
        .args(["slides", "--text", "Fresh beans. Faster lines."])
        .arg("--dir")
        .arg(&slides)
        .assert()
        .success()
        .stdout(predicate::str::contains("slide_000.png"))
        .stdout(predicate::str::contains("slide_001.png"));

    assert!(slides.join("slide_000.png").is_file());
    assert!(slides.join("slide_001.png").is_file());
    assert!(!slides.join("slide_002.png").exists());
}

#[test]
fn slides_rejects_bad_config() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    std::fs::write(&config, "output_dir = [").unwrap();

    beanflow()
        .arg("slides")
        .arg("--config")
        .arg(&config)
        .assert()
        .failure();
}

// ─── Check ───────────────────────────────────────────────────────────────────

#[test]
fn check_reports_missing_ffmpeg() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    std::fs::write(
        &config,
        "[encoder]\nffmpeg_path = \"/nonexistent/ffmpeg-beanflow\"\nffprobe_path = \"/nonexistent/ffprobe-beanflow\"\n",
    )
    .unwrap();

    beanflow()
        .arg("check")
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("ffmpeg: not found (/nonexistent/ffmpeg-beanflow)"))
        .stdout(predicate::str::contains("ffprobe: not found"));
}
