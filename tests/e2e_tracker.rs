//! E2E tests for the intonation tracker
//!
//! Drives the full per-frame pipeline (detect -> cents -> smooth -> publish)
//! with synthetic vocal input and checks the scenarios the UI and game logic
//! depend on.

use intune_core::audio::signal::SineGenerator;
use intune_core::audio::tracker::{IntonationTracker, TrackerError, TrackerState};
use intune_core::config::TrackerConfig;
use intune_core::music::midi_to_freq;

const SAMPLE_RATE: u32 = 48_000;
const FRAME_LEN: usize = 2048;

fn tracker() -> IntonationTracker {
    IntonationTracker::new(TrackerConfig::default()).unwrap()
}

fn sine_frame(frequency: f64) -> Vec<f32> {
    let mut frame = vec![0.0f32; FRAME_LEN];
    SineGenerator::new(frequency, SAMPLE_RATE).fill_buffer(&mut frame);
    frame
}

/// Singing exactly the target reads as roughly zero cents
#[test]
fn test_in_tune_scenario() {
    let mut t = tracker();
    t.start();
    t.set_target_hz(440.0).unwrap();

    let frame = sine_frame(440.0);
    let mut update = t.tick_frame(&frame).unwrap();
    for _ in 0..10 {
        update = t.tick_frame(&frame).unwrap();
    }

    let cents = update.cents.expect("cents should be computed");
    assert!(cents.abs() < 3.0, "expected ~0 cents, got {:.2}", cents);

    let hz = update.frequency_hz.expect("pitch should be detected");
    assert!((hz - 440.0).abs() < 2.0, "expected ~440 Hz, got {:.2}", hz);
}

/// Singing one semitone sharp reads as roughly +100 cents
#[test]
fn test_semitone_sharp_scenario() {
    let mut t = tracker();
    t.start();
    t.set_target_hz(440.0).unwrap();

    let frame = sine_frame(466.16); // A#4
    let mut cents = 0.0;
    for _ in 0..10 {
        cents = t.tick_frame(&frame).unwrap().cents.unwrap();
    }
    assert!(
        (cents - 100.0).abs() < 5.0,
        "expected ~+100 cents, got {:.2}",
        cents
    );
}

/// A silent frame with a target set yields (None, None)
#[test]
fn test_silent_frame_scenario() {
    let mut t = tracker();
    t.start();
    t.set_target_hz(440.0).unwrap();

    let update = t.tick_frame(&vec![0.0; FRAME_LEN]).unwrap();
    assert_eq!(update.cents, None);
    assert_eq!(update.frequency_hz, None);
}

/// Singing the target an octave away still reads as near-zero deviation
#[test]
fn test_octave_invariance() {
    let mut t = tracker();
    t.start();
    t.set_target_hz(220.0).unwrap();

    for freq in [440.0, 110.0] {
        // Fresh onset per octave: silence in between resets smoothing
        t.tick_frame(&vec![0.0; FRAME_LEN]).unwrap();

        let frame = sine_frame(freq);
        let mut cents = 0.0;
        for _ in 0..10 {
            cents = t.tick_frame(&frame).unwrap().cents.unwrap();
        }
        assert!(
            cents.abs() < 10.0,
            "{} Hz against 220 Hz target should fold near 0 cents, got {:.2}",
            freq,
            cents
        );
    }
}

/// Smoothing does not bridge a silence gap: the first voiced frame after
/// silence reads its own raw value with no residue from earlier history
#[test]
fn test_silence_resets_smoothing() {
    let mut t = tracker();
    t.start();
    t.set_target_hz(440.0).unwrap();

    // Sustain a sharp note so the EMA settles well above zero
    let sharp = sine_frame(midi_to_freq(69.3)); // +30 cents
    let mut settled = 0.0;
    for _ in 0..30 {
        settled = t.tick_frame(&sharp).unwrap().cents.unwrap();
    }
    assert!(settled > 20.0);

    // Silence invalidates the history
    t.tick_frame(&vec![0.0; FRAME_LEN]).unwrap();

    // A flat onset must read flat immediately, not averaged against the
    // pre-silence sharp note
    let flat = sine_frame(midi_to_freq(68.8)); // -20 cents
    let onset = t.tick_frame(&flat).unwrap().cents.unwrap();
    assert!(
        onset < -10.0,
        "onset after silence should read its own value, got {:.2}",
        onset
    );
}

/// Detected pitch with no target set reports frequency but no cents
#[test]
fn test_no_target_scenario() {
    let mut t = tracker();
    t.start();

    let update = t.tick_frame(&sine_frame(330.0)).unwrap();
    assert!(update.cents.is_none());
    assert!(update.frequency_hz.is_some());
}

/// Retargeting mid-stream follows the new reference
#[test]
fn test_retarget_between_questions() {
    let mut t = tracker();
    t.start();
    t.set_target_hz(440.0).unwrap();

    let a4 = sine_frame(440.0);
    for _ in 0..5 {
        t.tick_frame(&a4).unwrap();
    }

    // New question: target moves up a fifth, singer still on A4
    t.set_target_hz(659.25).unwrap(); // E5
    let mut cents = 0.0;
    for _ in 0..30 {
        cents = t.tick_frame(&a4).unwrap().cents.unwrap();
    }
    // A4 vs E5 folds to -700 + 1200 = +500 cents
    assert!(
        (cents - 500.0).abs() < 10.0,
        "expected ~+500 cents, got {:.2}",
        cents
    );
}

/// Lifecycle contract: ticking while idle errors, start/stop are idempotent,
/// stopping drops smoothing history
#[test]
fn test_lifecycle() {
    let mut t = tracker();
    assert_eq!(t.state(), TrackerState::Idle);
    assert_eq!(
        t.tick_frame(&vec![0.0; FRAME_LEN]),
        Err(TrackerError::NotTracking)
    );

    t.start();
    t.set_target_hz(440.0).unwrap();
    let sharp = sine_frame(midi_to_freq(69.4));
    for _ in 0..30 {
        t.tick_frame(&sharp).unwrap();
    }

    t.stop();
    t.stop();
    assert_eq!(t.state(), TrackerState::Idle);

    // Restart begins fresh: first voiced frame reads raw, no pre-stop residue
    t.start();
    let flat = sine_frame(midi_to_freq(68.7));
    let onset = t.tick_frame(&flat).unwrap().cents.unwrap();
    assert!(onset < -15.0, "restart must not inherit history, got {:.2}", onset);
}

/// The update stream delivers the same result the tick call returns
#[test]
fn test_update_stream_matches_returned_updates() {
    let mut t = tracker();
    let rx = t.subscribe();
    t.start();
    t.set_target_hz(440.0).unwrap();

    let mut source = SineGenerator::new(440.0, SAMPLE_RATE);
    let mut returned = Vec::new();
    for _ in 0..5 {
        returned.push(t.tick(&mut source).unwrap());
    }

    let streamed: Vec<_> = rx.try_iter().collect();
    assert_eq!(returned, streamed);
}

/// Target handle works from another thread while the tracker ticks
#[test]
fn test_cross_thread_target() {
    let mut t = tracker();
    t.start();
    let cell = t.target_cell();

    let setter = std::thread::spawn(move || {
        cell.set(523.25).unwrap();
    });
    setter.join().unwrap();

    let update = t.tick_frame(&sine_frame(523.25)).unwrap();
    let cents = update.cents.expect("target set from other thread");
    assert!(cents.abs() < 5.0);
}

/// Rejected configuration surfaces as a constructor error
#[test]
fn test_invalid_config_rejected() {
    let mut config = TrackerConfig::default();
    config.frame_len = 10;
    assert!(IntonationTracker::new(config).is_err());
}
