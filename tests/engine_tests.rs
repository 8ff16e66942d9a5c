mod common;

use std::fs;
use std::thread;
use std::time::{Duration, Instant};

use approx::assert_relative_eq;
use common::*;
use neonsynth::{ContextState, EngineConfig, LoadOutcome, TrackInput};

#[test]
fn test_frequency_data_empty_until_initialized() {
    let (mut engine, _handle) = offline_engine();
    assert!(engine.get_frequency_data().is_empty());
    assert_eq!(engine.get_state(), None);

    engine.ensure_initialized().unwrap();
    assert_eq!(engine.get_frequency_data().len(), 256);
    assert_eq!(engine.get_state(), Some(ContextState::Running));
}

#[test]
fn test_calls_before_init_are_noops() {
    let (mut engine, handle) = offline_engine();
    engine.pause();
    engine.resume();
    assert_eq!(engine.get_state(), None);
    assert!(!handle.is_open());
    assert_eq!(engine.current_time(), 0.0);
    assert_eq!(engine.active_voice_count(), 0);
}

#[test]
fn test_init_is_idempotent() {
    let (mut engine, handle) = offline_engine();
    engine.ensure_initialized().unwrap();
    engine.play_synth(0.3);
    engine.ensure_initialized().unwrap();
    engine.ensure_initialized().unwrap();

    // Same graph: the voice survived the repeated calls.
    assert_eq!(engine.active_voice_count(), 1);
    assert!(handle.is_open());
    assert_eq!(engine.sample_rate(), Some(SAMPLE_RATE as f32));
}

#[test]
fn test_failed_init_is_retried() {
    let (mut engine, handle) = offline_engine();
    handle.refuse_open(true);

    assert!(engine.ensure_initialized().is_err());
    assert_eq!(engine.play_synth(0.25), 2);
    assert!(!engine.play_track(TrackInput::bytes("a.wav", sine_wav(440.0, 0.1, 0.1))));
    assert_eq!(engine.get_state(), None);

    handle.refuse_open(false);
    assert!(engine.play_track(TrackInput::bytes("a.wav", sine_wav(440.0, 0.1, 0.1))));
    assert_eq!(engine.get_state(), Some(ContextState::Running));
}

#[test]
fn test_play_synth_index_in_range() {
    let (mut engine, _handle) = offline_engine();
    for (x, expected) in [(0.0, 0), (0.05, 0), (0.1, 1), (0.55, 5), (0.7, 7), (0.999, 9)] {
        assert_eq!(engine.play_synth(x), expected, "x = {}", x);
    }
    assert_eq!(engine.active_voice_count(), 6);
}

#[test]
fn test_play_synth_out_of_range_uses_fallback() {
    let (mut engine, _handle) = offline_engine();
    let index = engine.play_synth(1.0);
    assert_eq!(index, 10);
    assert_eq!(engine.pitch_table().frequency(index), 440.0);

    let index = engine.play_synth(-0.25);
    assert_eq!(index, -3);
    assert_eq!(engine.pitch_table().frequency(index), 440.0);

    assert_eq!(engine.play_synth(f32::NAN), -1);
    // Every call still sounds.
    assert_eq!(engine.active_voice_count(), 3);
}

#[test]
fn test_play_synth_resumes_suspended_context() {
    let (mut engine, handle) = offline_engine();
    engine.ensure_initialized().unwrap();
    engine.pause();
    assert_eq!(engine.get_state(), Some(ContextState::Suspended));
    assert!(!handle.is_running());

    assert_eq!(engine.play_synth(0.05), 0);
    assert_eq!(engine.get_state(), Some(ContextState::Running));
    assert!(handle.is_running());
}

#[test]
fn test_pause_resume_transitions() {
    let (mut engine, handle) = offline_engine();
    engine.ensure_initialized().unwrap();
    handle.render(480);
    assert_relative_eq!(engine.current_time(), 0.01);

    engine.pause();
    assert_eq!(engine.get_state(), Some(ContextState::Suspended));
    engine.pause();
    assert_eq!(engine.get_state(), Some(ContextState::Suspended));

    // A suspended context does not advance its clock.
    handle.render(480);
    assert_relative_eq!(engine.current_time(), 0.01);

    engine.resume();
    assert_eq!(engine.get_state(), Some(ContextState::Running));
    handle.render(480);
    assert_relative_eq!(engine.current_time(), 0.02);
}

#[test]
fn test_device_loss_closes_context() {
    let (mut engine, handle) = offline_engine();
    engine.ensure_initialized().unwrap();
    handle.fail();
    assert_eq!(engine.get_state(), Some(ContextState::Closed));

    engine.resume();
    assert_eq!(engine.get_state(), Some(ContextState::Closed));
    engine.pause();
    assert_eq!(engine.get_state(), Some(ContextState::Closed));
}

#[test]
fn test_play_track_from_bytes_loops_into_output() {
    let (mut engine, handle) = offline_engine();
    assert!(engine.play_track(TrackInput::bytes("tone.wav", sine_wav(440.0, 0.05, 0.2))));
    assert!(engine.current_source().is_some());

    // Render well past the 50 ms buffer; looping keeps it audible.
    handle.render(SAMPLE_RATE as usize / 5);
    let tail = handle.render(1024);
    assert!(peak(&tail) > 0.1);
}

#[test]
fn test_second_track_replaces_first() {
    let (mut engine, _handle) = offline_engine();
    assert!(engine.play_track(TrackInput::bytes("a.wav", sine_wav(220.0, 0.1, 0.1))));
    let first = engine.current_source().unwrap();
    assert!(engine.play_track(TrackInput::bytes("b.wav", sine_wav(330.0, 0.1, 0.1))));
    let second = engine.current_source().unwrap();

    assert_ne!(first, second);
    assert!(!engine.is_source_connected(first));
    assert!(engine.is_source_connected(second));
}

#[test]
fn test_at_most_one_source_across_loads() {
    let (mut engine, _handle) = offline_engine();
    let mut seen = Vec::new();
    for i in 0..5 {
        let ok = engine.play_track(TrackInput::bytes(
            format!("{}.wav", i),
            sine_wav(200.0 + 50.0 * i as f32, 0.05, 0.1),
        ));
        assert!(ok);
        seen.push(engine.current_source().unwrap());
        let connected = seen.iter().filter(|id| engine.is_source_connected(**id)).count();
        assert_eq!(connected, 1);
    }
}

#[test]
fn test_undecodable_bytes_fail_cleanly() {
    let (mut engine, _handle) = offline_engine();
    assert!(engine.play_track(TrackInput::bytes("good.wav", sine_wav(220.0, 0.1, 0.1))));
    let good = engine.current_source().unwrap();

    assert!(!engine.play_track(TrackInput::bytes("junk.mp3", vec![0x13; 2048])));
    assert_eq!(engine.current_source(), None);
    // The previous track was stopped before the failed load.
    assert!(!engine.is_source_connected(good));
    assert_eq!(engine.get_state(), Some(ContextState::Running));

    assert!(engine.play_track(TrackInput::bytes("again.wav", sine_wav(220.0, 0.1, 0.1))));
    assert!(engine.current_source().is_some());
}

#[test]
fn test_locator_resolves_against_asset_root() {
    let dir = fixture_dir("assets");
    fs::write(dir.join("loop.wav"), sine_wav(440.0, 0.1, 0.1)).unwrap();

    let config = EngineConfig {
        asset_root: Some(dir.clone()),
        ..EngineConfig::default()
    };
    let (mut engine, _handle) = offline_engine_with(config);
    assert!(engine.play_track(TrackInput::locator("/loop.wav")));
    assert!(!engine.play_track(TrackInput::locator("/missing.wav")));
    assert_eq!(engine.current_source(), None);

    fs::remove_dir_all(dir).ok();
}

#[test]
fn test_superseded_load_is_dropped() {
    let (mut engine, _handle) = offline_engine();
    let first = engine
        .begin_track_load(TrackInput::bytes("a.wav", sine_wav(220.0, 0.2, 0.1)))
        .unwrap();
    let second = engine
        .begin_track_load(TrackInput::bytes("b.wav", sine_wav(330.0, 0.2, 0.1)))
        .unwrap();

    assert_eq!(engine.finish_track_load(first), LoadOutcome::Superseded);
    assert_eq!(engine.current_source(), None);

    let LoadOutcome::Playing(id) = engine.finish_track_load(second) else {
        panic!("newest load should play");
    };
    assert!(engine.is_source_connected(id));
    assert_eq!(engine.current_source(), Some(id));
}

#[test]
fn test_background_load_failure_reports_failed() {
    let (mut engine, _handle) = offline_engine();
    let pending = engine
        .begin_track_load(TrackInput::bytes("junk", vec![1, 2, 3]))
        .unwrap();
    assert_eq!(pending.name(), "junk");
    assert_eq!(engine.finish_track_load(pending), LoadOutcome::Failed);
    assert_eq!(engine.current_source(), None);
}

#[test]
fn test_track_tone_shows_in_spectrum() {
    let (mut engine, handle) = offline_engine();
    // 1500 Hz sits on bin 16 at 48 kHz with a 512-point FFT.
    assert!(engine.play_track(TrackInput::bytes("tone.wav", sine_wav(1500.0, 1.0, 0.05))));

    for _ in 0..20 {
        handle.render(512);
        engine.get_frequency_data();
    }
    let spectrum = engine.get_frequency_data().to_vec();
    let peak_bin = spectrum
        .iter()
        .enumerate()
        .max_by_key(|(_, v)| **v)
        .map(|(i, _)| i)
        .unwrap();
    assert_eq!(peak_bin, 16);
    assert!(spectrum[16] > 150);
    assert!(spectrum[200] < spectrum[16] / 2);
}

#[test]
fn test_synth_voices_are_not_analysed() {
    let (mut engine, handle) = offline_engine();
    engine.play_synth(0.5);
    for _ in 0..10 {
        handle.render(512);
    }
    assert!(engine.get_frequency_data().iter().all(|v| *v == 0));
    assert_eq!(engine.bass_energy(), 0.0);
}

#[test]
fn test_voice_released_after_note_and_echo_tail() {
    let (mut engine, handle) = offline_engine();
    engine.play_synth(0.45);
    assert_eq!(engine.active_voice_count(), 1);

    let note = handle.render(SAMPLE_RATE as usize);
    assert!(peak(&note) > 0.1);
    assert_eq!(engine.active_voice_count(), 0);

    // The echo bus still repeats the note after the voice is gone.
    let tail = handle.render(SAMPLE_RATE as usize / 4);
    assert!(peak(&tail) > 0.0);

    // Feedback below one dies away.
    handle.render(SAMPLE_RATE as usize * 4);
    let silence = handle.render(1024);
    assert!(peak(&silence) < 1e-3);
}

#[test]
fn test_repeated_frequency_reads_without_rendering_match() {
    let (mut engine, handle) = offline_engine();
    assert!(engine.play_track(TrackInput::bytes("tone.wav", sine_wav(1500.0, 1.0, 0.05))));
    handle.render(512);

    let first = engine.get_frequency_data().to_vec();
    let second = engine.get_frequency_data().to_vec();
    let bass = engine.bass_energy();
    let third = engine.get_frequency_data().to_vec();
    assert_eq!(first, second);
    assert_eq!(second, third);
    assert!(first[16] > 0);
    assert_relative_eq!(bass, neonsynth::audio::bass_energy(&first, 20));

    // New audio moves the smoothed spectrum on.
    handle.render(512);
    assert!(engine.get_frequency_data()[16] > first[16]);
}

#[test]
fn test_loud_track_and_clicks_keep_their_peaks() {
    let track = sine_wav(440.0, 0.5, 0.99);

    let (mut alone, alone_handle) = offline_engine();
    assert!(alone.play_track(TrackInput::bytes("loud.wav", track.clone())));
    let track_only = alone_handle.render(4800);

    let (mut mixed, mixed_handle) = offline_engine();
    assert!(mixed.play_track(TrackInput::bytes("loud.wav", track)));
    mixed.play_synth(0.5);
    mixed.play_synth(0.5);
    let with_clicks = mixed_handle.render(4800);

    assert!(peak(&with_clicks) > peak(&track_only));
    assert!(peak(&with_clicks) <= 1.0);
}

#[test]
fn test_closed_context_does_not_collect_voices() {
    let (mut engine, handle) = offline_engine();
    engine.ensure_initialized().unwrap();
    handle.fail();

    for _ in 0..5 {
        assert_eq!(engine.play_synth(0.35), 3);
    }
    assert_eq!(engine.active_voice_count(), 0);
    assert_eq!(engine.get_state(), Some(ContextState::Closed));
}

#[test]
fn test_pending_load_becomes_ready() {
    let (mut engine, _handle) = offline_engine();
    let pending = engine
        .begin_track_load(TrackInput::bytes("a.wav", sine_wav(220.0, 0.1, 0.1)))
        .unwrap();

    let deadline = Instant::now() + Duration::from_secs(10);
    while !pending.is_ready() {
        assert!(Instant::now() < deadline, "load never finished");
        thread::sleep(Duration::from_millis(1));
    }
    assert!(matches!(engine.finish_track_load(pending), LoadOutcome::Playing(_)));
}
