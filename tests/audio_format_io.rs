use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use kooledit::{EngineError, PlaybackEngine, PositionKind, SampleMatrix};

fn make_temp_dir(tag: &str) -> PathBuf {
    static NEXT_ID: AtomicU64 = AtomicU64::new(1);
    let now_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    let seq = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    let mut dir = std::env::temp_dir();
    dir.push(format!(
        "kooledit_{tag}_{}_{}_{}",
        std::process::id(),
        now_ms,
        seq
    ));
    std::fs::create_dir_all(&dir).expect("create temp test dir");
    dir
}

fn synth_stereo(sr: u32, secs: f32) -> Vec<Vec<f32>> {
    let frames = ((sr as f32) * secs).max(1.0) as usize;
    let mut left = Vec::with_capacity(frames);
    let mut right = Vec::with_capacity(frames);
    for i in 0..frames {
        let t = (i as f32) / (sr as f32);
        left.push((t * 440.0 * std::f32::consts::TAU).sin() * 0.25);
        right.push((t * 660.0 * std::f32::consts::TAU).sin() * 0.20);
    }
    vec![left, right]
}

#[test]
fn save_writes_24_bit_wav_that_loads_back() {
    let dir = make_temp_dir("save_24bit");
    let path = dir.join("tone.wav");
    let chans = synth_stereo(44_100, 0.20);

    let mut engine = PlaybackEngine::default();
    engine.load_buffer(
        SampleMatrix::from_channels(chans.clone()).expect("matrix"),
        44_100,
    );
    engine.save_file(&path).expect("save");

    let info = kooledit::audio_io::read_audio_info(&path).expect("probe");
    assert_eq!(info.channels, 2);
    assert_eq!(info.sample_rate, 44_100);
    assert_eq!(info.bits_per_sample, 24);

    let mut reloaded = PlaybackEngine::default();
    reloaded.load_file(&path).expect("load");
    assert_eq!(reloaded.sample_rate(), 44_100);
    assert_eq!(reloaded.num_channels(), 2);
    assert_eq!(reloaded.num_samples(), chans[0].len());
    let snapshot = reloaded.snapshot().expect("buffer");
    for (ch, original) in chans.iter().enumerate() {
        for (a, b) in snapshot.channel(ch).iter().zip(original) {
            assert!((a - b).abs() < 1e-5, "ch{ch}: {a} vs {b}");
        }
    }
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn edit_and_save_round_trip_keeps_the_edit() {
    let dir = make_temp_dir("edit_save");
    let path = dir.join("edited.wav");
    let mut engine = PlaybackEngine::default();
    engine.load_buffer(SampleMatrix::from_mono(vec![0.5; 1000]), 8000);
    engine.set_position_samples(PositionKind::MarkerStart, 100);
    engine.set_position_samples(PositionKind::MarkerEnd, 199);
    engine.delete_marked_region().expect("delete");
    engine.save_file(&path).expect("save");

    let decoded = kooledit::audio_io::decode_audio_multi(&path).expect("decode");
    assert_eq!(decoded.sample_rate, 8000);
    assert_eq!(decoded.channel_count(), 1);
    assert_eq!(decoded.channels[0].len(), 900);
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn failed_load_keeps_the_current_buffer() {
    let dir = make_temp_dir("load_failed");
    let bogus = dir.join("not_audio.wav");
    std::fs::write(&bogus, b"definitely not a riff header").expect("write bogus file");

    let mut engine = PlaybackEngine::default();
    engine.load_buffer(SampleMatrix::from_mono(vec![0.25; 64]), 1000);
    let before = engine.snapshot().expect("buffer");

    let err = engine.load_file(&bogus).expect_err("bogus file must fail");
    assert!(matches!(err, EngineError::LoadFailed { .. }));
    let missing = engine
        .load_file(&dir.join("missing.wav"))
        .expect_err("missing file must fail");
    assert!(matches!(missing, EngineError::LoadFailed { .. }));

    let after = engine.snapshot().expect("buffer");
    assert_eq!(*before, *after);
    assert_eq!(engine.sample_rate(), 1000);
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn save_without_buffer_is_rejected() {
    let dir = make_temp_dir("no_buffer");
    let engine = PlaybackEngine::default();
    let err = engine
        .save_file(&dir.join("out.wav"))
        .expect_err("nothing to save");
    assert!(matches!(err, EngineError::NoBuffer));
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn supported_extensions_are_case_insensitive() {
    use kooledit::audio_io::is_supported_audio_path;
    assert!(is_supported_audio_path(std::path::Path::new("a/B.WAV")));
    assert!(is_supported_audio_path(std::path::Path::new("x.mp3")));
    assert!(!is_supported_audio_path(std::path::Path::new("notes.txt")));
    assert!(!is_supported_audio_path(std::path::Path::new("noext")));
}
