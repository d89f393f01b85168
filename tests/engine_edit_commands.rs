use std::sync::{Arc, Mutex};

use kooledit::{EditorEvent, EventChannel, PlaybackEngine, PositionKind, SampleMatrix};

fn engine_with(channels: Vec<Vec<f32>>, sample_rate: u32) -> PlaybackEngine {
    let mut engine = PlaybackEngine::default();
    let matrix = SampleMatrix::from_channels(channels).expect("matrix");
    engine.load_buffer(matrix, sample_rate);
    engine
}

fn ramp(len: usize) -> Vec<f32> {
    (0..len).map(|i| i as f32).collect()
}

fn mark(engine: &mut PlaybackEngine, start: usize, end: usize) {
    engine.set_position_samples(PositionKind::MarkerStart, start);
    engine.set_position_samples(PositionKind::MarkerEnd, end);
}

fn channel(engine: &PlaybackEngine, ch: usize) -> Vec<f32> {
    engine.snapshot().expect("buffer").channel(ch).to_vec()
}

#[test]
fn mute_then_undo_restores_stereo_buffer() {
    let mut engine = engine_with(vec![vec![1.0; 10], vec![1.0; 10]], 1000);
    engine.set_position(PositionKind::MarkerStart, 0.002);
    engine.set_position(PositionKind::MarkerEnd, 0.006);
    assert_eq!(engine.position_samples(PositionKind::MarkerStart), 2);
    assert_eq!(engine.position_samples(PositionKind::MarkerEnd), 6);

    assert!(!engine.is_undo_enabled());
    assert!(engine.mute_marked_region().expect("mute"));
    for ch in 0..2 {
        let samples = channel(&engine, ch);
        for (i, v) in samples.iter().enumerate() {
            if (2..=6).contains(&i) {
                assert_eq!(*v, 0.0, "ch{ch}[{i}] should be muted");
            } else {
                assert_eq!(*v, 1.0, "ch{ch}[{i}] should be untouched");
            }
        }
    }
    assert!(engine.is_undo_enabled());

    assert!(engine.undo().expect("undo"));
    assert_eq!(channel(&engine, 0), vec![1.0; 10]);
    assert_eq!(channel(&engine, 1), vec![1.0; 10]);
    assert!(!engine.is_undo_enabled());
    assert!(engine.is_redo_enabled());
}

#[test]
fn fade_endpoints_hit_silence_and_unity() {
    let mut engine = engine_with(vec![vec![0.8; 20]], 1000);
    mark(&mut engine, 4, 13);
    assert!(engine.fade_in_marked_region().expect("fade in"));
    let s = channel(&engine, 0);
    assert!(s[4].abs() < 1e-6);
    assert!((s[13] - 0.8).abs() < 1e-6);
    assert!(s[4..=13].windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(s[3], 0.8);
    assert_eq!(s[14], 0.8);

    assert!(engine.undo().expect("undo"));
    assert!(engine.fade_out_marked_region().expect("fade out"));
    let s = channel(&engine, 0);
    assert!((s[4] - 0.8).abs() < 1e-6);
    assert!(s[13].abs() < 1e-6);
}

#[test]
fn gain_scales_only_marked_span() {
    let mut engine = engine_with(vec![vec![0.5; 8], vec![-0.5; 8]], 8000);
    mark(&mut engine, 1, 2);
    assert!(engine.gain_marked_region(2.0).expect("gain"));
    assert_eq!(channel(&engine, 0), vec![0.5, 1.0, 1.0, 0.5, 0.5, 0.5, 0.5, 0.5]);
    assert_eq!(channel(&engine, 1)[1], -1.0);
}

#[test]
fn delete_collapses_markers_and_undo_restores_length() {
    let mut engine = engine_with(vec![ramp(10)], 1000);
    mark(&mut engine, 2, 5);
    assert!(engine.delete_marked_region().expect("delete"));
    assert_eq!(engine.num_samples(), 6);
    assert_eq!(channel(&engine, 0), vec![0.0, 1.0, 6.0, 7.0, 8.0, 9.0]);
    for kind in [
        PositionKind::Cursor,
        PositionKind::MarkerStart,
        PositionKind::MarkerEnd,
    ] {
        assert_eq!(engine.position_samples(kind), 2);
    }

    assert!(engine.undo().expect("undo"));
    assert_eq!(channel(&engine, 0), ramp(10));
    assert!(engine.redo().expect("redo"));
    assert_eq!(engine.num_samples(), 6);
}

#[test]
fn cut_then_insert_moves_a_span() {
    let mut engine = engine_with(vec![ramp(8)], 1000);
    mark(&mut engine, 0, 1);
    assert!(engine.cut_marked_region().expect("cut"));
    assert_eq!(channel(&engine, 0), vec![2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
    assert_eq!(engine.clipboard().map(|c| c.num_samples()), Some(2));

    engine.set_position_samples(PositionKind::Cursor, 6);
    assert!(engine.insert_from_cursor().expect("insert"));
    assert_eq!(
        channel(&engine, 0),
        vec![2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 0.0, 1.0]
    );

    assert!(engine.undo().expect("undo insert"));
    assert_eq!(engine.num_samples(), 6);
    assert!(engine.undo().expect("undo cut"));
    assert_eq!(channel(&engine, 0), ramp(8));
}

#[test]
fn paste_overwrites_and_grows_past_the_end() {
    let mut engine = engine_with(vec![ramp(6)], 1000);
    mark(&mut engine, 0, 2);
    assert!(engine.copy_marked_region().expect("copy"));
    assert_eq!(engine.num_samples(), 6);

    engine.set_position_samples(PositionKind::Cursor, 4);
    assert!(engine.paste_from_cursor().expect("paste"));
    assert_eq!(
        channel(&engine, 0),
        vec![0.0, 1.0, 2.0, 3.0, 0.0, 1.0, 2.0]
    );

    assert!(engine.undo().expect("undo"));
    assert_eq!(channel(&engine, 0), ramp(6));
}

#[test]
fn paste_and_insert_with_empty_clipboard_are_noops() {
    let mut engine = engine_with(vec![ramp(4)], 1000);
    assert!(!engine.is_paste_enabled());
    assert!(!engine.paste_from_cursor().expect("paste"));
    assert!(!engine.insert_from_cursor().expect("insert"));
    assert_eq!(channel(&engine, 0), ramp(4));
    assert!(!engine.is_undo_enabled());
}

#[test]
fn edits_without_a_buffer_do_nothing() {
    let mut engine = PlaybackEngine::default();
    assert!(!engine.mute_marked_region().expect("mute"));
    assert!(!engine.delete_marked_region().expect("delete"));
    assert!(!engine.copy_marked_region().expect("copy"));
    assert!(!engine.undo().expect("undo"));
}

#[test]
fn positions_stay_within_bounds_after_shrinking() {
    let mut engine = engine_with(vec![ramp(20)], 1000);
    engine.set_position_samples(PositionKind::Cursor, 18);
    mark(&mut engine, 0, 14);
    assert!(engine.delete_marked_region().expect("delete"));
    let len = engine.num_samples();
    assert_eq!(len, 5);
    let start = engine.position_samples(PositionKind::MarkerStart);
    let end = engine.position_samples(PositionKind::MarkerEnd);
    let cursor = engine.position_samples(PositionKind::Cursor);
    assert!(start <= end && end <= len);
    assert!(cursor <= len);

    engine.set_position(PositionKind::MarkerEnd, 99.0);
    assert_eq!(engine.position_samples(PositionKind::MarkerEnd), len);
    engine.set_position(PositionKind::Cursor, -3.0);
    assert_eq!(engine.position_samples(PositionKind::Cursor), 0);
}

#[test]
fn moving_a_marker_past_the_other_drags_it() {
    let mut engine = engine_with(vec![ramp(20)], 1000);
    mark(&mut engine, 5, 10);
    engine.set_position_samples(PositionKind::MarkerStart, 15);
    assert_eq!(engine.position_samples(PositionKind::MarkerEnd), 15);
    engine.set_position_samples(PositionKind::MarkerEnd, 3);
    assert_eq!(engine.position_samples(PositionKind::MarkerStart), 3);
}

#[test]
fn buffer_and_clipboard_listeners_are_notified() {
    let mut engine = engine_with(vec![ramp(10)], 1000);
    let seen: Arc<Mutex<Vec<EditorEvent>>> = Arc::new(Mutex::new(Vec::new()));
    for channel in [EventChannel::AudioBuffer, EventChannel::Clipboard] {
        let sink = Arc::clone(&seen);
        engine
            .listeners_mut()
            .subscribe(channel, move |e| sink.lock().expect("lock").push(e.clone()));
    }
    mark(&mut engine, 0, 3);
    engine.cut_marked_region().expect("cut");
    let events = seen.lock().expect("lock").clone();
    assert_eq!(
        events,
        vec![
            EditorEvent::ClipboardChanged { num_samples: 4 },
            EditorEvent::AudioBufferChanged {
                num_channels: 1,
                num_samples: 6
            },
        ]
    );
}

#[test]
fn loading_resets_history_and_selects_everything() {
    let mut engine = engine_with(vec![ramp(10)], 1000);
    mark(&mut engine, 1, 2);
    engine.mute_marked_region().expect("mute");
    assert!(engine.is_undo_enabled());

    engine.load_buffer(SampleMatrix::from_mono(ramp(30)), 2000);
    assert!(!engine.is_undo_enabled());
    assert_eq!(engine.position_samples(PositionKind::MarkerStart), 0);
    assert_eq!(engine.position_samples(PositionKind::MarkerEnd), 30);
    assert!((engine.get_length_seconds() - 0.015).abs() < 1e-9);
    assert_eq!(engine.marked_span(), Some((0, 30)));
}

#[test]
fn replaced_snapshots_outlive_a_renderer_guard_and_are_then_released() {
    let mut engine = engine_with(vec![ramp(16)], 1000);
    mark(&mut engine, 0, 15);
    for _ in 0..5 {
        assert!(engine.gain_marked_region(0.5).expect("gain"));
    }
    assert!(!engine.poll());
    assert_eq!(engine.retired_snapshots(), 0);

    // what the audio thread holds for the length of one block
    let shared = engine.shared();
    let guard = shared.samples.load();
    let seen = guard.as_ref().expect("buffer").channel(0).to_vec();
    assert!(engine.mute_marked_region().expect("mute"));
    assert!(engine.undo().expect("undo"));
    assert!(engine.redo().expect("redo"));
    assert!(!engine.poll());
    assert_eq!(engine.retired_snapshots(), 1);
    assert_eq!(guard.as_ref().expect("buffer").channel(0), &seen[..]);

    drop(guard);
    assert!(!engine.poll());
    assert_eq!(engine.retired_snapshots(), 0);
    assert!(channel(&engine, 0).iter().all(|v| *v == 0.0));
}
