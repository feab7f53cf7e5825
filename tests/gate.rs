use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracer::gate::{MSG_ENDED, MSG_ENDED_NO_DATA, MSG_PAUSED};
use tracer::{BandChange, RefreshSettings, RenderGate, SeriesLayout, StreamState, TracerError};

fn gate_with(band: Option<usize>, columns: usize) -> RenderGate {
    let gate = RenderGate::new(
        RefreshSettings {
            band,
            rate: Duration::from_millis(50),
        },
        false,
    );
    let layout = SeriesLayout::new(vec![(1..=columns).collect()]).unwrap();
    gate.establish_layout(&layout);
    gate
}

fn push(gate: &RenderGate, values: &[f64]) {
    gate.append_record(values).unwrap();
}

#[test]
fn append_trims_to_band_immediately() {
    let gate = gate_with(Some(2), 2);
    push(&gate, &[1.0, 2.0]);
    push(&gate, &[3.0, 4.0]);
    assert_eq!(gate.append_record(&[5.0, 6.0]).unwrap(), 2);
    assert_eq!(gate.data_count(), 2);
    assert_eq!(gate.total_ingested(), 3);

    let snap = gate.get_snapshot_for_save();
    assert_eq!(snap.columns, vec![vec![3.0, 5.0], vec![4.0, 6.0]]);
}

#[test]
fn wrong_record_width_is_rejected() {
    let gate = gate_with(None, 2);
    let err = gate.append_record(&[1.0, 2.0, 3.0]).unwrap_err();
    assert!(matches!(err, TracerError::ShapeMismatch { expected: 2, got: 3 }));
    assert_eq!(gate.data_count(), 0);

    let no_layout = RenderGate::new(RefreshSettings::default(), false);
    assert!(no_layout.append_record(&[1.0]).is_err());
}

#[test]
fn take_frame_clears_dirty_flag() {
    let gate = gate_with(None, 1);
    assert!(gate.take_frame().is_none());
    push(&gate, &[1.0]);
    assert!(!gate.is_dirty());
    assert!(gate.redraw(""));
    assert!(gate.is_dirty());

    let frame = gate.take_frame().unwrap();
    assert_eq!(frame.count(), 1);
    assert_eq!(frame.title(), "\n[ 1 ]");
    assert!(gate.take_frame().is_none());
    assert_eq!(gate.frames_published(), 1);
}

#[test]
fn pause_freezes_frame_and_saved_data() {
    let gate = gate_with(None, 1);
    push(&gate, &[1.0]);
    push(&gate, &[2.0]);
    assert!(gate.pause());
    assert_eq!(gate.state(), StreamState::Paused);

    let frame = gate.latest_frame();
    assert_eq!(frame.message, MSG_PAUSED);
    assert_eq!(frame.snapshot.columns, vec![vec![1.0, 2.0]]);

    // ingestion goes on behind the freeze
    push(&gate, &[3.0]);
    push(&gate, &[4.0]);
    assert!(!gate.redraw(""));
    assert_eq!(gate.data_count(), 4);
    assert_eq!(gate.latest_frame().count(), 2);
    assert_eq!(gate.get_snapshot_for_save().columns, vec![vec![1.0, 2.0]]);

    assert!(!gate.pause(), "second pause is a no-op");

    assert!(gate.resume());
    assert_eq!(gate.state(), StreamState::Active);
    let frame = gate.latest_frame();
    assert_eq!(frame.message, "");
    assert_eq!(frame.snapshot.columns, vec![vec![1.0, 2.0, 3.0, 4.0]]);
    assert!(!gate.resume());
}

#[test]
fn end_while_paused_is_deferred_to_resume() {
    let gate = gate_with(None, 1);
    push(&gate, &[1.0]);
    gate.pause();
    let before = gate.frames_published();

    gate.finish();
    assert_eq!(gate.frames_published(), before);
    assert_eq!(gate.state(), StreamState::Ended);
    assert!(gate.is_paused());
    assert_eq!(gate.latest_frame().message, MSG_PAUSED);

    gate.resume();
    assert_eq!(gate.latest_frame().message, MSG_ENDED);
    assert!(!gate.pause(), "an ended stream cannot be paused");
}

#[test]
fn ended_without_records() {
    let gate = RenderGate::new(RefreshSettings::default(), false);
    gate.finish();
    assert_eq!(gate.state(), StreamState::Ended);
    let frame = gate.latest_frame();
    assert_eq!(frame.message, MSG_ENDED_NO_DATA);
    assert_eq!(frame.count(), 0);
    assert!(gate.get_snapshot_for_save().is_empty());
}

#[test]
fn reconfigure_validates_before_changing() {
    let gate = gate_with(Some(5), 1);
    let before = gate.settings();

    for (band, rate) in [
        (Some(BandChange::Set(0)), None),
        (None, Some(-1.0)),
        (None, Some(f64::NAN)),
        (Some(BandChange::Set(3)), Some(f64::INFINITY)),
    ] {
        let err = gate.reconfigure(band, rate).unwrap_err();
        assert!(matches!(err, TracerError::ReconfigureRejected(_)));
        assert_eq!(gate.settings(), before);
    }

    let s = gate.reconfigure(Some(BandChange::Unset), Some(0.0)).unwrap();
    assert_eq!(s.band, None);
    assert_eq!(s.rate, Duration::ZERO);
}

#[test]
fn rate_too_large_for_a_duration_is_rejected() {
    let gate = gate_with(None, 1);
    let before = gate.settings();
    let err = gate.reconfigure(None, Some(1e20)).unwrap_err();
    assert!(matches!(err, TracerError::ReconfigureRejected(_)));
    assert_eq!(gate.settings(), before);

    let s = gate.reconfigure(None, Some(1e19)).unwrap();
    assert_eq!(s.rate.as_secs(), 10_000_000_000_000_000_000);
}

#[test]
fn smaller_band_applies_on_next_trim_and_larger_restores_nothing() {
    let gate = gate_with(None, 1);
    for v in 0..5 {
        push(&gate, &[v as f64]);
    }
    gate.reconfigure(Some(BandChange::Set(3)), None).unwrap();
    assert_eq!(gate.data_count(), 5);
    gate.redraw("");
    assert_eq!(gate.data_count(), 3);
    assert_eq!(gate.latest_frame().snapshot.columns, vec![vec![2.0, 3.0, 4.0]]);

    gate.reconfigure(Some(BandChange::Set(10)), None).unwrap();
    assert_eq!(gate.get_snapshot_for_save().count, 3);
}

#[test]
fn published_counts_never_shrink_once_band_is_full() {
    let gate = gate_with(Some(3), 1);
    let mut last = 0;
    for v in 0..10 {
        push(&gate, &[v as f64]);
        gate.redraw("");
        let count = gate.latest_frame().count();
        assert!(count >= last);
        assert!(count <= 3);
        last = count;
    }
    assert_eq!(last, 3);
}

#[test]
fn repaint_hook_runs_on_every_publish() {
    let gate = gate_with(None, 1);
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    gate.set_repaint_hook(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    push(&gate, &[1.0]);
    gate.redraw("");
    gate.toggle_pause();
    gate.toggle_pause();
    gate.finish();
    assert_eq!(calls.load(Ordering::SeqCst), 4);
}

#[test]
fn layout_is_set_once() {
    let gate = gate_with(None, 2);
    gate.establish_layout(&SeriesLayout::new(vec![vec![1]]).unwrap());
    assert_eq!(gate.get_series_layout().unwrap().column_count(), 2);
}
