//! RenderGate: the hand-off point between the ingestion thread and the renderer.
//!
//! Everything both sides touch lives in one `Shared` value behind a single
//! mutex: the store, the pending-data flag, the published frame, the pause
//! freeze, the stream flags and the refresh settings. Each public call is one
//! lock acquisition, so the UI never waits on a blocked read and the store is
//! never seen half-updated.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::config::{validate_band, validate_rate, RefreshSettings};
use crate::error::{Result, TracerError};
use crate::layout::SeriesLayout;
use crate::store::{SeriesStore, Snapshot};

pub const MSG_PAUSED: &str = "PAUSED";
pub const MSG_ENDED: &str = "ENDED";
pub const MSG_ENDED_NO_DATA: &str = "ENDED WITH NO DATA";
pub const MSG_OVERRUN: &str = "OVERRUN";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    Active,
    Paused,
    /// Absorbing; a paused stream that ended reports `Ended` too.
    Ended,
}

/// What the renderer draws: a consistent snapshot and a status message.
#[derive(Debug, Clone, Default)]
pub struct Frame {
    pub snapshot: Arc<Snapshot>,
    pub message: String,
    /// Number of frames published before this one.
    pub serial: u64,
}

impl Frame {
    pub fn count(&self) -> usize {
        self.snapshot.count
    }

    /// Title text: the message above the record count.
    pub fn title(&self) -> String {
        format!("{}\n[ {} ]", self.message, self.count())
    }
}

/// Band part of a reconfiguration request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BandChange {
    Set(usize),
    Unset,
}

/// Snapshot of the flags the ingestion loop needs at the top of a cycle.
#[derive(Debug, Clone, Copy)]
pub(crate) struct IngestStatus {
    pub pending: bool,
    pub paused: bool,
    pub rate: Duration,
}

type RepaintHook = Arc<dyn Fn() + Send + Sync>;

struct Shared {
    layout: Option<SeriesLayout>,
    store: Option<SeriesStore>,
    settings: RefreshSettings,
    ingested: u64,
    pending: bool,
    paused: bool,
    ended: bool,
    frozen: Option<Arc<Snapshot>>,
    frame: Frame,
    published: u64,
    dirty: bool,
    repaint: Option<RepaintHook>,
}

impl Shared {
    fn trim(&mut self) {
        let band = self.settings.band;
        if let Some(store) = self.store.as_mut() {
            store.trim_to_band(band);
        }
    }

    fn live_snapshot(&self) -> Snapshot {
        self.store
            .as_ref()
            .map(SeriesStore::snapshot)
            .unwrap_or_default()
    }

    fn set_frame(&mut self, snapshot: Arc<Snapshot>, message: &str) {
        self.frame = Frame {
            snapshot,
            message: message.to_string(),
            serial: self.published,
        };
        self.published += 1;
        self.dirty = true;
    }

    fn publish_live(&mut self, message: &str) {
        self.trim();
        let snapshot = Arc::new(self.live_snapshot());
        tracing::debug!(count = snapshot.count, message, "frame published");
        self.set_frame(snapshot, message);
        self.pending = false;
    }

    fn end_message(&self) -> &'static str {
        if self.ingested == 0 {
            MSG_ENDED_NO_DATA
        } else {
            MSG_ENDED
        }
    }

    fn pause(&mut self) -> bool {
        if self.ended || self.paused {
            return false;
        }
        self.paused = true;
        self.trim();
        let frozen = Arc::new(self.live_snapshot());
        self.frozen = Some(Arc::clone(&frozen));
        self.set_frame(frozen, MSG_PAUSED);
        true
    }

    fn resume(&mut self) -> bool {
        if !self.paused {
            return false;
        }
        self.paused = false;
        self.frozen = None;
        let message = if self.ended { self.end_message() } else { "" };
        self.publish_live(message);
        true
    }
}

/// Cloneable handle shared by the ingestion loop, the viewer and the UI controls.
#[derive(Clone)]
pub struct RenderGate {
    shared: Arc<Mutex<Shared>>,
    from_file: bool,
}

impl RenderGate {
    pub fn new(settings: RefreshSettings, from_file: bool) -> Self {
        Self {
            shared: Arc::new(Mutex::new(Shared {
                layout: None,
                store: None,
                settings,
                ingested: 0,
                pending: false,
                paused: false,
                ended: false,
                frozen: None,
                frame: Frame::default(),
                published: 0,
                dirty: false,
                repaint: None,
            })),
            from_file,
        }
    }

    /// Install a callback run after every published frame, outside the lock.
    pub fn set_repaint_hook<F>(&self, hook: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.shared.lock().repaint = Some(Arc::new(hook));
    }

    fn notify(&self, hook: Option<RepaintHook>) {
        if let Some(hook) = hook {
            hook();
        }
    }

    // ── producer side ───────────────────────────────────────────────────────

    /// Create the store for `layout`. Later calls are ignored.
    pub fn establish_layout(&self, layout: &SeriesLayout) {
        let mut s = self.shared.lock();
        if s.store.is_none() {
            s.store = Some(SeriesStore::new(layout.column_count()));
            s.layout = Some(layout.clone());
        }
    }

    /// Append one record and trim to the band, atomically. Returns the
    /// retained length.
    pub fn append_record(&self, values: &[f64]) -> Result<usize> {
        let mut s = self.shared.lock();
        let band = s.settings.band;
        // No layout yet: there is no store, so any record has the wrong width.
        let store = s.store.as_mut().ok_or(TracerError::ShapeMismatch {
            expected: 0,
            got: values.len(),
        })?;
        store.append(values)?;
        store.trim_to_band(band);
        let len = store.len();
        s.ingested += 1;
        s.pending = true;
        Ok(len)
    }

    /// Publish the live data unless paused. Returns whether a frame went out.
    pub fn redraw(&self, message: &str) -> bool {
        let hook = {
            let mut s = self.shared.lock();
            if s.paused {
                return false;
            }
            s.publish_live(message);
            s.repaint.clone()
        };
        self.notify(hook);
        true
    }

    /// Mark the stream ended. The final frame goes out now, or on resume if
    /// the stream is paused.
    pub fn finish(&self) {
        let hook = {
            let mut s = self.shared.lock();
            s.ended = true;
            if s.paused {
                tracing::debug!("stream ended while paused, final redraw deferred");
                return;
            }
            let message = s.end_message();
            s.publish_live(message);
            s.repaint.clone()
        };
        self.notify(hook);
    }

    pub(crate) fn ingest_status(&self) -> IngestStatus {
        let s = self.shared.lock();
        IngestStatus {
            pending: s.pending,
            paused: s.paused,
            rate: s.settings.rate,
        }
    }

    // ── control side ────────────────────────────────────────────────────────

    /// Freeze what the renderer sees. No-op when already paused or ended.
    pub fn pause(&self) -> bool {
        let (changed, hook) = {
            let mut s = self.shared.lock();
            (s.pause(), s.repaint.clone())
        };
        if changed {
            self.notify(hook);
        }
        changed
    }

    /// Release the freeze and publish everything gathered meanwhile. If the
    /// stream ended while paused this publishes the deferred final frame.
    pub fn resume(&self) -> bool {
        let (changed, hook) = {
            let mut s = self.shared.lock();
            (s.resume(), s.repaint.clone())
        };
        if changed {
            self.notify(hook);
        }
        changed
    }

    pub fn toggle_pause(&self) -> bool {
        let (changed, hook) = {
            let mut s = self.shared.lock();
            let changed = if s.paused { s.resume() } else { s.pause() };
            (changed, s.repaint.clone())
        };
        if changed {
            self.notify(hook);
        }
        changed
    }

    /// Replace the band and/or the rate. Values are checked before anything
    /// changes; data already trimmed is not restored by a larger band.
    pub fn reconfigure(
        &self,
        band: Option<BandChange>,
        rate_secs: Option<f64>,
    ) -> Result<RefreshSettings> {
        let band = match band {
            Some(BandChange::Set(b)) => Some(validate_band(Some(b))?),
            Some(BandChange::Unset) => Some(None),
            None => None,
        };
        let rate = rate_secs.map(validate_rate).transpose()?;

        let mut s = self.shared.lock();
        if let Some(band) = band {
            s.settings.band = band;
        }
        if let Some(rate) = rate {
            s.settings.rate = rate;
        }
        tracing::info!(
            band = ?s.settings.band,
            rate = ?s.settings.rate,
            "refresh settings changed"
        );
        Ok(s.settings)
    }

    pub fn settings(&self) -> RefreshSettings {
        self.shared.lock().settings
    }

    pub fn state(&self) -> StreamState {
        let s = self.shared.lock();
        if s.ended {
            StreamState::Ended
        } else if s.paused {
            StreamState::Paused
        } else {
            StreamState::Active
        }
    }

    pub fn is_paused(&self) -> bool {
        self.shared.lock().paused
    }

    pub fn is_ended(&self) -> bool {
        self.shared.lock().ended
    }

    pub fn is_from_file(&self) -> bool {
        self.from_file
    }

    /// Retained record count in the live store.
    pub fn data_count(&self) -> usize {
        self.shared.lock().store.as_ref().map_or(0, SeriesStore::len)
    }

    /// Records accepted since the start, trimmed or not.
    pub fn total_ingested(&self) -> u64 {
        self.shared.lock().ingested
    }

    /// Copy of the column grouping, once established.
    pub fn get_series_layout(&self) -> Option<SeriesLayout> {
        self.shared.lock().layout.clone()
    }

    /// Data to persist: the frozen snapshot while paused, otherwise a fresh
    /// one. Empty before the first record.
    pub fn get_snapshot_for_save(&self) -> Snapshot {
        let mut s = self.shared.lock();
        if s.store.as_ref().map_or(true, SeriesStore::is_empty) {
            return Snapshot::default();
        }
        if let Some(frozen) = &s.frozen {
            return frozen.as_ref().clone();
        }
        s.trim();
        s.live_snapshot()
    }

    // ── renderer side ───────────────────────────────────────────────────────

    /// The latest frame if it has not been taken yet; clears the dirty flag.
    pub fn take_frame(&self) -> Option<Frame> {
        let mut s = self.shared.lock();
        if !s.dirty {
            return None;
        }
        s.dirty = false;
        Some(s.frame.clone())
    }

    pub fn latest_frame(&self) -> Frame {
        self.shared.lock().frame.clone()
    }

    pub fn is_dirty(&self) -> bool {
        self.shared.lock().dirty
    }

    /// Number of frames published so far.
    pub fn frames_published(&self) -> u64 {
        self.shared.lock().published
    }
}
