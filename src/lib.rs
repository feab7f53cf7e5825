//! Tracer crate root: module wiring and re-exports.
//!
//! Tracer plots numeric columns read line by line from a pipe, socket,
//! terminal or regular file. The engine is split into:
//! - `reader`: non-blocking, deadline-bounded line reads (and plain file reads)
//! - `parser`: field splitting, column inference, line classification
//! - `store`: per-column buffers with band trimming and snapshots
//! - `gate`: the shared state handed between ingestion and rendering
//! - `ingest`: the producer loop deciding when to redraw
//!
//! Collaborators: `sink` (echo of skipped lines), `export` (saving data),
//! `trace_look` (static figure style) and, with the `viewer` feature, `app`
//! (the egui window).

pub mod config;
pub mod error;
pub mod export;
pub mod gate;
pub mod ingest;
pub mod layout;
pub mod parser;
pub mod reader;
pub mod sink;
pub mod store;
pub mod trace_look;

#[cfg(feature = "viewer")]
pub mod app;

// Public re-exports for a compact external API
pub use config::{Delimiter, RefreshSettings, TracerConfig};
pub use error::{Result, TracerError};
pub use gate::{BandChange, Frame, RenderGate, StreamState};
pub use ingest::{IngestSummary, IngestionLoop};
pub use layout::SeriesLayout;
pub use parser::{LineKind, ParsedLine, RecordParser};
pub use reader::{FileLineReader, Line, LineReader, ReadOutcome, SourceKind};
pub use sink::{MemorySink, NullSink, Sink, StdoutSink};
pub use store::{SeriesStore, Snapshot};
pub use trace_look::{PlotStyle, TraceLook};
