//! IngestionLoop: the producer side of the engine.
//!
//! Reads lines, classifies them, appends records through the [`RenderGate`]
//! and decides when a redraw is due. For a live source a redraw is due once
//! the refresh rate has elapsed, but it only goes out when the line that
//! triggered it had to wait for input; while the source still has buffered
//! data the redraw is skipped and the next frame carries an `OVERRUN` note.

use std::io::{BufRead, Read};
use std::os::fd::AsRawFd;
use std::time::Instant;

use tracing::{debug, error, info};

use crate::config::TracerConfig;
use crate::error::{Result, TracerError};
use crate::gate::{RenderGate, MSG_OVERRUN};
use crate::parser::{LineKind, RecordParser};
use crate::reader::{FileLineReader, Line, LineReader, ReadOutcome};
use crate::sink::Sink;

/// Counters reported when the stream ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestSummary {
    pub records: u64,
    pub passed_through: u64,
    pub malformed: u64,
    pub overruns: u64,
    pub redraws: u64,
    pub descriptor_error: bool,
}

pub struct IngestionLoop<S> {
    parser: RecordParser,
    gate: RenderGate,
    sink: S,
    quiet: bool,
    reprint: bool,
    layout_published: bool,
    source_name: String,
    summary: IngestSummary,
}

impl<S: Sink> IngestionLoop<S> {
    pub fn new(cfg: &TracerConfig, gate: RenderGate, sink: S) -> Self {
        let parser = RecordParser::new(cfg);
        let layout_published = match parser.layout() {
            Some(layout) => {
                gate.establish_layout(layout);
                true
            }
            None => false,
        };
        Self {
            parser,
            gate,
            sink,
            quiet: cfg.quiet,
            reprint: cfg.reprint,
            layout_published,
            source_name: "stdin".to_string(),
            summary: IngestSummary::default(),
        }
    }

    /// Name used in the "no data" error.
    pub fn with_source_name(mut self, name: impl Into<String>) -> Self {
        self.source_name = name.into();
        self
    }

    /// Classify one line and store it if it is a record. Returns the retained
    /// length after a successful append.
    fn handle_line(&mut self, line: &Line) -> Result<Option<usize>> {
        let text = line.text();
        let parsed = self.parser.parse(&text);
        match parsed.kind {
            LineKind::PassThrough | LineKind::Malformed => {
                if parsed.kind == LineKind::Malformed {
                    self.summary.malformed += 1;
                    let err = TracerError::MalformedLine(text.trim_end().to_string());
                    debug!(error = %err, "skipping line");
                } else {
                    self.summary.passed_through += 1;
                }
                if !self.quiet {
                    self.sink.echo(&line.raw);
                }
                Ok(None)
            }
            LineKind::Data => {
                if !self.layout_published {
                    if let Some(layout) = self.parser.layout() {
                        info!(columns = %layout, "column set established");
                        self.gate.establish_layout(layout);
                        self.layout_published = true;
                    }
                }
                if self.reprint {
                    self.sink.echo(&line.raw);
                }
                let len = self.gate.append_record(&parsed.values)?;
                self.summary.records += 1;
                Ok(Some(len))
            }
        }
    }

    /// Consume a live source until end of stream.
    ///
    /// Only `ShapeMismatch` can surface as an error; read failures end the
    /// stream like EOF.
    pub fn run_live<R: Read + AsRawFd>(
        mut self,
        mut reader: LineReader<R>,
    ) -> Result<IngestSummary> {
        info!(source = %self.source_name, "live ingestion started");
        let mut last_redraw = Instant::now();
        let mut warning = "";

        loop {
            let status = self.gate.ingest_status();
            // A rate too large for an Instant behaves like no deadline.
            let deadline = if status.pending && !status.paused {
                Instant::now().checked_add(status.rate)
            } else {
                None
            };

            let line = match reader.read_line_or_timeout(deadline) {
                Ok(ReadOutcome::Line(line)) => line,
                Ok(ReadOutcome::Timeout) => {
                    if self.gate.ingest_status().pending && self.gate.redraw("") {
                        self.summary.redraws += 1;
                        last_redraw = Instant::now();
                        warning = "";
                    }
                    continue;
                }
                Ok(ReadOutcome::Eof) => break,
                Err(e) => {
                    let err = TracerError::Descriptor(e);
                    error!(error = %err, "ending stream");
                    self.summary.descriptor_error = true;
                    break;
                }
            };

            if self.handle_line(&line)?.is_none() {
                continue;
            }

            let rate = self.gate.ingest_status().rate;
            if last_redraw.elapsed() < rate {
                continue;
            }
            if line.caught_up {
                if self.gate.redraw(warning) {
                    self.summary.redraws += 1;
                }
                last_redraw = Instant::now();
                warning = "";
            } else {
                if warning.is_empty() {
                    self.summary.overruns += 1;
                    debug!("redraw skipped, input still buffered");
                }
                warning = MSG_OVERRUN;
            }
        }

        self.gate.finish();
        info!(summary = ?self.summary, "live ingestion ended");
        Ok(self.summary)
    }

    /// Read a regular file to completion. With a band, reading stops as soon
    /// as the band is full.
    pub fn run_file<R: BufRead>(mut self, mut reader: FileLineReader<R>) -> Result<IngestSummary> {
        info!(source = %self.source_name, "file ingestion started");
        loop {
            let line = match reader.read_line() {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => {
                    let err = TracerError::Descriptor(e);
                    error!(error = %err, "ending stream");
                    self.summary.descriptor_error = true;
                    break;
                }
            };
            let Some(len) = self.handle_line(&line)? else {
                continue;
            };
            if let Some(band) = self.gate.settings().band {
                if len >= band {
                    debug!(band, "band filled, stopping file read");
                    break;
                }
            }
        }

        self.gate.finish();
        if self.parser.layout().is_none() {
            return Err(TracerError::NoDataFound {
                source_name: self.source_name,
            });
        }
        info!(summary = ?self.summary, "file ingestion ended");
        Ok(self.summary)
    }
}
