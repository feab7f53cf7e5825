//! Configuration shared by the ingestion engine, the viewer and the CLI.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TracerError};
use crate::layout::SeriesLayout;

/// Default minimum time between two redraws, in seconds.
pub const DEFAULT_RATE_SECS: f64 = 0.05;

// ─────────────────────────────────────────────────────────────────────────────
// Delimiter
// ─────────────────────────────────────────────────────────────────────────────

/// How a raw line is split into fields.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Delimiter {
    /// Runs of whitespace; never yields empty fields.
    #[default]
    Whitespace,
    /// An exact separator string; consecutive separators yield empty fields.
    Exact(String),
}

impl Delimiter {
    pub fn split<'a>(&self, line: &'a str) -> Vec<&'a str> {
        match self {
            Delimiter::Whitespace => line.split_whitespace().collect(),
            Delimiter::Exact(sep) => line.split(sep.as_str()).collect(),
        }
    }
}

impl From<Option<&str>> for Delimiter {
    fn from(sep: Option<&str>) -> Self {
        match sep {
            None | Some("") => Delimiter::Whitespace,
            Some(s) => Delimiter::Exact(s.to_string()),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Live refresh settings
// ─────────────────────────────────────────────────────────────────────────────

/// Band and refresh rate; the only settings that change while streaming.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RefreshSettings {
    /// Maximum number of retained records, `None` keeps everything.
    pub band: Option<usize>,
    /// Minimum time between two redraws while data keeps arriving.
    pub rate: Duration,
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self {
            band: None,
            rate: Duration::from_secs_f64(DEFAULT_RATE_SECS),
        }
    }
}

impl RefreshSettings {
    /// Validate raw values coming from the UI or the command line.
    pub fn from_raw(band: Option<usize>, rate_secs: f64) -> Result<Self> {
        Ok(Self {
            band: validate_band(band)?,
            rate: validate_rate(rate_secs)?,
        })
    }
}

pub(crate) fn validate_band(band: Option<usize>) -> Result<Option<usize>> {
    match band {
        Some(0) => Err(TracerError::ReconfigureRejected(
            "band must be a strictly positive integer".to_string(),
        )),
        other => Ok(other),
    }
}

pub(crate) fn validate_rate(rate_secs: f64) -> Result<Duration> {
    let rejected = || {
        TracerError::ReconfigureRejected(format!(
            "rate must be a non-negative number of seconds, got {rate_secs}"
        ))
    };
    if !rate_secs.is_finite() || rate_secs < 0.0 {
        return Err(rejected());
    }
    Duration::try_from_secs_f64(rate_secs).map_err(|_| rejected())
}

// ─────────────────────────────────────────────────────────────────────────────
// TracerConfig
// ─────────────────────────────────────────────────────────────────────────────

/// Ingestion options, loadable from a JSON file and overridable from the CLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TracerConfig {
    /// Field separator; whitespace runs when unset.
    pub sep: Option<String>,
    /// Explicit column selection; inferred from the first numeric line when unset.
    pub columns: Option<SeriesLayout>,
    /// Only lines with exactly this many fields are considered.
    pub ncolumns: Option<usize>,
    /// Use the first series as shared abscissa.
    pub abscissa: bool,
    /// Number of leading lines passed through untouched.
    pub offset: Option<usize>,
    /// Maximum number of retained records.
    pub band: Option<usize>,
    /// Minimum time in seconds between two redraws.
    pub rate: f64,
    /// Do not echo unprocessed lines.
    pub quiet: bool,
    /// Echo every accepted data line.
    pub reprint: bool,
}

impl Default for TracerConfig {
    fn default() -> Self {
        Self {
            sep: None,
            columns: None,
            ncolumns: None,
            abscissa: false,
            offset: None,
            band: None,
            rate: DEFAULT_RATE_SECS,
            quiet: false,
            reprint: false,
        }
    }
}

impl TracerConfig {
    /// Load a config file. Missing keys fall back to the defaults.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let cfg: TracerConfig = serde_json::from_str(&text)?;
        Ok(cfg)
    }

    pub fn delimiter(&self) -> Delimiter {
        Delimiter::from(self.sep.as_deref())
    }

    pub fn refresh_settings(&self) -> Result<RefreshSettings> {
        RefreshSettings::from_raw(self.band, self.rate)
            .map_err(|e| TracerError::Config(e.to_string()))
    }

    /// Check the cross-option constraints.
    pub fn validate(&self) -> Result<()> {
        let positive = |name: &str, v: Option<usize>| match v {
            Some(0) => Err(TracerError::Config(format!(
                "invalid strictly positive int value for {name}: 0"
            ))),
            _ => Ok(()),
        };
        positive("band", self.band)?;
        positive("offset", self.offset)?;
        positive("ncolumns", self.ncolumns)?;
        self.refresh_settings()?;

        if self.abscissa {
            let n = match (&self.columns, self.ncolumns) {
                (Some(layout), _) => layout.groups()[0].len(),
                (None, Some(n)) => n,
                (None, None) => 2,
            };
            if n < 2 {
                return Err(TracerError::Config(
                    "there must be at least two series to process if one is put in the abscissa"
                        .to_string(),
                ));
            }
        }

        if let (Some(layout), Some(n)) = (&self.columns, self.ncolumns) {
            if n < layout.max_index() {
                return Err(TracerError::Config(
                    "the number of columns must be at least equal to the highest selected column"
                        .to_string(),
                ));
            }
        }
        Ok(())
    }
}
