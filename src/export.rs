//! Saving retained records: one line per record, one space between values.

use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::store::Snapshot;

/// Write `snapshot` record by record, columns in store order.
pub fn write_records<W: Write>(mut w: W, snapshot: &Snapshot) -> std::io::Result<()> {
    for i in 0..snapshot.count {
        let line = snapshot
            .record(i)
            .map(|v| format!("{v:?}"))
            .collect::<Vec<_>>()
            .join(" ");
        writeln!(w, "{line}")?;
    }
    w.flush()
}

/// Create (or truncate) `path` and write the snapshot into it.
pub fn save_snapshot<P: AsRef<Path>>(path: P, snapshot: &Snapshot) -> Result<()> {
    let f = std::fs::File::create(path.as_ref())?;
    write_records(BufWriter::new(f), snapshot)?;
    tracing::info!(path = %path.as_ref().display(), records = snapshot.count, "data saved");
    Ok(())
}

/// Default file name offered by the save dialog, e.g. `tracer_20240131_235959.dat`.
pub fn default_file_name() -> PathBuf {
    let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    PathBuf::from(format!("tracer_{stamp}.dat"))
}
