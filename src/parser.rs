//! RecordParser: turns raw input lines into numeric records.

use crate::config::{Delimiter, TracerConfig};
use crate::layout::SeriesLayout;

/// Classification of one input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// A record for the store; `values` holds one entry per active column.
    Data,
    /// Skipped by the offset, the field-count filter, a short line, or a line
    /// that could not establish the column set.
    PassThrough,
    /// A required field is not a number.
    Malformed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedLine {
    pub kind: LineKind,
    pub values: Vec<f64>,
}

impl ParsedLine {
    fn pass_through() -> Self {
        Self {
            kind: LineKind::PassThrough,
            values: Vec::new(),
        }
    }

    fn malformed() -> Self {
        Self {
            kind: LineKind::Malformed,
            values: Vec::new(),
        }
    }

    fn data(values: Vec<f64>) -> Self {
        Self {
            kind: LineKind::Data,
            values,
        }
    }

    pub fn is_data(&self) -> bool {
        self.kind == LineKind::Data
    }
}

/// Stateful line classifier. The only state is the remaining offset and the
/// column layout once it is established.
#[derive(Debug, Clone)]
pub struct RecordParser {
    delimiter: Delimiter,
    ncolumns: Option<usize>,
    abscissa: bool,
    offset_remaining: usize,
    layout: Option<SeriesLayout>,
}

impl RecordParser {
    pub fn new(cfg: &TracerConfig) -> Self {
        Self {
            delimiter: cfg.delimiter(),
            ncolumns: cfg.ncolumns,
            abscissa: cfg.abscissa,
            offset_remaining: cfg.offset.unwrap_or(0),
            layout: cfg.columns.clone(),
        }
    }

    /// The active layout, explicit or inferred.
    pub fn layout(&self) -> Option<&SeriesLayout> {
        self.layout.as_ref()
    }

    fn min_columns(&self) -> usize {
        if self.abscissa {
            2
        } else {
            1
        }
    }

    pub fn parse(&mut self, raw: &str) -> ParsedLine {
        let line = raw.trim_end_matches('\n').trim_end_matches('\r');
        let fields = self.delimiter.split(line);

        if self.offset_remaining > 0 {
            self.offset_remaining -= 1;
            return ParsedLine::pass_through();
        }

        if let Some(n) = self.ncolumns {
            if fields.len() != n {
                return ParsedLine::pass_through();
            }
        }

        let Some(layout) = &self.layout else {
            return self.infer(&fields);
        };

        if fields.len() < layout.max_index() {
            return ParsedLine::pass_through();
        }

        let mut values = Vec::with_capacity(layout.column_count());
        for idx in layout.indices() {
            match parse_field(fields[idx - 1]) {
                Some(v) => values.push(v),
                None => return ParsedLine::malformed(),
            }
        }
        ParsedLine::data(values)
    }

    fn infer(&mut self, fields: &[&str]) -> ParsedLine {
        let mut columns = Vec::new();
        let mut values = Vec::new();
        for (i, field) in fields.iter().enumerate() {
            if let Some(v) = parse_field(field) {
                columns.push(i + 1);
                values.push(v);
            }
        }
        if columns.len() < self.min_columns() {
            return ParsedLine::pass_through();
        }
        tracing::info!(columns = ?columns, "inferred column set");
        self.layout = Some(SeriesLayout::single(columns));
        ParsedLine::data(values)
    }
}

fn parse_field(field: &str) -> Option<f64> {
    field.trim().parse::<f64>().ok()
}
