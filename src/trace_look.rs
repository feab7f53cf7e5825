//! Static figure styling handed to the renderer once at startup.

use serde::{Deserialize, Serialize};

/// How a series line is stroked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum LineKind {
    #[default]
    Solid,
    Dashed,
    Dotted,
    /// Dash-dot; drawn as a short dash where the backend has no dash-dot.
    Mixed,
}

/// The look of one plotted series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceLook {
    pub color: [u8; 3],
    pub width: f32,
    pub kind: LineKind,
    pub label: String,
}

/// Default colour cycle (blue, green, red, magenta, yellow, cyan).
pub const DEFAULT_COLORS: [&str; 6] = ["b", "g", "r", "m", "y", "c"];

pub const DEFAULT_LINE_WIDTH: f32 = 1.0;

/// Figure-wide options, mostly mirrored from the command line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotStyle {
    /// Colour cycle; single letters (`b`, `g`, ...), `#rrggbb`, or grey
    /// levels between 0 and 1 (`"0.5"`).
    pub colors: Vec<String>,
    /// Restart the colour cycle in every subplot.
    pub loop_colors: bool,
    /// 1-based series numbers drawn dashed / dotted / dash-dot.
    pub dashed: Vec<usize>,
    pub dotted: Vec<usize>,
    pub mixed: Vec<usize>,
    /// Per-series line widths, by series number minus one.
    pub widths: Vec<f32>,
    /// Series labels, by series number minus one.
    pub labels: Vec<String>,
    pub xlabel: Option<String>,
    /// Subplot titles; when unset the first subplot shows the frame status.
    pub titles: Option<Vec<String>>,
    /// Subplots without grid; `Some(vec![])` means all of them.
    pub nogrid: Option<Vec<usize>>,
    /// Subplots that keep y = 0 in sight; `Some(vec![])` means all of them.
    pub zero: Option<Vec<usize>>,
    /// Light theme instead of the dark default.
    pub plain: bool,
}

impl Default for PlotStyle {
    fn default() -> Self {
        Self {
            colors: DEFAULT_COLORS.iter().map(|s| s.to_string()).collect(),
            loop_colors: false,
            dashed: Vec::new(),
            dotted: Vec::new(),
            mixed: Vec::new(),
            widths: Vec::new(),
            labels: Vec::new(),
            xlabel: None,
            titles: None,
            nogrid: None,
            zero: None,
            plain: false,
        }
    }
}

fn selects(sel: &Option<Vec<usize>>, subplot: usize) -> bool {
    match sel {
        None => false,
        Some(list) => list.is_empty() || list.contains(&(subplot + 1)),
    }
}

impl PlotStyle {
    pub fn line_kind(&self, series: usize) -> LineKind {
        if self.dashed.contains(&series) {
            LineKind::Dashed
        } else if self.dotted.contains(&series) {
            LineKind::Dotted
        } else if self.mixed.contains(&series) {
            LineKind::Mixed
        } else {
            LineKind::Solid
        }
    }

    pub fn grid(&self, subplot: usize) -> bool {
        !selects(&self.nogrid, subplot)
    }

    pub fn keep_zero(&self, subplot: usize) -> bool {
        selects(&self.zero, subplot)
    }

    pub fn title(&self, subplot: usize) -> Option<&str> {
        self.titles.as_ref()?.get(subplot).map(String::as_str)
    }

    /// Looks for every store column, grouped by subplot.
    ///
    /// `series` numbers count plotted lines from 1. In abscissa mode the
    /// first column is the x axis: it gets no look and numbering starts at
    /// the second column.
    pub fn looks(&self, groups: &[Vec<usize>], abscissa: bool) -> Vec<Vec<Option<TraceLook>>> {
        let mut out = Vec::with_capacity(groups.len());
        let mut position = 0usize;
        let mut cycle = 0usize;
        for group in groups {
            if self.loop_colors {
                cycle = 0;
            }
            let mut looks = Vec::with_capacity(group.len());
            for &source_index in group {
                if abscissa && position == 0 {
                    looks.push(None);
                    position += 1;
                    continue;
                }
                let series = if abscissa { position } else { position + 1 };
                let color = self
                    .colors
                    .get(cycle % self.colors.len().max(1))
                    .and_then(|c| parse_color(c))
                    .unwrap_or([128, 128, 128]);
                looks.push(Some(TraceLook {
                    color,
                    width: self
                        .widths
                        .get(series - 1)
                        .copied()
                        .unwrap_or(DEFAULT_LINE_WIDTH),
                    kind: self.line_kind(series),
                    label: self
                        .labels
                        .get(position)
                        .cloned()
                        .unwrap_or_else(|| source_index.to_string()),
                }));
                position += 1;
                cycle += 1;
            }
            out.push(looks);
        }
        out
    }
}

/// Parse a colour: a one-letter name, `#rrggbb`, or a grey level in `[0, 1]`.
pub fn parse_color(s: &str) -> Option<[u8; 3]> {
    let s = s.trim();
    let named = match s {
        "b" | "blue" => Some([0, 0, 255]),
        "g" | "green" => Some([0, 128, 0]),
        "r" | "red" => Some([255, 0, 0]),
        "c" | "cyan" => Some([0, 191, 191]),
        "m" | "magenta" => Some([191, 0, 191]),
        "y" | "yellow" => Some([191, 191, 0]),
        "k" | "black" => Some([0, 0, 0]),
        "w" | "white" => Some([255, 255, 255]),
        _ => None,
    };
    if named.is_some() {
        return named;
    }
    if let Some(hex) = s.strip_prefix('#') {
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        return Some([byte(0)?, byte(2)?, byte(4)?]);
    }
    let grey: f32 = s.parse().ok()?;
    if !(0.0..=1.0).contains(&grey) {
        return None;
    }
    let v = (grey * 255.0).round() as u8;
    Some([v, v, v])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_named_hex_and_grey() {
        assert_eq!(parse_color("r"), Some([255, 0, 0]));
        assert_eq!(parse_color("#102030"), Some([16, 32, 48]));
        assert_eq!(parse_color("0.5"), Some([128, 128, 128]));
        assert_eq!(parse_color("1.5"), None);
        assert_eq!(parse_color("#12"), None);
    }

    #[test]
    fn abscissa_column_has_no_look() {
        let style = PlotStyle {
            dashed: vec![1],
            labels: vec!["t".into(), "speed".into()],
            ..Default::default()
        };
        let looks = style.looks(&[vec![1, 2], vec![3]], true);
        assert!(looks[0][0].is_none());
        let speed = looks[0][1].as_ref().unwrap();
        assert_eq!(speed.kind, LineKind::Dashed);
        assert_eq!(speed.label, "speed");
        assert_eq!(looks[1][0].as_ref().unwrap().label, "3");
    }

    #[test]
    fn loop_colors_restarts_per_subplot() {
        let style = PlotStyle {
            loop_colors: true,
            ..Default::default()
        };
        let looks = style.looks(&[vec![1, 2], vec![3]], false);
        assert_eq!(looks[0][0].as_ref().unwrap().color, looks[1][0].as_ref().unwrap().color);

        let style = PlotStyle::default();
        let looks = style.looks(&[vec![1, 2], vec![3]], false);
        assert_ne!(looks[0][0].as_ref().unwrap().color, looks[1][0].as_ref().unwrap().color);
    }
}
