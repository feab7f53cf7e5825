//! Native viewer: pulls frames from the [`RenderGate`] and draws one plot per
//! subplot group.
//!
//! The viewer owns no data. Every repaint asks the gate for a new frame and
//! keeps drawing the last one it got; pause, band/rate changes and saving go
//! straight back to the gate.

mod run;

pub use run::{run_tracer, ViewerOptions};

use egui_plot::{Legend, Line, LineStyle, Plot};

use crate::export;
use crate::gate::{BandChange, Frame, RenderGate};
use crate::layout::SeriesLayout;
use crate::trace_look::{LineKind, PlotStyle, TraceLook};

type Looks = Vec<Vec<Option<TraceLook>>>;

pub struct TracerApp {
    gate: RenderGate,
    style: PlotStyle,
    abscissa: bool,
    frame: Frame,
    layout: Option<(SeriesLayout, Looks)>,
    band_text: String,
    rate_text: String,
    focus_refresh: bool,
    show_zero_line: bool,
    status: String,
}

impl TracerApp {
    pub fn new(gate: RenderGate, style: PlotStyle, abscissa: bool) -> Self {
        let settings = gate.settings();
        Self {
            band_text: settings.band.map(|b| b.to_string()).unwrap_or_default(),
            rate_text: format!("{}", settings.rate.as_secs_f64()),
            gate,
            style,
            abscissa,
            frame: Frame::default(),
            layout: None,
            focus_refresh: false,
            show_zero_line: true,
            status: String::new(),
        }
    }

    fn refresh_layout(&mut self) {
        if self.layout.is_some() {
            return;
        }
        if let Some(layout) = self.gate.get_series_layout() {
            let looks = self.style.looks(layout.groups(), self.abscissa);
            self.layout = Some((layout, looks));
        }
    }

    fn toggle_pause(&mut self) {
        if self.gate.is_ended() && !self.gate.is_paused() {
            self.status = "ended".to_string();
            return;
        }
        self.gate.toggle_pause();
        self.status = if self.gate.is_paused() {
            "paused".to_string()
        } else {
            String::new()
        };
    }

    fn apply_refresh(&mut self) {
        let band_text = self.band_text.trim();
        let band = if band_text.is_empty() || band_text.eq_ignore_ascii_case("none") {
            Ok(BandChange::Unset)
        } else {
            band_text.parse::<usize>().map(BandChange::Set)
        };
        let (Ok(band), Ok(rate)) = (band, self.rate_text.trim().parse::<f64>()) else {
            self.status = "bad entry".to_string();
            return;
        };
        match self.gate.reconfigure(Some(band), Some(rate)) {
            Ok(settings) => {
                let rate = settings.rate.as_secs_f64();
                self.status = match settings.band {
                    Some(b) => format!("band : {b} / rate : {rate:.6}"),
                    None => format!("no band / rate : {rate:.6}"),
                };
            }
            Err(e) => {
                tracing::warn!(error = %e, "reconfigure rejected");
                self.status = "bad entry".to_string();
            }
        }
    }

    fn save_data(&mut self) {
        let snapshot = self.gate.get_snapshot_for_save();
        if snapshot.is_empty() {
            self.status = "no data to save".to_string();
            return;
        }
        let Some(path) = rfd::FileDialog::new()
            .set_file_name(export::default_file_name().to_string_lossy())
            .save_file()
        else {
            return;
        };
        self.status = match export::save_snapshot(&path, &snapshot) {
            Ok(()) => format!("saved {} records", snapshot.count),
            Err(e) => {
                tracing::warn!(error = %e, path = %path.display(), "saving data failed");
                format!("save failed: {e}")
            }
        };
    }

    fn handle_keys(&mut self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() {
            return;
        }
        let (pause, save, refresh, zero) = ctx.input(|i| {
            (
                i.key_pressed(egui::Key::P) || i.key_pressed(egui::Key::Space),
                i.key_pressed(egui::Key::D),
                i.key_pressed(egui::Key::B),
                i.key_pressed(egui::Key::A),
            )
        });
        if pause {
            self.toggle_pause();
        }
        if save {
            self.save_data();
        }
        if refresh {
            self.focus_refresh = true;
        }
        if zero {
            self.show_zero_line = !self.show_zero_line;
        }
    }

    fn render_controls(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let label = if self.gate.is_paused() { "Resume" } else { "Pause" };
            if ui.button(label).on_hover_text("Pause the drawing [P]").clicked() {
                self.toggle_pause();
            }
            ui.separator();

            ui.label("Band:");
            let band = ui.add(egui::TextEdit::singleline(&mut self.band_text).desired_width(70.0));
            if self.focus_refresh {
                band.request_focus();
                self.focus_refresh = false;
            }
            ui.label("Rate (s):");
            let rate = ui.add(egui::TextEdit::singleline(&mut self.rate_text).desired_width(60.0));
            let enter = ui.input(|i| i.key_pressed(egui::Key::Enter));
            if ui.button("Apply").clicked() || ((band.lost_focus() || rate.lost_focus()) && enter) {
                self.apply_refresh();
            }
            ui.separator();

            if ui.button("Save data").on_hover_text("Save the data [D]").clicked() {
                self.save_data();
            }
            ui.separator();
            ui.label(&self.status);
        });
    }

    fn render_plots(&self, ui: &mut egui::Ui) {
        let Some((layout, looks)) = &self.layout else {
            ui.centered_and_justified(|ui| {
                ui.label(self.frame.title());
            });
            return;
        };
        let snapshot = &self.frame.snapshot;
        let count = snapshot.count;
        let abscissa: Option<&Vec<f64>> = if self.abscissa {
            snapshot.columns.first()
        } else {
            None
        };
        let x_at = |i: usize| abscissa.map_or(i as f64, |xs| xs[i]);

        let ranges = layout.group_ranges();
        let n = ranges.len().max(1);
        let spacing = ui.spacing().item_spacing.y;
        let height = ((ui.available_height() - 24.0 * n as f32) / n as f32 - spacing).max(40.0);

        for (sub, range) in ranges.into_iter().enumerate() {
            let title = match self.style.title(sub) {
                Some(t) => t.to_string(),
                None if sub == 0 => self.frame.title().replace('\n', "  "),
                None => String::new(),
            };
            if !title.is_empty() {
                ui.vertical_centered(|ui| ui.label(title));
            }

            let series = looks[sub].iter().filter(|l| l.is_some()).count();
            let mut plot = Plot::new(("tracer_subplot", sub))
                .height(height)
                .link_axis("tracer_x", [true, false])
                .show_grid(self.style.grid(sub));
            if series > 1 {
                plot = plot.legend(Legend::default());
            }
            if self.style.keep_zero(sub) {
                plot = plot.include_y(0.0);
            }
            if sub + 1 == n {
                if let Some(xlabel) = &self.style.xlabel {
                    plot = plot.x_axis_label(xlabel.clone());
                } else if self.abscissa {
                    let x_name = self
                        .style
                        .labels
                        .first()
                        .cloned()
                        .unwrap_or_else(|| layout.groups()[0][0].to_string());
                    plot = plot.x_axis_label(x_name);
                }
            }

            plot.show(ui, |plot_ui| {
                for (j, column) in range.clone().enumerate() {
                    let Some(look) = &looks[sub][j] else {
                        continue;
                    };
                    let Some(values) = snapshot.columns.get(column) else {
                        continue;
                    };
                    let points: Vec<[f64; 2]> = (0..count).map(|i| [x_at(i), values[i]]).collect();
                    let [r, g, b] = look.color;
                    plot_ui.line(
                        Line::new(look.label.clone(), points)
                            .color(egui::Color32::from_rgb(r, g, b))
                            .width(look.width)
                            .style(line_style(look.kind)),
                    );
                }
                if self.show_zero_line && self.style.grid(sub) && count > 1 {
                    let (x0, x1) = (x_at(0), x_at(count - 1));
                    plot_ui.line(
                        Line::new("", vec![[x0, 0.0], [x1, 0.0]])
                            .color(egui::Color32::from_gray(160).gamma_multiply(0.3))
                            .style(LineStyle::Dashed { length: 8.0 }),
                    );
                }
            });
        }
    }
}

fn line_style(kind: LineKind) -> LineStyle {
    match kind {
        LineKind::Solid => LineStyle::Solid,
        LineKind::Dashed => LineStyle::Dashed { length: 8.0 },
        LineKind::Dotted => LineStyle::Dotted { spacing: 4.0 },
        LineKind::Mixed => LineStyle::Dashed { length: 3.0 },
    }
}

impl eframe::App for TracerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if let Some(frame) = self.gate.take_frame() {
            self.frame = frame;
        }
        self.refresh_layout();
        self.handle_keys(ctx);

        egui::TopBottomPanel::top("tracer_controls").show(ctx, |ui| {
            self.render_controls(ui);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.render_plots(ui);
        });
    }
}
