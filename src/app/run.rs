//! Entry point for running the viewer in a native window.

use eframe::egui;

use crate::gate::RenderGate;
use crate::trace_look::PlotStyle;

use super::TracerApp;

/// Everything the window needs besides the gate.
#[derive(Debug, Clone)]
pub struct ViewerOptions {
    pub title: String,
    pub style: PlotStyle,
    pub abscissa: bool,
    pub inner_size: [f32; 2],
}

impl Default for ViewerOptions {
    fn default() -> Self {
        Self {
            title: "tracer".to_string(),
            style: PlotStyle::default(),
            abscissa: false,
            inner_size: [650.0, 524.0],
        }
    }
}

/// Open the window and block until it is closed.
///
/// The gate's repaint hook is pointed at the egui context so frames published
/// by the ingestion thread wake the UI.
pub fn run_tracer(gate: RenderGate, opts: ViewerOptions) -> eframe::Result<()> {
    let native = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(opts.title.clone())
            .with_inner_size(egui::vec2(opts.inner_size[0], opts.inner_size[1])),
        ..Default::default()
    };

    eframe::run_native(
        &opts.title,
        native,
        Box::new(move |cc| {
            let ctx = cc.egui_ctx.clone();
            gate.set_repaint_hook(move || ctx.request_repaint());
            cc.egui_ctx.set_visuals(if opts.style.plain {
                egui::Visuals::light()
            } else {
                egui::Visuals::dark()
            });
            Ok(Box::new(TracerApp::new(gate, opts.style, opts.abscissa)))
        }),
    )
}
