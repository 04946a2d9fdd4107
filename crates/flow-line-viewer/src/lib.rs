//! Flow Line Viewer - Application Library
//!
//! A desktop map viewer that loads GPX tracks and paints them with the flow line style,
//! acting as the host renderer for `flow-line-lib`.

mod app;
mod logging;

pub use app::FlowLineViewerApp;
pub use app::settings::Settings;

const APP_NAME: &str = "Flow Line Viewer";

/// Run the application on native (desktop) platforms.
pub fn run_native(settings: Settings) -> eframe::Result<()> {
    // Must run before any logging
    logging::setup_logging();
    tracing::info!("Starting {} {}", APP_NAME, env!("CARGO_PKG_VERSION"));

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_title(APP_NAME)
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        APP_NAME,
        native_options,
        Box::new(move |cc| Ok(Box::new(FlowLineViewerApp::new(cc, settings)))),
    )
}
