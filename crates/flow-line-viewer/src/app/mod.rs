//! Application module
//!
//! A full-screen map with every loaded GPX track drawn as a flow line, and a toggleable
//! sidebar listing the tracks and editing the style live.

mod painter;
mod plugin;
pub(crate) mod settings;
mod state;
mod track;
mod ui_panels;

use crate::app::plugin::{FlowLinePlugin, RenderStats};
use crate::app::settings::Settings;
use crate::app::state::{AppState, StyleSettings};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use walkers::{HttpTiles, Map, MapMemory, sources::OpenStreetMap};

const PERSISTED_KEY: &str = "persisted_settings";

/// Persisted settings (no track data)
#[derive(serde::Serialize, serde::Deserialize)]
struct PersistedSettings {
    style: StyleSettings,
    /// File paths that were loaded (will be reloaded)
    loaded_file_paths: Vec<String>,
}

/// Main application structure
pub struct FlowLineViewerApp {
    state: AppState,

    /// Map tiles provider (OpenStreetMap)
    tiles: HttpTiles,

    /// Map state (camera position, zoom, etc.)
    map_memory: MapMemory,

    /// Shared render statistics (updated by plugin each frame)
    render_stats: Arc<Mutex<RenderStats>>,
}

impl FlowLineViewerApp {
    pub fn new(cc: &eframe::CreationContext<'_>, cli_args: Settings) -> Self {
        let persisted = if cli_args.ignore_persisted {
            tracing::info!("Ignoring persisted state (--ignore-persisted flag)");
            None
        } else {
            cc.storage.and_then(Self::load_persisted_settings)
        };

        let (style, mut files) = match persisted {
            Some(p) => (
                p.style,
                p.loaded_file_paths.into_iter().map(PathBuf::from).collect(),
            ),
            None => (StyleSettings::from_cli(&cli_args), Vec::new()),
        };
        // Persisted files that disappeared are dropped silently
        files.retain(|p: &PathBuf| p.exists());
        files.extend(cli_args.gpx_files.iter().cloned());

        let mut state = AppState::new(style);
        tracing::info!("Initialized, loading {} file(s)", files.len());
        state.queue_files(files);

        Self {
            state,
            tiles: HttpTiles::new(OpenStreetMap, cc.egui_ctx.clone()),
            map_memory: MapMemory::default(),
            render_stats: Arc::new(Mutex::new(RenderStats::default())),
        }
    }

    fn load_persisted_settings(storage: &dyn eframe::Storage) -> Option<PersistedSettings> {
        let json = storage.get_string(PERSISTED_KEY)?;
        match serde_json::from_str::<PersistedSettings>(&json) {
            Ok(settings) => {
                tracing::info!("Restored settings, will reload files");
                Some(settings)
            }
            Err(e) => {
                tracing::warn!("Discarding persisted settings: {}", e);
                None
            }
        }
    }

    /// Fit the map view to the bounding box of all loaded tracks
    fn fit_to_bounds(&mut self) {
        let Some(bounds) = self.state.bounding_box() else {
            return;
        };
        let center = bounds.center();

        let max_span = bounds.width().max(bounds.height());
        let zoom = if max_span > 0.0 {
            ((4.0 * 360.0 / max_span).log2() - 0.5).clamp(1.0, 18.0)
        } else {
            12.0
        };

        self.map_memory.center_at(walkers::lat_lon(center.y, center.x));
        if let Err(e) = self.map_memory.set_zoom(zoom) {
            tracing::debug!("Could not zoom to {:.1}: {:?}", zoom, e);
        }

        tracing::trace!("Auto-zoomed to bounds: {:?}, zoom: {:.1}", bounds, zoom);
    }
}

#[profiling::all_functions]
impl eframe::App for FlowLineViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.state.poll_loading();
        if self.state.is_loading() {
            ctx.request_repaint_after(std::time::Duration::from_millis(50));
        }

        if self.state.pending_fit_bounds {
            self.state.pending_fit_bounds = false;
            self.fit_to_bounds();
        }

        ui_panels::handle_drag_and_drop(ctx, &mut self.state);
        ui_panels::render_sidebar(ctx, &mut self.state);

        let plugin = FlowLinePlugin::new(
            self.state.tracks(),
            self.state.build_style(),
            self.render_stats.clone(),
        );

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                profiling::scope!("map_panel");

                let map = Map::new(
                    Some(&mut self.tiles),
                    &mut self.map_memory,
                    walkers::lat_lon(0.0, 0.0),
                )
                .with_plugin(plugin);
                ui.add(map);

                if let Ok(stats) = self.render_stats.lock() {
                    self.state.last_render = *stats;
                }

                ui_panels::sidebar_toggle_button(ui, &mut self.state);

                let screen_rect = ui.max_rect();
                ui.painter().text(
                    screen_rect.center_bottom() + egui::vec2(0.0, -5.0),
                    egui::Align2::CENTER_BOTTOM,
                    "© OpenStreetMap contributors",
                    egui::FontId::proportional(10.0),
                    egui::Color32::from_black_alpha(180),
                );
            });
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        let settings = PersistedSettings {
            style: self.state.style.clone(),
            loaded_file_paths: self
                .state
                .file_paths()
                .map(|p| p.to_string_lossy().to_string())
                .collect(),
        };

        match serde_json::to_string(&settings) {
            Ok(json) => {
                storage.set_string(PERSISTED_KEY, json);
                tracing::debug!("Saved settings on exit");
            }
            Err(e) => tracing::warn!("Could not save settings: {}", e),
        }
    }
}
