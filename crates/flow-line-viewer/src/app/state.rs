//! Application state management
//!
//! Loaded tracks grouped by source file, plus the style settings edited in the sidebar.

use crate::app::plugin::RenderStats;
use crate::app::settings::Settings;
use crate::app::track::{self, Track};
use flow_line_lib::{FlowLineOptions, FlowLineStyle};
use geo::Rect;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};

/// Style settings, persisted between runs
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct StyleSettings {
    pub options: FlowLineOptions,
    /// Width follows the track's relative elevation instead of its length
    pub width_by_elevation: bool,
    pub sidebar_open: bool,
}

impl Default for StyleSettings {
    fn default() -> Self {
        Self {
            options: FlowLineOptions::default(),
            width_by_elevation: false,
            sidebar_open: true,
        }
    }
}

impl StyleSettings {
    pub fn from_cli(settings: &Settings) -> Self {
        Self {
            options: settings.to_options(),
            width_by_elevation: settings.width_by_elevation,
            sidebar_open: true,
        }
    }
}

/// Sidebar tabs
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum SidebarTab {
    #[default]
    Tracks,
    Style,
}

/// A GPX file and the tracks read from it
pub struct LoadedFile {
    pub path: PathBuf,
    pub tracks: Vec<Arc<Track>>,
}

type LoadResults = Vec<(PathBuf, track::Result<Vec<Arc<Track>>>)>;

/// A batch of files parsed on a background thread
struct PendingLoad {
    paths: Vec<PathBuf>,
    results: Receiver<LoadResults>,
}

/// Main application state
pub struct AppState {
    pub files: Vec<LoadedFile>,
    /// Load errors
    pub errors: Vec<(PathBuf, String)>,
    pub style: StyleSettings,
    /// Fit the map to the tracks on the next frame
    pub pending_fit_bounds: bool,
    pub active_tab: SidebarTab,
    /// What the map drew last frame
    pub last_render: RenderStats,
    loads: Vec<PendingLoad>,
}

impl AppState {
    pub fn new(style: StyleSettings) -> Self {
        Self {
            files: Vec::new(),
            errors: Vec::new(),
            style,
            pending_fit_bounds: false,
            active_tab: SidebarTab::default(),
            last_render: RenderStats::default(),
            loads: Vec::new(),
        }
    }

    /// Start parsing GPX files on a background thread, skipping loaded and in-flight ones
    ///
    /// Results are merged by [`Self::poll_loading`].
    pub fn queue_files(&mut self, paths: Vec<PathBuf>) {
        let mut pending: Vec<PathBuf> = Vec::new();
        for path in paths {
            let known = self.files.iter().any(|f| f.path == path)
                || self.loads.iter().any(|l| l.paths.contains(&path));
            if !known && !pending.contains(&path) {
                pending.push(path);
            }
        }
        if pending.is_empty() {
            return;
        }

        tracing::debug!("Loading {} file(s) in the background", pending.len());
        let (tx, rx) = mpsc::channel();
        let paths = pending.clone();
        std::thread::spawn(move || {
            profiling::scope!("load_gpx_files");
            if tx.send(track::load_gpx_files(&pending)).is_err() {
                tracing::debug!("Load results dropped, the app is gone");
            }
        });
        self.loads.push(PendingLoad { paths, results: rx });
    }

    /// Merge the batches that finished loading, returns whether anything changed
    pub fn poll_loading(&mut self) -> bool {
        let mut finished = Vec::new();
        let mut lost = Vec::new();
        self.loads.retain(|load| match load.results.try_recv() {
            Ok(results) => {
                finished.push(results);
                false
            }
            Err(TryRecvError::Empty) => true,
            Err(TryRecvError::Disconnected) => {
                lost.extend(load.paths.iter().cloned());
                false
            }
        });

        let changed = !finished.is_empty() || !lost.is_empty();
        for results in finished {
            self.apply_loaded(results);
        }
        for path in lost {
            tracing::warn!("Loader thread exited before reading {}", path.display());
            self.errors.push((path, "loader thread exited".to_string()));
        }
        changed
    }

    /// Whether any file is still being parsed
    pub fn is_loading(&self) -> bool {
        !self.loads.is_empty()
    }

    /// Loaded files followed by the ones still being parsed
    pub fn file_paths(&self) -> impl Iterator<Item = &PathBuf> {
        self.files
            .iter()
            .map(|f| &f.path)
            .chain(self.loads.iter().flat_map(|l| &l.paths))
    }

    fn apply_loaded(&mut self, results: LoadResults) {
        profiling::scope!("apply_loaded");

        for (path, result) in results {
            self.errors.retain(|(p, _)| p != &path);
            match result {
                Ok(tracks) => {
                    tracing::info!("Loaded {} track(s) from {}", tracks.len(), path.display());
                    if !self.files.iter().any(|f| f.path == path) {
                        self.files.push(LoadedFile { path, tracks });
                        self.pending_fit_bounds = true;
                    }
                }
                Err(e) => {
                    tracing::warn!("Failed to load {}: {}", path.display(), e);
                    self.errors.push((path, e.to_string()));
                }
            }
        }
    }

    /// Remove a loaded file by index
    pub fn remove_file(&mut self, index: usize) {
        if index < self.files.len() {
            let file = self.files.remove(index);
            tracing::debug!("Removed {}", file.path.display());
        }
    }

    /// Clear all loaded tracks
    pub fn clear(&mut self) {
        self.files.clear();
        self.errors.clear();
    }

    /// All tracks of all files, in load order
    pub fn tracks(&self) -> Vec<Arc<Track>> {
        self.files.iter().flat_map(|f| f.tracks.iter().cloned()).collect()
    }

    pub fn track_count(&self) -> usize {
        self.files.iter().map(|f| f.tracks.len()).sum()
    }

    pub fn point_count(&self) -> usize {
        self.files.iter().flat_map(|f| &f.tracks).map(|t| t.len()).sum()
    }

    /// Bounding box of every loaded track in WGS84 degrees
    pub fn bounding_box(&self) -> Option<Rect<f64>> {
        self.files
            .iter()
            .flat_map(|f| &f.tracks)
            .filter_map(|t| t.bounding_box())
            .reduce(|a, b| {
                Rect::new(
                    geo::coord! { x: a.min().x.min(b.min().x), y: a.min().y.min(b.min().y) },
                    geo::coord! { x: a.max().x.max(b.max().x), y: a.max().y.max(b.max().y) },
                )
            })
    }

    /// Style for the current settings
    pub fn build_style(&self) -> FlowLineStyle<Track> {
        let options = &self.style.options;
        let style = FlowLineStyle::new(options.clone());
        if !self.style.width_by_elevation {
            return style;
        }

        let start = style.width().unwrap_or(0.0);
        let end = style.width2().unwrap_or(start);
        style.with_width_fn(move |track: &Track, step| {
            let t = track.relative_elevation_at(step).unwrap_or(step);
            start + (end - start) * t
        })
    }
}
