//! UI panels for the application
//!
//! The sidebar lists loaded tracks and edits the flow line style live.

use crate::app::painter::to_color32;
use crate::app::state::{AppState, SidebarTab};
use egui::{Color32, RichText, Ui};
use flow_line_lib::{Arrow, ColorLike, LineCap, Rgba};

const MAX_WIDTH: f64 = 40.0;

/// Render the sidebar toggle button (overlaid on top-right of map)
pub fn sidebar_toggle_button(ui: &mut Ui, state: &mut AppState) {
    let button_size = egui::vec2(40.0, 40.0);
    let margin = 10.0;

    let rect = ui.max_rect();
    let button_pos = rect.right_top() + egui::vec2(-button_size.x - margin, margin);
    let button_rect = egui::Rect::from_min_size(button_pos, button_size);

    let response = ui.allocate_rect(button_rect, egui::Sense::click());
    if response.clicked() {
        state.style.sidebar_open = !state.style.sidebar_open;
    }

    let bg_color = if response.hovered() {
        ui.visuals().widgets.hovered.bg_fill
    } else {
        ui.visuals().widgets.inactive.bg_fill
    };
    ui.painter().rect_filled(button_rect, 5.0, bg_color);

    let icon = if state.style.sidebar_open { "✕" } else { "☰" };
    ui.painter().text(
        button_rect.center(),
        egui::Align2::CENTER_CENTER,
        icon,
        egui::FontId::proportional(20.0),
        ui.visuals().text_color(),
    );
}

/// Render the main sidebar (responsive: side on landscape, bottom on portrait)
pub fn render_sidebar(ctx: &egui::Context, state: &mut AppState) {
    if !state.style.sidebar_open {
        return;
    }

    let screen_size = ctx.viewport_rect().size();
    if screen_size.y > screen_size.x {
        egui::TopBottomPanel::bottom("main_sidebar")
            .default_height(280.0)
            .min_height(180.0)
            .max_height(ctx.viewport_rect().height() * 0.6)
            .resizable(true)
            .show(ctx, |ui| render_sidebar_content(ui, state));
    } else {
        egui::SidePanel::right("main_sidebar")
            .default_width(300.0)
            .min_width(260.0)
            .max_width(450.0)
            .resizable(true)
            .show(ctx, |ui| render_sidebar_content(ui, state));
    }
}

fn render_sidebar_content(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui| {
        ui.selectable_value(&mut state.active_tab, SidebarTab::Tracks, "📂 Tracks");
        ui.selectable_value(&mut state.active_tab, SidebarTab::Style, "🖌 Style");
    });

    ui.separator();

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui| match state.active_tab {
            SidebarTab::Tracks => render_tracks_tab(ui, state),
            SidebarTab::Style => render_style_tab(ui, state),
        });
}

fn render_tracks_tab(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui| {
        if ui.button("🎯 Fit to Bounds").clicked() {
            state.pending_fit_bounds = true;
        }
        if ui.button("🗑 Clear All").clicked() {
            state.clear();
        }
    });
    ui.label(RichText::new("Drop GPX files on the map to load them").small().weak());
    if state.is_loading() {
        ui.horizontal(|ui| {
            ui.spinner();
            ui.label("Loading…");
        });
    }

    ui.add_space(8.0);
    ui.separator();

    egui::Grid::new("stats_grid")
        .num_columns(2)
        .spacing([12.0, 4.0])
        .show(ui, |ui| {
            ui.label("Tracks");
            ui.label(RichText::new(state.track_count().to_string()).strong());
            ui.end_row();

            ui.label("Points");
            ui.label(RichText::new(state.point_count().to_string()).strong());
            ui.end_row();

            ui.label("Drawn");
            ui.label(format!(
                "{} tracks, {} shapes",
                state.last_render.tracks_drawn, state.last_render.shapes
            ));
            ui.end_row();
        });

    ui.add_space(8.0);
    ui.separator();

    if !state.errors.is_empty() {
        ui.label(
            RichText::new(format!("⚠ Errors ({} files)", state.errors.len()))
                .strong()
                .color(Color32::RED),
        );
        for (file, error) in &state.errors {
            ui.label(
                RichText::new(format!(
                    "• {}: {}",
                    file.file_name().unwrap_or_default().to_string_lossy(),
                    error
                ))
                .small()
                .color(Color32::RED),
            );
        }
        if ui.button("Clear Errors").clicked() {
            state.errors.clear();
        }
        ui.separator();
    }

    let mut to_remove = None;
    for (idx, file) in state.files.iter().enumerate() {
        ui.horizontal(|ui| {
            ui.label(
                RichText::new(format!(
                    "📄 {}",
                    file.path.file_name().unwrap_or_default().to_string_lossy()
                ))
                .small(),
            );
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.small_button("🗑").clicked() {
                    to_remove = Some(idx);
                }
            });
        });
        for track in &file.tracks {
            ui.label(RichText::new(format!("    {} ({} pts)", track.name(), track.len())).small());
        }
    }
    if let Some(idx) = to_remove {
        state.remove_file(idx);
    }
}

fn render_style_tab(ui: &mut Ui, state: &mut AppState) {
    let options = &mut state.style.options;

    egui::Grid::new("style_grid")
        .num_columns(2)
        .spacing([12.0, 6.0])
        .show(ui, |ui| {
            ui.label("Width");
            let mut width = options.width.unwrap_or(0.0);
            if ui
                .add(egui::Slider::new(&mut width, 0.0..=MAX_WIDTH).suffix(" px"))
                .changed()
            {
                options.width = Some(width);
            }
            ui.end_row();

            ui.label("End width");
            ui.horizontal(|ui| {
                let mut enabled = options.width2.is_some();
                if ui.checkbox(&mut enabled, "").changed() {
                    options.width2 = enabled.then_some(width);
                }
                if let Some(width2) = options.width2.as_mut() {
                    ui.add(egui::Slider::new(width2, 0.0..=MAX_WIDTH).suffix(" px"));
                }
            });
            ui.end_row();

            ui.label("Color");
            color_button(ui, &mut options.color);
            ui.end_row();

            ui.label("End color");
            ui.horizontal(|ui| {
                let mut enabled = options.color2.is_some();
                if ui.checkbox(&mut enabled, "").changed() {
                    options.color2 = if enabled { options.color.clone() } else { None };
                }
                if options.color2.is_some() {
                    color_button(ui, &mut options.color2);
                }
            });
            ui.end_row();

            ui.label("Arrow");
            let mut arrow = Arrow::from_code(options.arrow);
            egui::ComboBox::from_id_salt("arrow_combo")
                .selected_text(arrow_label(arrow))
                .show_ui(ui, |ui| {
                    for a in [Arrow::None, Arrow::Start, Arrow::End, Arrow::Both] {
                        ui.selectable_value(&mut arrow, a, arrow_label(a));
                    }
                });
            options.arrow = arrow.code();
            ui.end_row();

            ui.label("Line cap");
            let mut cap = LineCap::from_name(options.line_cap.as_deref().unwrap_or_default());
            egui::ComboBox::from_id_salt("line_cap_combo")
                .selected_text(cap.as_str())
                .show_ui(ui, |ui| {
                    for c in [LineCap::Butt, LineCap::Round] {
                        ui.selectable_value(&mut cap, c, c.as_str());
                    }
                });
            options.line_cap = Some(cap.as_str().to_string());
            ui.end_row();
        });

    ui.add_space(8.0);
    ui.checkbox(&mut options.visible, "Draw the visible part only")
        .on_hover_text("When off, each track is rebuilt in full from its geometry");
    ui.checkbox(&mut state.style.width_by_elevation, "Width follows elevation")
        .on_hover_text("Scale between start and end width with the relative elevation");
}

/// Color picker bound to an optional CSS color
fn color_button(ui: &mut Ui, color: &mut Option<ColorLike>) {
    let current = color
        .clone()
        .and_then(|c| Rgba::try_from(c).ok())
        .unwrap_or(Rgba::BLACK);
    let mut edited = to_color32(current);
    if ui.color_edit_button_srgba(&mut edited).changed() {
        let [r, g, b, a] = edited.to_srgba_unmultiplied();
        *color = Some(ColorLike::Array([
            r as f64,
            g as f64,
            b as f64,
            a as f64 / 255.0,
        ]));
    }
}

fn arrow_label(arrow: Arrow) -> &'static str {
    match arrow {
        Arrow::None => "None",
        Arrow::Start => "Start",
        Arrow::End => "End",
        Arrow::Both => "Both",
    }
}

/// Handle drag and drop of GPX files
pub fn handle_drag_and_drop(ctx: &egui::Context, state: &mut AppState) {
    let hovered_files = ctx.input(|i| !i.raw.hovered_files.is_empty());
    let dropped_files: Vec<_> = ctx.input(|i| i.raw.dropped_files.clone());

    if hovered_files {
        let painter = ctx.layer_painter(egui::LayerId::new(
            egui::Order::Foreground,
            egui::Id::new("drop_preview"),
        ));
        let screen_rect = ctx.content_rect();
        let bg_rect = egui::Rect::from_center_size(screen_rect.center(), egui::vec2(340.0, 80.0));
        painter.rect_filled(bg_rect, 16.0, Color32::from_black_alpha(180));
        painter.text(
            screen_rect.center(),
            egui::Align2::CENTER_CENTER,
            "📂 Drop GPX files here",
            egui::FontId::proportional(32.0),
            Color32::WHITE,
        );
    }

    let paths: Vec<_> = dropped_files
        .into_iter()
        .filter_map(|f| f.path)
        .filter(|p| p.extension().is_some_and(|e| e.eq_ignore_ascii_case("gpx")))
        .collect();
    if !paths.is_empty() {
        state.queue_files(paths);
    }
}
