#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // hide console window on Windows in release

use clap::Parser;
use flow_line_viewer::Settings;

fn main() -> eframe::Result<()> {
    flow_line_viewer::run_native(Settings::parse())
}
