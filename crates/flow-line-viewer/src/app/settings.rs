use clap::Parser;
use flow_line_lib::{ColorLike, FlowLineOptions};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
/// Flow Line Viewer - Draws GPX tracks with variable width and color flow lines
pub struct Settings {
    /// GPX files to load on startup
    #[clap(short, long, value_name = "FILE")]
    pub gpx_files: Vec<PathBuf>,

    /// Line width at the start of each track, in pixels
    #[clap(short, long, default_value = "4.0")]
    pub width: f64,

    /// Line width at the end of each track, in pixels (defaults to --width)
    #[clap(long)]
    pub width2: Option<f64>,

    /// Line color at the start of each track (CSS color)
    #[clap(short, long, default_value = "#1e90ff")]
    pub color: String,

    /// Line color at the end of each track (defaults to --color)
    #[clap(long)]
    pub color2: Option<String>,

    /// Arrowheads: -1 start, 0 none, 1 end, 2 both
    #[clap(short, long, default_value = "1", allow_hyphen_values = true)]
    pub arrow: i64,

    /// Line cap of the track body: butt or round
    #[clap(long, default_value = "butt")]
    pub line_cap: String,

    /// Rebuild the whole track from its geometry instead of drawing only the visible part
    #[clap(long, default_value = "false")]
    pub full_line: bool,

    /// Scale the width between --width and --width2 with the track's relative elevation
    #[clap(long, default_value = "false")]
    pub width_by_elevation: bool,

    /// Ignore previously persisted state and start fresh
    #[clap(long, default_value = "false")]
    pub ignore_persisted: bool,
}

impl Settings {
    /// Style options described by the command line
    pub fn to_options(&self) -> FlowLineOptions {
        FlowLineOptions {
            visible: !self.full_line,
            width: Some(self.width),
            width2: self.width2,
            arrow: self.arrow,
            color: Some(ColorLike::from(self.color.as_str())),
            color2: self.color2.as_deref().map(ColorLike::from),
            line_cap: Some(self.line_cap.clone()),
            geometry: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::try_parse_from(["flow-line-viewer"]).unwrap();
        let options = settings.to_options();

        assert!(settings.gpx_files.is_empty());
        assert!(options.visible);
        assert_eq!(options.width, Some(4.0));
        assert_eq!(options.width2, None);
        assert_eq!(options.arrow, 1);
        assert_eq!(options.color2, None);
        assert_eq!(options.line_cap.as_deref(), Some("butt"));
    }

    #[test]
    fn test_negative_arrow_code() {
        let settings =
            Settings::try_parse_from(["flow-line-viewer", "--arrow", "-1", "--full-line"]).unwrap();
        let options = settings.to_options();

        assert_eq!(options.arrow, -1);
        assert!(!options.visible);
    }

    #[test]
    fn test_gradient_options() {
        let settings = Settings::try_parse_from([
            "flow-line-viewer",
            "-g",
            "a.gpx",
            "-g",
            "b.gpx",
            "--width2",
            "12",
            "--color2",
            "rgba(255, 0, 0, 0.5)",
        ])
        .unwrap();
        let options = settings.to_options();

        assert_eq!(settings.gpx_files.len(), 2);
        assert_eq!(options.width2, Some(12.0));
        assert_eq!(options.color2, Some(ColorLike::Css("rgba(255, 0, 0, 0.5)".into())));
    }
}
