use super::App;
use crate::canvas::Canvas;
use log::info;
use photosheet_core::Config;
use std::path::PathBuf;

impl App {
    /// Create a session around an existing canvas
    pub fn new(config: Config, canvas: Canvas) -> Self {
        Self {
            config,
            canvas,
            sheets_written: 0,
        }
    }

    /// Create a session whose selection is the given files, loaded as page layers
    pub fn with_selection(config: Config, paths: &[PathBuf]) -> Self {
        info!("Initializing session with {} selected file(s)", paths.len());

        let mut canvas = Canvas::new();
        let selection = paths.iter().map(|p| canvas.load_layer(p)).collect();
        canvas.select(selection);

        Self::new(config, canvas)
    }
}
