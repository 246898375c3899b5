use crate::canvas::Canvas;
use photosheet_core::Config;
use std::path::PathBuf;

/// Main application state
pub struct App {
    pub(super) config: Config,
    pub(super) canvas: Canvas,
    /// Sheets exported so far, used to number output files
    pub(super) sheets_written: usize,
}

impl App {
    /// Path the next exported sheet is written to
    pub(super) fn next_output_path(&self) -> PathBuf {
        let output = &self.config.output;
        output
            .directory
            .join(format!("{}-{}.png", output.file_prefix, self.sheets_written + 1))
    }
}
