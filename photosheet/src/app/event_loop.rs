use super::commands::{format_notification, parse_command, PluginCommand};
use super::export::export_png;
use super::App;
use anyhow::Result;
use log::{debug, info, warn};
use photosheet_core::{build_sheet, DocumentHost, NotifyKind};
use std::path::PathBuf;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

/// Whether the session keeps reading commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Flow {
    Continue,
    Exit,
}

impl App {
    /// Read commands from stdin until `cancel` or end of input
    pub async fn run(self) -> Result<()> {
        self.run_with(BufReader::new(tokio::io::stdin())).await?;
        Ok(())
    }

    /// Read commands line by line from `reader` until `cancel` or end of input
    ///
    /// Lines that are not valid UTF-8 are decoded lossily, so they fall through
    /// as unknown input instead of ending the session.
    pub(super) async fn run_with<R: AsyncBufRead + Unpin>(mut self, mut reader: R) -> Result<usize> {
        info!(
            "{} layer(s) on the page, {} selected",
            self.canvas.page().len(),
            self.canvas.selection().len()
        );
        info!("Waiting for commands on stdin: create-sheet, cancel");

        let mut buf = Vec::new();
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf).await? == 0 {
                break;
            }
            let line = String::from_utf8_lossy(&buf);
            let Some(cmd) = parse_command(&line) else {
                continue;
            };
            if self.handle_command(cmd).await == Flow::Exit {
                break;
            }
        }

        info!("Session closed after {} sheet(s)", self.sheets_written);
        Ok(self.sheets_written)
    }

    pub(super) async fn handle_command(&mut self, cmd: PluginCommand) -> Flow {
        debug!("Handling {:?}", cmd);
        let flow = match cmd {
            PluginCommand::CreateSheet => {
                self.create_sheet().await;
                Flow::Continue
            }
            PluginCommand::Cancel => Flow::Exit,
        };

        for (message, kind) in self.canvas.take_notifications() {
            println!("{}", format_notification(&message, kind));
        }
        flow
    }

    /// Build a sheet from the selection and export it. Failures are reported
    /// through the canvas notifications.
    pub(super) async fn create_sheet(&mut self) -> Option<PathBuf> {
        let settings = self.config.sheet_settings();
        let report = match build_sheet(&mut self.canvas, &settings) {
            Ok(report) => report,
            Err(e) => {
                debug!("Sheet not created: {}", e);
                return None;
            }
        };

        let raster = match self.canvas.render(report.frame) {
            Ok(raster) => raster,
            Err(e) => {
                warn!("Failed to render sheet: {:#}", e);
                self.canvas
                    .notify(&format!("Failed to render sheet: {}", e), NotifyKind::Error);
                return None;
            }
        };

        debug!("Viewport on {:?}", self.canvas.focused());
        match export_png(raster, self.next_output_path()).await {
            Ok(path) => {
                self.sheets_written += 1;
                self.canvas
                    .notify(&format!("Saved {}", path.display()), NotifyKind::Info);
                Some(path)
            }
            Err(e) => {
                warn!("Failed to export sheet: {:#}", e);
                self.canvas
                    .notify(&format!("Failed to export sheet: {}", e), NotifyKind::Error);
                None
            }
        }
    }
}
