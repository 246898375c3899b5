/// Photo sheet building on top of a document host
///
/// Validates the selection, converts the physical layout to pixels, creates the
/// sheet frame next to the source layer and fills it with one clone of a resized
/// master photo per placement from `plan()`.

use log::{debug, info, warn};
use thiserror::Error;

use crate::constants::*;
use crate::document::{DocumentHost, NotifyKind, Rgb, Stroke};
use crate::geometry::{plan, Dimensions, GridShape, PlacementConfig};
use crate::units::PrintResolution;

/// Why the current selection cannot be turned into a sheet
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SelectionError {
    #[error("Please select a single image layer.")]
    NotSingle { count: usize },

    #[error("Please select a layer with an image fill.")]
    NoImageFill,
}

#[derive(Debug, Error)]
pub enum SheetError {
    #[error(transparent)]
    Selection(#[from] SelectionError),

    #[error("Host operation failed: {0}")]
    Host(#[from] anyhow::Error),
}

/// Physical sheet layout, in millimeters at a print resolution
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SheetSettings {
    pub dpi: u32,
    pub paper_mm: (f64, f64),
    pub photo_mm: (f64, f64),
    pub margin_mm: f64,
    pub spacing_mm: f64,
    /// Outline every photo with a thin gray cutting border
    pub border: bool,
}

impl Default for SheetSettings {
    fn default() -> Self {
        Self {
            dpi: PRINT_DPI,
            paper_mm: (A4_WIDTH_MM, A4_HEIGHT_MM),
            photo_mm: (PASSPORT_WIDTH_MM, PASSPORT_HEIGHT_MM),
            margin_mm: SHEET_MARGIN_MM,
            spacing_mm: PHOTO_SPACING_MM,
            border: true,
        }
    }
}

impl SheetSettings {
    #[inline]
    pub fn resolution(&self) -> PrintResolution {
        PrintResolution::new(self.dpi)
    }

    /// Pixel layout handed to the planner
    pub fn placement_config(&self) -> PlacementConfig {
        let res = self.resolution();
        PlacementConfig::new(
            res.size_mm_to_px(self.paper_mm.0, self.paper_mm.1),
            res.size_mm_to_px(self.photo_mm.0, self.photo_mm.1),
            res.mm_to_px(self.margin_mm),
            res.mm_to_px(self.spacing_mm),
        )
    }
}

/// Outcome of a successful build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetReport<N> {
    /// The sheet frame, attached to the page
    pub frame: N,
    pub page_size: Dimensions,
    pub photo_size: Dimensions,
    pub shape: GridShape,
    /// Number of photos placed on the sheet
    pub placed: usize,
}

/// Check that exactly one layer is selected and that it carries an image fill
pub fn validate_selection<H: DocumentHost>(host: &H) -> Result<H::Node, SelectionError> {
    let selection = host.selection();
    let node = match selection.as_slice() {
        [node] => *node,
        _ => {
            return Err(SelectionError::NotSingle {
                count: selection.len(),
            })
        }
    };

    if !host.fills(node).iter().any(|fill| fill.is_image()) {
        return Err(SelectionError::NoImageFill);
    }

    Ok(node)
}

/// Build a sheet of photos from the selected image layer
///
/// Every failure is also reported to the user through [`DocumentHost::notify`].
/// When a host operation fails half way, the partial frame and master photo are
/// removed again.
pub fn build_sheet<H: DocumentHost>(
    host: &mut H,
    settings: &SheetSettings,
) -> Result<SheetReport<H::Node>, SheetError> {
    let source = match validate_selection(&*host) {
        Ok(node) => node,
        Err(e) => {
            warn!("Selection rejected: {:?}", e);
            host.notify(&e.to_string(), NotifyKind::Error);
            return Err(e.into());
        }
    };

    host.notify("Processing... Please wait.", NotifyKind::Info);

    let layout = settings.placement_config();
    debug!("Sheet layout: {:?}", layout);

    let source_bounds = host.bounds(source);
    let frame = match host.create_container(SHEET_NAME, layout.page_size, Rgb::WHITE) {
        Ok(frame) => frame,
        Err(e) => return Err(report_failure(host, e)),
    };

    let origin = (source_bounds.right() + SHEET_OFFSET_PX as i64, source_bounds.y);
    let mut master = None;
    let result = fill_frame(host, source, frame, origin, &mut master, &layout, settings.border);

    match result {
        Ok(placed) => {
            let message = format!("✅ Successfully created A4 sheet with {} photos!", placed);
            info!("{}", message);
            host.notify(&message, NotifyKind::Info);
            Ok(SheetReport {
                frame,
                page_size: layout.page_size,
                photo_size: layout.item_size,
                shape: layout.grid_shape(),
                placed,
            })
        }
        Err(e) => {
            for node in master.into_iter().chain(std::iter::once(frame)) {
                if let Err(cleanup) = host.remove(node) {
                    warn!("Failed to clean up {:?}: {}", node, cleanup);
                }
            }
            Err(report_failure(host, e))
        }
    }
}

fn report_failure<H: DocumentHost>(host: &mut H, error: anyhow::Error) -> SheetError {
    warn!("Sheet creation failed: {:#}", error);
    host.notify(
        &format!("Failed to create sheet: {}", error),
        NotifyKind::Error,
    );
    SheetError::Host(error)
}

/// Position the frame, place one copy of the master per planned slot and attach
/// the frame to the page. Returns the number of copies placed.
fn fill_frame<H: DocumentHost>(
    host: &mut H,
    source: H::Node,
    frame: H::Node,
    (frame_x, frame_y): (i64, i64),
    master_slot: &mut Option<H::Node>,
    layout: &PlacementConfig,
    border: bool,
) -> anyhow::Result<usize> {
    host.set_position(frame, frame_x, frame_y)?;

    let master = host.clone_element(source)?;
    *master_slot = Some(master);
    host.resize(master, layout.item_size)?;
    if border {
        host.set_stroke(
            master,
            Stroke {
                color: Rgb::gray(BORDER_GRAY),
                weight: BORDER_WEIGHT,
            },
        )?;
    }

    let placements = plan(layout);
    for placement in &placements {
        let photo = host.clone_element(master)?;
        host.set_position(photo, placement.x as i64, placement.y as i64)?;
        host.append_child(frame, photo)?;
    }

    host.remove(master)?;
    *master_slot = None;

    host.append_to_page(frame)?;
    host.scroll_into_view(frame);

    Ok(placements.len())
}
