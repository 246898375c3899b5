pub mod config;
pub mod constants;
pub mod document;
pub mod geometry;
pub mod sheet;
pub mod units;

pub use config::{Config, ConfigError};
pub use document::{DocumentHost, NotifyKind, Paint, Rgb, Stroke};
pub use geometry::{plan, Dimensions, GridShape, Placement, PlacementConfig, Rect};
pub use sheet::{build_sheet, validate_selection, SelectionError, SheetError, SheetReport, SheetSettings};
pub use units::{mm_to_px, PrintResolution};
