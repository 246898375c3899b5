/// Print constants shared by unit conversion, configuration defaults and sheet building
///
/// Sizes are in millimeters unless the name says otherwise. They are converted to
/// pixels at `PRINT_DPI` when a sheet is built, so changing the resolution scales
/// every derived pixel value together.

/// Print resolution in dots per inch
pub const PRINT_DPI: u32 = 300;

/// Millimeters per inch
pub const MM_PER_INCH: f64 = 25.4;

/// A4 paper width
pub const A4_WIDTH_MM: f64 = 210.0;

/// A4 paper height
pub const A4_HEIGHT_MM: f64 = 297.0;

/// Standard passport photo width
pub const PASSPORT_WIDTH_MM: f64 = 35.0;

/// Standard passport photo height
pub const PASSPORT_HEIGHT_MM: f64 = 45.0;

/// Empty distance between the paper edge and any photo
pub const SHEET_MARGIN_MM: f64 = 10.0;

/// Empty distance between neighbouring photos
pub const PHOTO_SPACING_MM: f64 = 5.0;

/// Horizontal gap in pixels between the source layer and the new sheet frame
pub const SHEET_OFFSET_PX: i32 = 100;

/// Name given to the generated sheet frame
pub const SHEET_NAME: &str = "Passport Photo Sheet (A4)";

/// Gray level (0.0-1.0) of the thin cutting border around each photo
pub const BORDER_GRAY: f32 = 0.8;

/// Cutting border weight in pixels
pub const BORDER_WEIGHT: u32 = 1;

/// Largest sheet, in pixels, a configuration may ask for (A4 at 1200 DPI fits)
pub const MAX_SHEET_PIXELS: u64 = 150_000_000;
