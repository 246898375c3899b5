use crate::constants::{MM_PER_INCH, PRINT_DPI};
use crate::geometry::Dimensions;

/// Convert a length in millimeters to whole pixels at the given resolution
///
/// Rounds to the nearest pixel. Negative, NaN or infinite lengths map to 0 so the
/// result can always be fed to the layout planner.
#[inline]
pub fn mm_to_px(mm: f64, dpi: u32) -> u32 {
    if !mm.is_finite() || mm <= 0.0 {
        return 0;
    }
    let px = (mm * (1.0 / MM_PER_INCH) * dpi as f64).round();
    if px >= u32::MAX as f64 {
        u32::MAX
    } else {
        px as u32
    }
}

/// A fixed print resolution used to turn physical sizes into pixel sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrintResolution {
    pub dpi: u32,
}

impl Default for PrintResolution {
    fn default() -> Self {
        Self { dpi: PRINT_DPI }
    }
}

impl PrintResolution {
    pub fn new(dpi: u32) -> Self {
        Self { dpi }
    }

    #[inline]
    pub fn mm_to_px(&self, mm: f64) -> u32 {
        mm_to_px(mm, self.dpi)
    }

    /// Convert a width × height in millimeters to pixel dimensions
    #[inline]
    pub fn size_mm_to_px(&self, width_mm: f64, height_mm: f64) -> Dimensions {
        Dimensions::new(self.mm_to_px(width_mm), self.mm_to_px(height_mm))
    }
}
