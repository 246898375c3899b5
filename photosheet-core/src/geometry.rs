/// Sheet geometry and grid placement
///
/// This module owns the one piece of real logic in the crate: packing as many
/// whole copies of an item onto a page as fit inside a margin, with a fixed gap
/// between neighbours.
///
/// Key properties of `plan()`:
/// - Every placement lies inside the page minus its margin
/// - Placements never overlap each other
/// - Output is row-major (left to right, then top to bottom)
/// - Partial rows and columns are dropped, never clipped or shrunk
/// - Pure and deterministic: the same config always yields the same sequence
///
/// All values are whole pixels. Internal arithmetic is widened to u64 so no u32
/// input can overflow.

use log::debug;

/// Width and height in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    #[inline]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// True when either side is zero
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Top-left origin of one item instance, measured from the page origin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Placement {
    pub x: u32,
    pub y: u32,
}

impl Placement {
    /// The rectangle covered by an item of `size` placed here
    #[inline]
    pub fn rect(&self, size: Dimensions) -> Rect {
        Rect {
            x: self.x as i64,
            y: self.y as i64,
            width: size.width,
            height: size.height,
        }
    }
}

/// Axis-aligned rectangle with a signed origin
///
/// Signed so host layers can sit anywhere on an unbounded canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    #[inline]
    pub fn right(&self) -> i64 {
        self.x + self.width as i64
    }

    #[inline]
    pub fn bottom(&self) -> i64 {
        self.y + self.height as i64
    }

    /// True when the two rectangles share any area (touching edges do not count)
    #[inline]
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// True when `other` lies entirely inside this rectangle
    #[inline]
    pub fn contains(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }
}

/// Number of columns and rows a plan fills
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GridShape {
    pub columns: u32,
    pub rows: u32,
}

impl GridShape {
    #[inline]
    pub fn capacity(&self) -> usize {
        self.columns as usize * self.rows as usize
    }
}

/// Everything the planner needs to lay out a sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementConfig {
    pub page_size: Dimensions,
    pub item_size: Dimensions,
    /// Empty distance between the page edge and any item
    pub margin: u32,
    /// Empty distance between neighbouring items
    pub spacing: u32,
}

impl PlacementConfig {
    pub fn new(page_size: Dimensions, item_size: Dimensions, margin: u32, spacing: u32) -> Self {
        Self {
            page_size,
            item_size,
            margin,
            spacing,
        }
    }

    /// The area items may occupy: the page shrunk by the margin on every side
    ///
    /// Returns `None` when the margins alone consume the page.
    pub fn printable_area(&self) -> Option<Rect> {
        let margin = self.margin as u64;
        let width = (self.page_size.width as u64).checked_sub(2 * margin)?;
        let height = (self.page_size.height as u64).checked_sub(2 * margin)?;
        Some(Rect {
            x: margin as i64,
            y: margin as i64,
            width: width as u32,
            height: height as u32,
        })
    }

    /// Columns and rows `plan()` will emit, computed without building the plan
    pub fn grid_shape(&self) -> GridShape {
        if self.item_size.is_empty() {
            return GridShape::default();
        }
        GridShape {
            columns: fit_count(self.page_size.width, self.item_size.width, self.margin, self.spacing),
            rows: fit_count(self.page_size.height, self.item_size.height, self.margin, self.spacing),
        }
    }

    /// Total number of placements `plan()` will emit
    #[inline]
    pub fn capacity(&self) -> usize {
        self.grid_shape().capacity()
    }
}

/// How many items of `item` length fit along one axis of `page` length
fn fit_count(page: u32, item: u32, margin: u32, spacing: u32) -> u32 {
    let needed = item as u64 + 2 * margin as u64;
    let page = page as u64;
    if needed > page {
        return 0;
    }
    let step = item as u64 + spacing as u64;
    (1 + (page - needed) / step) as u32
}

/// Lay out as many whole items as fit on the page, in row-major order
///
/// A row starts at `margin` and advances by `item_height + spacing` while
/// `y + item_height + margin <= page_height`. Within a row the column cursor starts
/// at `margin` and advances by `item_width + spacing` while
/// `x + item_width + margin <= page_width`.
///
/// # Returns
/// - One `Placement` per item, row by row, left to right
/// - An empty vector when not even one item fits (`item + 2 × margin > page` on
///   either axis) or when the item has a zero side
pub fn plan(config: &PlacementConfig) -> Vec<Placement> {
    if config.item_size.is_empty() {
        debug!("Item {:?} has no area, nothing to place", config.item_size);
        return Vec::new();
    }

    let page_w = config.page_size.width as u64;
    let page_h = config.page_size.height as u64;
    let item_w = config.item_size.width as u64;
    let item_h = config.item_size.height as u64;
    let margin = config.margin as u64;
    let spacing = config.spacing as u64;

    let mut placements = Vec::with_capacity(config.capacity());

    let mut y = margin;
    while y + item_h + margin <= page_h {
        let mut x = margin;
        while x + item_w + margin <= page_w {
            // Both cursors are bounded by a u32 page side here
            placements.push(Placement {
                x: x as u32,
                y: y as u32,
            });
            x += item_w + spacing;
        }
        y += item_h + spacing;
    }

    debug!(
        "Planned {} placements of {}x{} on {}x{} (margin {}, spacing {})",
        placements.len(),
        item_w,
        item_h,
        page_w,
        page_h,
        margin,
        spacing
    );

    placements
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::*;
    use crate::units::PrintResolution;
    use proptest::prelude::*;

    fn a4_passport_config() -> PlacementConfig {
        let res = PrintResolution::default();
        PlacementConfig::new(
            res.size_mm_to_px(A4_WIDTH_MM, A4_HEIGHT_MM),
            res.size_mm_to_px(PASSPORT_WIDTH_MM, PASSPORT_HEIGHT_MM),
            res.mm_to_px(SHEET_MARGIN_MM),
            res.mm_to_px(PHOTO_SPACING_MM),
        )
    }

    #[test]
    fn test_a4_passport_sheet() {
        let config = a4_passport_config();
        assert_eq!(config.page_size, Dimensions::new(2480, 3508));
        assert_eq!(config.item_size, Dimensions::new(413, 531));
        assert_eq!(config.margin, 118);
        assert_eq!(config.spacing, 59);

        let placements = plan(&config);

        // 4 columns: x = 118, 590, 1062, 1534 (a fifth at 2006 would end at 2419 > 2362)
        // 5 rows:    y = 118, 708, 1298, 1888, 2478 (a sixth at 3068 would end at 3599 > 3390)
        assert_eq!(placements.len(), 20);
        assert_eq!(placements[0], Placement { x: 118, y: 118 });
        assert_eq!(placements[1], Placement { x: 590, y: 118 });
        assert_eq!(placements[3], Placement { x: 1534, y: 118 });
        assert_eq!(placements[4], Placement { x: 118, y: 708 });
        assert_eq!(placements[19], Placement { x: 1534, y: 2478 });
        assert_eq!(config.grid_shape(), GridShape { columns: 4, rows: 5 });
    }

    #[test]
    fn test_single_item_fits() {
        let config = PlacementConfig::new(Dimensions::new(100, 100), Dimensions::new(60, 60), 10, 5);
        assert_eq!(plan(&config), vec![Placement { x: 10, y: 10 }]);
    }

    #[test]
    fn test_item_too_large_for_margins() {
        let config = PlacementConfig::new(Dimensions::new(100, 100), Dimensions::new(90, 90), 10, 0);
        assert!(plan(&config).is_empty());
        assert_eq!(config.capacity(), 0);
    }

    #[test]
    fn test_exact_fit_is_kept() {
        // 10 + 80 + 10 == 100 on both axes
        let config = PlacementConfig::new(Dimensions::new(100, 100), Dimensions::new(80, 80), 10, 0);
        assert_eq!(plan(&config), vec![Placement { x: 10, y: 10 }]);
    }

    #[test]
    fn test_one_axis_too_small() {
        let config = PlacementConfig::new(Dimensions::new(1000, 100), Dimensions::new(50, 90), 10, 0);
        assert!(plan(&config).is_empty());
    }

    #[test]
    fn test_zero_spacing_packs_edge_to_edge() {
        let config = PlacementConfig::new(Dimensions::new(40, 20), Dimensions::new(10, 10), 0, 0);
        let xs: Vec<u32> = plan(&config).iter().filter(|p| p.y == 0).map(|p| p.x).collect();
        assert_eq!(xs, vec![0, 10, 20, 30]);
        assert_eq!(config.grid_shape(), GridShape { columns: 4, rows: 2 });
    }

    #[test]
    fn test_zero_sized_item_is_empty() {
        let config = PlacementConfig::new(Dimensions::new(100, 100), Dimensions::new(0, 10), 0, 0);
        assert!(plan(&config).is_empty());
        assert_eq!(config.capacity(), 0);
    }

    #[test]
    fn test_extreme_values_do_not_overflow() {
        let config = PlacementConfig::new(
            Dimensions::new(u32::MAX, u32::MAX),
            Dimensions::new(u32::MAX / 2, u32::MAX / 2),
            u32::MAX / 4,
            u32::MAX,
        );
        let placements = plan(&config);
        assert_eq!(placements.len(), config.capacity());
        assert_eq!(placements, vec![Placement { x: u32::MAX / 4, y: u32::MAX / 4 }]);
    }

    #[test]
    fn test_printable_area() {
        let config = PlacementConfig::new(Dimensions::new(100, 80), Dimensions::new(10, 10), 10, 0);
        assert_eq!(
            config.printable_area(),
            Some(Rect { x: 10, y: 10, width: 80, height: 60 })
        );

        let config = PlacementConfig::new(Dimensions::new(10, 80), Dimensions::new(1, 1), 6, 0);
        assert_eq!(config.printable_area(), None);
    }

    #[test]
    fn test_rect_contains() {
        let area = Rect { x: 10, y: 10, width: 80, height: 80 };
        assert!(area.contains(&Rect { x: 10, y: 10, width: 80, height: 80 }));
        assert!(area.contains(&Rect { x: 20, y: 30, width: 10, height: 10 }));
        assert!(!area.contains(&Rect { x: 9, y: 10, width: 10, height: 10 }));
        assert!(!area.contains(&Rect { x: 85, y: 10, width: 10, height: 10 }));
    }

    #[test]
    fn test_rect_touching_edges_do_not_intersect() {
        let a = Rect { x: 0, y: 0, width: 10, height: 10 };
        let b = Rect { x: 10, y: 0, width: 10, height: 10 };
        let c = Rect { x: 9, y: 9, width: 10, height: 10 };
        assert!(!a.intersects(&b));
        assert!(a.intersects(&c));
        assert!(b.intersects(&c));
    }

    fn config_strategy() -> impl Strategy<Value = PlacementConfig> {
        (1u32..1500, 1u32..1500, 40u32..800, 40u32..800, 0u32..200, 0u32..150).prop_map(
            |(pw, ph, iw, ih, margin, spacing)| {
                PlacementConfig::new(Dimensions::new(pw, ph), Dimensions::new(iw, ih), margin, spacing)
            },
        )
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(128))]

        #[test]
        fn placements_stay_inside_margins(config in config_strategy()) {
            let placements = plan(&config);
            match config.printable_area() {
                Some(area) => {
                    for p in placements {
                        let rect = p.rect(config.item_size);
                        prop_assert!(area.contains(&rect), "{:?} outside {:?}", rect, area);
                    }
                }
                None => prop_assert!(placements.is_empty()),
            }
        }

        #[test]
        fn placements_never_overlap(config in config_strategy()) {
            let rects: Vec<Rect> = plan(&config).iter().map(|p| p.rect(config.item_size)).collect();
            for (i, a) in rects.iter().enumerate() {
                for b in &rects[i + 1..] {
                    prop_assert!(!a.intersects(b), "{:?} overlaps {:?}", a, b);
                }
            }
        }

        #[test]
        fn placements_are_row_major(config in config_strategy()) {
            let placements = plan(&config);
            for pair in placements.windows(2) {
                let (a, b) = (pair[0], pair[1]);
                prop_assert!(a.y < b.y || (a.y == b.y && a.x <= b.x));
            }
        }

        #[test]
        fn plan_is_deterministic(config in config_strategy()) {
            prop_assert_eq!(plan(&config), plan(&config));
        }

        #[test]
        fn plan_matches_grid_shape(config in config_strategy()) {
            prop_assert_eq!(plan(&config).len(), config.capacity());
        }

        #[test]
        fn oversized_items_yield_nothing(
            page in 1u32..2000,
            item in 1u32..2000,
            margin in 0u32..500,
            other in 1u32..5000,
        ) {
            prop_assume!(item as u64 + 2 * margin as u64 > page as u64);
            let wide = PlacementConfig::new(Dimensions::new(page, other), Dimensions::new(item, 1), margin, 0);
            let tall = PlacementConfig::new(Dimensions::new(other, page), Dimensions::new(1, item), margin, 0);
            prop_assert!(plan(&wide).is_empty());
            prop_assert!(plan(&tall).is_empty());
        }
    }
}
