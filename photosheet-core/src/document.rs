/// Capabilities a design-document host must provide to build a photo sheet
///
/// The sheet builder never touches a document directly. Everything it does to
/// the host (reading the selection, creating the frame, cloning and moving
/// layers, notifying the user) goes through this trait, so the same flow can
/// drive an editor plugin bridge, the in-memory raster canvas shipped with the
/// binary, or a recording mock in tests.

use anyhow::Result;
use std::fmt::Debug;

use crate::geometry::{Dimensions, Rect};

/// RGB color with components in 0.0-1.0
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::gray(1.0);

    pub const fn gray(level: f32) -> Self {
        Self {
            r: level,
            g: level,
            b: level,
        }
    }

    /// Convert to 8-bit channels, clamping out-of-range components
    pub fn to_rgb8(&self) -> [u8; 3] {
        let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [channel(self.r), channel(self.g), channel(self.b)]
    }
}

/// A fill on a layer
#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    Solid(Rgb),
    /// An image fill, identified by the host's image handle
    Image { image_ref: String },
}

impl Paint {
    #[inline]
    pub fn is_image(&self) -> bool {
        matches!(self, Paint::Image { .. })
    }
}

/// An outline drawn inside a layer's bounds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Rgb,
    pub weight: u32,
}

/// How a notification should be presented
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyKind {
    Info,
    Error,
}

/// Document operations used by the sheet builder
///
/// Positions are relative to the node's parent. A freshly created or cloned node
/// is detached until it is appended somewhere.
pub trait DocumentHost {
    /// Opaque handle to a layer in the host document
    type Node: Copy + Eq + Debug;

    /// Layers the user currently has selected, in selection order
    fn selection(&self) -> Vec<Self::Node>;

    /// Fills of a layer
    fn fills(&self, node: Self::Node) -> Vec<Paint>;

    /// Position and size of a layer
    fn bounds(&self, node: Self::Node) -> Rect;

    /// Create a named, detached container of the given size with a solid background
    fn create_container(&mut self, name: &str, size: Dimensions, background: Rgb)
        -> Result<Self::Node>;

    /// Duplicate a layer, including its fills and stroke
    fn clone_element(&mut self, node: Self::Node) -> Result<Self::Node>;

    fn resize(&mut self, node: Self::Node, size: Dimensions) -> Result<()>;

    fn set_position(&mut self, node: Self::Node, x: i64, y: i64) -> Result<()>;

    fn set_stroke(&mut self, node: Self::Node, stroke: Stroke) -> Result<()>;

    /// Move `child` under `parent`, after any existing children
    fn append_child(&mut self, parent: Self::Node, child: Self::Node) -> Result<()>;

    /// Attach a layer to the top level of the current page
    fn append_to_page(&mut self, node: Self::Node) -> Result<()>;

    /// Delete a layer and everything under it
    fn remove(&mut self, node: Self::Node) -> Result<()>;

    /// Bring a layer into view. Hosts without a viewport can ignore this.
    fn scroll_into_view(&mut self, _node: Self::Node) {}

    /// Show a short message to the user
    fn notify(&mut self, message: &str, kind: NotifyKind);
}
