use anyhow::{anyhow, Result};
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use log::{debug, info, warn};
use photosheet_core::{Dimensions, DocumentHost, NotifyKind, Paint, Rect, Rgb, Stroke};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Gap between layers loaded side by side onto the page
const LAYER_GAP: i64 = 100;

/// Size given to a placeholder layer for a file that is not an image
const PLACEHOLDER_SIZE: u32 = 100;

pub type NodeId = usize;

/// A layer in the in-memory document
#[derive(Debug, Clone)]
pub struct CanvasNode {
    pub name: String,
    /// Position relative to the parent (or the page)
    pub bounds: Rect,
    pub fills: Vec<Paint>,
    pub stroke: Option<Stroke>,
    pub children: Vec<NodeId>,
    pub parent: Option<NodeId>,
}

impl CanvasNode {
    fn new(name: impl Into<String>, bounds: Rect, fills: Vec<Paint>) -> Self {
        Self {
            name: name.into(),
            bounds,
            fills,
            stroke: None,
            children: Vec::new(),
            parent: None,
        }
    }
}

/// In-memory document host backed by decoded raster images
///
/// Layers live in a slot arena so handles stay valid after unrelated removals.
/// Image fills reference decoded images by key; clones share the pixel data.
#[derive(Default)]
pub struct Canvas {
    nodes: Vec<Option<CanvasNode>>,
    images: HashMap<String, Arc<RgbaImage>>,
    page: Vec<NodeId>,
    selection: Vec<NodeId>,
    notifications: Vec<(String, NotifyKind)>,
    focused: Option<NodeId>,
}

impl Canvas {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a file as a page layer
    ///
    /// Decodable images get an image fill sized to their pixels. Anything else
    /// becomes a gray placeholder layer without an image fill.
    pub fn load_layer(&mut self, path: &Path) -> NodeId {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        match image::open(path) {
            Ok(img) => {
                let rgba = img.to_rgba8();
                info!(
                    "Loaded layer {}: {}x{} pixels",
                    name,
                    rgba.width(),
                    rgba.height()
                );
                self.add_image_layer(&name, path.display().to_string(), rgba)
            }
            Err(e) => {
                warn!("{} is not a readable image ({}), adding placeholder", name, e);
                let bounds = Rect {
                    x: self.next_free_x(),
                    y: 0,
                    width: PLACEHOLDER_SIZE,
                    height: PLACEHOLDER_SIZE,
                };
                self.insert_on_page(CanvasNode::new(name, bounds, vec![Paint::Solid(Rgb::gray(0.5))]))
            }
        }
    }

    /// Add an already decoded image as a page layer
    pub fn add_image_layer(&mut self, name: &str, image_ref: String, image: RgbaImage) -> NodeId {
        let bounds = Rect {
            x: self.next_free_x(),
            y: 0,
            width: image.width(),
            height: image.height(),
        };
        self.images.insert(image_ref.clone(), Arc::new(image));
        self.insert_on_page(CanvasNode::new(name, bounds, vec![Paint::Image { image_ref }]))
    }

    pub fn select(&mut self, nodes: Vec<NodeId>) {
        self.selection = nodes
            .into_iter()
            .filter(|id| self.node(*id).is_some())
            .collect();
    }

    pub fn node(&self, id: NodeId) -> Option<&CanvasNode> {
        self.nodes.get(id).and_then(|slot| slot.as_ref())
    }

    /// Top-level layers in page order
    pub fn page(&self) -> &[NodeId] {
        &self.page
    }

    /// Layer last scrolled into view
    pub fn focused(&self) -> Option<NodeId> {
        self.focused
    }

    /// Drain pending user notifications
    pub fn take_notifications(&mut self) -> Vec<(String, NotifyKind)> {
        std::mem::take(&mut self.notifications)
    }

    /// Rasterize a layer and its direct children
    ///
    /// The layer's first solid fill is the background (white when it has none).
    /// Children are drawn in append order: image scaled to the child's size,
    /// then its stroke inside the child's bounds.
    pub fn render(&self, id: NodeId) -> Result<RgbaImage> {
        let node = self.get(id)?;
        debug!("Rendering {} with {} layer(s)", node.name, node.children.len());
        let background = node
            .fills
            .iter()
            .find_map(|fill| match fill {
                Paint::Solid(color) => Some(*color),
                Paint::Image { .. } => None,
            })
            .unwrap_or(Rgb::WHITE);

        let mut out = RgbaImage::from_pixel(node.bounds.width, node.bounds.height, to_rgba(background));
        let mut scaled_cache: HashMap<(&str, u32, u32), RgbaImage> = HashMap::new();

        for child_id in &node.children {
            let child = self.get(*child_id)?;
            let b = child.bounds;
            if b.width == 0 || b.height == 0 {
                continue;
            }

            for fill in &child.fills {
                match fill {
                    Paint::Solid(color) => fill_rect(&mut out, b, to_rgba(*color)),
                    Paint::Image { image_ref } => {
                        let source = self
                            .images
                            .get(image_ref)
                            .ok_or_else(|| anyhow!("Missing image data for {}", image_ref))?;
                        let key = (image_ref.as_str(), b.width, b.height);
                        let scaled = scaled_cache.entry(key).or_insert_with(|| {
                            debug!("Scaling {} to {}x{}", image_ref, b.width, b.height);
                            imageops::resize(&**source, b.width, b.height, FilterType::Lanczos3)
                        });
                        imageops::overlay(&mut out, &*scaled, b.x, b.y);
                    }
                }
            }

            if let Some(stroke) = child.stroke {
                draw_stroke(&mut out, b, stroke);
            }
        }

        Ok(out)
    }

    fn get(&self, id: NodeId) -> Result<&CanvasNode> {
        self.node(id).ok_or_else(|| anyhow!("No layer with id {}", id))
    }

    fn get_mut(&mut self, id: NodeId) -> Result<&mut CanvasNode> {
        self.nodes
            .get_mut(id)
            .and_then(|slot| slot.as_mut())
            .ok_or_else(|| anyhow!("No layer with id {}", id))
    }

    fn insert(&mut self, node: CanvasNode) -> NodeId {
        self.nodes.push(Some(node));
        self.nodes.len() - 1
    }

    fn insert_on_page(&mut self, node: CanvasNode) -> NodeId {
        let id = self.insert(node);
        self.page.push(id);
        id
    }

    fn next_free_x(&self) -> i64 {
        self.page
            .iter()
            .filter_map(|id| self.node(*id))
            .map(|n| n.bounds.right() + LAYER_GAP)
            .max()
            .unwrap_or(0)
    }

    /// Take a layer out of its parent or off the page without deleting it
    fn detach(&mut self, id: NodeId) -> Result<()> {
        let parent = self.get(id)?.parent;
        match parent {
            Some(parent) => {
                self.get_mut(parent)?.children.retain(|c| *c != id);
                self.get_mut(id)?.parent = None;
            }
            None => self.page.retain(|p| *p != id),
        }
        Ok(())
    }
}

impl DocumentHost for Canvas {
    type Node = NodeId;

    fn selection(&self) -> Vec<NodeId> {
        self.selection.clone()
    }

    fn fills(&self, node: NodeId) -> Vec<Paint> {
        self.node(node).map(|n| n.fills.clone()).unwrap_or_default()
    }

    fn bounds(&self, node: NodeId) -> Rect {
        self.node(node).map(|n| n.bounds).unwrap_or_default()
    }

    fn create_container(&mut self, name: &str, size: Dimensions, background: Rgb) -> Result<NodeId> {
        let bounds = Rect {
            x: 0,
            y: 0,
            width: size.width,
            height: size.height,
        };
        Ok(self.insert(CanvasNode::new(name, bounds, vec![Paint::Solid(background)])))
    }

    fn clone_element(&mut self, node: NodeId) -> Result<NodeId> {
        let original = self.get(node)?;
        if !original.children.is_empty() {
            return Err(anyhow!("Cloning layers with children is not supported"));
        }
        let mut copy = original.clone();
        copy.parent = None;
        Ok(self.insert(copy))
    }

    fn resize(&mut self, node: NodeId, size: Dimensions) -> Result<()> {
        let bounds = &mut self.get_mut(node)?.bounds;
        bounds.width = size.width;
        bounds.height = size.height;
        Ok(())
    }

    fn set_position(&mut self, node: NodeId, x: i64, y: i64) -> Result<()> {
        let bounds = &mut self.get_mut(node)?.bounds;
        bounds.x = x;
        bounds.y = y;
        Ok(())
    }

    fn set_stroke(&mut self, node: NodeId, stroke: Stroke) -> Result<()> {
        self.get_mut(node)?.stroke = Some(stroke);
        Ok(())
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        if parent == child {
            return Err(anyhow!("Cannot append layer {} to itself", child));
        }
        self.get(parent)?;
        self.detach(child)?;
        self.get_mut(parent)?.children.push(child);
        self.get_mut(child)?.parent = Some(parent);
        Ok(())
    }

    fn append_to_page(&mut self, node: NodeId) -> Result<()> {
        self.detach(node)?;
        self.page.push(node);
        Ok(())
    }

    fn remove(&mut self, node: NodeId) -> Result<()> {
        self.detach(node)?;
        let mut pending = vec![node];
        while let Some(id) = pending.pop() {
            if let Some(removed) = self.nodes.get_mut(id).and_then(Option::take) {
                pending.extend(removed.children);
            }
        }
        self.selection.retain(|s| self.nodes.get(*s).is_some_and(Option::is_some));
        if self.focused.is_some_and(|f| self.node(f).is_none()) {
            self.focused = None;
        }
        Ok(())
    }

    fn scroll_into_view(&mut self, node: NodeId) {
        self.focused = Some(node);
    }

    fn notify(&mut self, message: &str, kind: NotifyKind) {
        match kind {
            NotifyKind::Info => info!("{}", message),
            NotifyKind::Error => warn!("{}", message),
        }
        self.notifications.push((message.to_string(), kind));
    }
}

fn to_rgba(color: Rgb) -> Rgba<u8> {
    let [r, g, b] = color.to_rgb8();
    Rgba([r, g, b, 255])
}

/// Fill the part of `rect` that lies inside the image
fn fill_rect(out: &mut RgbaImage, rect: Rect, color: Rgba<u8>) {
    let x0 = rect.x.clamp(0, out.width() as i64) as u32;
    let y0 = rect.y.clamp(0, out.height() as i64) as u32;
    let x1 = rect.right().clamp(0, out.width() as i64) as u32;
    let y1 = rect.bottom().clamp(0, out.height() as i64) as u32;
    for y in y0..y1 {
        for x in x0..x1 {
            out.put_pixel(x, y, color);
        }
    }
}

/// Draw a stroke of `stroke.weight` pixels along the inside edge of `rect`
fn draw_stroke(out: &mut RgbaImage, rect: Rect, stroke: Stroke) {
    let color = to_rgba(stroke.color);
    let w = stroke.weight.min(rect.width).min(rect.height);
    if w == 0 {
        return;
    }
    let w64 = w as i64;
    let top = Rect { height: w, ..rect };
    let bottom = Rect { y: rect.bottom() - w64, height: w, ..rect };
    let left = Rect { width: w, ..rect };
    let right = Rect { x: rect.right() - w64, width: w, ..rect };
    for edge in [top, bottom, left, right] {
        fill_rect(out, edge, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use photosheet_core::{build_sheet, SheetSettings};

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

    fn red_image(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_pixel(width, height, RED)
    }

    /// 254 DPI makes one millimeter exactly ten pixels
    fn small_settings() -> SheetSettings {
        SheetSettings {
            dpi: 254,
            paper_mm: (20.0, 20.0),
            photo_mm: (6.0, 8.0),
            margin_mm: 1.0,
            spacing_mm: 0.5,
            border: true,
        }
    }

    fn canvas_with_photo() -> (Canvas, NodeId) {
        let mut canvas = Canvas::new();
        let photo = canvas.add_image_layer("face.png", "face.png".into(), red_image(30, 40));
        canvas.select(vec![photo]);
        (canvas, photo)
    }

    #[test]
    fn test_layers_are_laid_out_side_by_side() {
        let mut canvas = Canvas::new();
        let a = canvas.add_image_layer("a", "a".into(), red_image(30, 40));
        let b = canvas.add_image_layer("b", "b".into(), red_image(10, 10));
        assert_eq!(canvas.bounds(a), Rect { x: 0, y: 0, width: 30, height: 40 });
        assert_eq!(canvas.bounds(b), Rect { x: 130, y: 0, width: 10, height: 10 });
        assert_eq!(canvas.page(), &[a, b]);
    }

    #[test]
    fn test_non_image_file_has_no_image_fill() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "not an image").unwrap();

        let mut canvas = Canvas::new();
        let node = canvas.load_layer(&path);
        assert_eq!(canvas.node(node).unwrap().name, "notes.txt");
        assert!(!canvas.fills(node).iter().any(Paint::is_image));
    }

    #[test]
    fn test_load_png_layer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("face.png");
        red_image(12, 16).save(&path).unwrap();

        let mut canvas = Canvas::new();
        let node = canvas.load_layer(&path);
        assert_eq!(canvas.bounds(node).width, 12);
        assert_eq!(canvas.bounds(node).height, 16);
        assert!(canvas.fills(node).iter().any(Paint::is_image));
    }

    #[test]
    fn test_build_sheet_on_canvas() {
        let (mut canvas, photo) = canvas_with_photo();
        let report = build_sheet(&mut canvas, &small_settings()).unwrap();

        assert_eq!(report.page_size, Dimensions::new(200, 200));
        assert_eq!(report.photo_size, Dimensions::new(60, 80));
        assert_eq!(report.placed, 4);

        let frame = canvas.node(report.frame).unwrap();
        assert_eq!(frame.bounds.x, 30 + 100);
        assert_eq!(frame.children.len(), 4);
        assert_eq!(canvas.page(), &[photo, report.frame]);
        assert_eq!(canvas.focused(), Some(report.frame));

        let origins: Vec<(i64, i64)> = frame
            .children
            .iter()
            .map(|c| {
                let b = canvas.bounds(*c);
                (b.x, b.y)
            })
            .collect();
        assert_eq!(origins, vec![(10, 10), (75, 10), (10, 95), (75, 95)]);
    }

    #[test]
    fn test_render_sheet() {
        let (mut canvas, _) = canvas_with_photo();
        let report = build_sheet(&mut canvas, &small_settings()).unwrap();
        let raster = canvas.render(report.frame).unwrap();

        assert_eq!(raster.dimensions(), (200, 200));
        // Margin stays white
        assert_eq!(*raster.get_pixel(0, 0), Rgba([255, 255, 255, 255]));
        // Cutting border on the photo edge
        assert_eq!(*raster.get_pixel(10, 10), Rgba([204, 204, 204, 255]));
        // Photo interior
        let inside = raster.get_pixel(40, 50);
        assert!(inside[0] > 250 && inside[1] < 5 && inside[2] < 5, "{:?}", inside);
        // Gap between the two columns
        assert_eq!(*raster.get_pixel(72, 50), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_remove_drops_children_and_selection() {
        let (mut canvas, photo) = canvas_with_photo();
        let report = build_sheet(&mut canvas, &small_settings()).unwrap();
        let child = canvas.node(report.frame).unwrap().children[0];

        canvas.remove(report.frame).unwrap();
        assert!(canvas.node(report.frame).is_none());
        assert!(canvas.node(child).is_none());
        assert_eq!(canvas.focused(), None);

        canvas.remove(photo).unwrap();
        assert!(canvas.selection().is_empty());
        assert!(canvas.page().is_empty());
    }

    #[test]
    fn test_notifications_are_drained() {
        let (mut canvas, _) = canvas_with_photo();
        build_sheet(&mut canvas, &small_settings()).unwrap();

        let notes = canvas.take_notifications();
        assert_eq!(notes.len(), 2);
        assert!(canvas.take_notifications().is_empty());
    }

    #[test]
    fn test_unknown_node_errors() {
        let mut canvas = Canvas::new();
        assert!(canvas.resize(42, Dimensions::new(1, 1)).is_err());
        assert!(canvas.clone_element(42).is_err());
        assert!(canvas.render(42).is_err());
    }

    #[test]
    fn test_stroke_is_clipped_to_image() {
        let mut out = RgbaImage::from_pixel(10, 10, Rgba([255, 255, 255, 255]));
        let rect = Rect { x: -5, y: -5, width: 10, height: 10 };
        draw_stroke(&mut out, rect, Stroke { color: Rgb::gray(0.0), weight: 1 });
        assert_eq!(*out.get_pixel(4, 0), Rgba([0, 0, 0, 255]));
        assert_eq!(*out.get_pixel(0, 0), Rgba([255, 255, 255, 255]));
    }
}
