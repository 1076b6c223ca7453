use std::sync::Arc;

use crate::{
    assets::Texture,
    core::{Canvas, Point, Vec2},
};

/// Margin of the fit-to-canvas rule: layers fit within 90% of the canvas.
pub const FIT_MARGIN: f64 = 0.9;

/// Identifier of a layer attached to a [`Stage`]. Unique per stage, never
/// reused after removal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(pub u64);

/// One positioned texture on the stage.
#[derive(Clone, Debug)]
pub struct Layer {
    /// Pixels, shared with the texture store.
    pub texture: Arc<Texture>,
    /// Anchor in texture-relative units; (0.5, 0.5) is the texture center.
    pub anchor: Vec2,
    /// Anchor position in canvas coordinates.
    pub position: Point,
    /// Uniform scale factor.
    pub scale: f64,
    /// Opacity in [0, 1].
    pub alpha: f32,
}

impl Layer {
    /// Layer with a center anchor placed at the canvas center, the only
    /// placement this visualizer uses.
    pub fn centered(texture: Arc<Texture>, canvas: Canvas, scale: f64, alpha: f32) -> Self {
        Self {
            texture,
            anchor: Vec2::new(0.5, 0.5),
            position: canvas.center(),
            scale,
            alpha,
        }
    }
}

/// Fixed-size surface owning an ordered list of child layers.
///
/// Children render in insertion order, so later layers draw on top.
#[derive(Clone, Debug)]
pub struct Stage {
    canvas: Canvas,
    background_rgba: [u8; 4],
    children: Vec<(LayerId, Layer)>,
    next_layer: u64,
}

impl Stage {
    pub fn new(canvas: Canvas, background_rgba: [u8; 4]) -> Self {
        Self {
            canvas,
            background_rgba,
            children: Vec::new(),
            next_layer: 0,
        }
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    pub fn background_rgba(&self) -> [u8; 4] {
        self.background_rgba
    }

    /// Append `layer` above all current children.
    pub fn add(&mut self, layer: Layer) -> LayerId {
        let id = LayerId(self.next_layer);
        self.next_layer += 1;
        self.children.push((id, layer));
        id
    }

    /// Detach the layer with `id`, returning it if it was attached.
    pub fn remove(&mut self, id: LayerId) -> Option<Layer> {
        let idx = self.children.iter().position(|(child, _)| *child == id)?;
        Some(self.children.remove(idx).1)
    }

    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.children
            .iter()
            .find(|(child, _)| *child == id)
            .map(|(_, layer)| layer)
    }

    pub fn layer_mut(&mut self, id: LayerId) -> Option<&mut Layer> {
        self.children
            .iter_mut()
            .find(|(child, _)| *child == id)
            .map(|(_, layer)| layer)
    }

    pub fn contains(&self, id: LayerId) -> bool {
        self.children.iter().any(|(child, _)| *child == id)
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Children in painter's order (bottom first).
    pub fn iter(&self) -> impl Iterator<Item = (LayerId, &Layer)> {
        self.children.iter().map(|(id, layer)| (*id, layer))
    }
}

/// Shrink-only scale fitting a texture within [`FIT_MARGIN`] of the canvas:
/// `min(0.9*W/tw, 0.9*H/th, 1.0)`. A texture is never enlarged past its
/// natural size.
pub fn fit_scale(canvas: Canvas, tex_width: u32, tex_height: u32) -> f64 {
    if tex_width == 0 || tex_height == 0 {
        return 1.0;
    }
    let max_width = FIT_MARGIN * f64::from(canvas.width);
    let max_height = FIT_MARGIN * f64::from(canvas.height);
    let scale_x = max_width / f64::from(tex_width);
    let scale_y = max_height / f64::from(tex_height);
    scale_x.min(scale_y).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texture(width: u32, height: u32) -> Arc<Texture> {
        Arc::new(Texture {
            width,
            height,
            rgba8_premul: Arc::new(vec![0u8; (width * height * 4) as usize]),
        })
    }

    #[test]
    fn fit_scale_shrinks_along_the_constraining_axis() {
        let canvas = Canvas::default();
        assert_eq!(fit_scale(canvas, 1200, 600), 0.45);
        assert_eq!(fit_scale(canvas, 600, 1200), 0.45);
    }

    #[test]
    fn fit_scale_never_enlarges() {
        assert_eq!(fit_scale(Canvas::default(), 10, 10), 1.0);
        assert_eq!(fit_scale(Canvas::default(), 540, 10), 1.0);
    }

    #[test]
    fn fit_scale_at_ninety_percent_boundary_is_one() {
        assert_eq!(fit_scale(Canvas::default(), 540, 540), 1.0);
    }

    #[test]
    fn fit_scale_respects_both_margins() {
        let canvas = Canvas::default();
        for (tw, th) in [(1u32, 1u32), (601, 601), (1200, 800), (540, 541), (4096, 64)] {
            let scale = fit_scale(canvas, tw, th);
            assert!(scale <= 1.0);
            assert!(scale * f64::from(tw) <= 540.0 + 1e-9);
            assert!(scale * f64::from(th) <= 540.0 + 1e-9);
        }
    }

    #[test]
    fn fit_scale_tolerates_zero_sized_textures() {
        assert_eq!(fit_scale(Canvas::default(), 0, 100), 1.0);
    }

    #[test]
    fn centered_layer_sits_at_canvas_center() {
        let layer = Layer::centered(texture(2, 2), Canvas::default(), 0.5, 0.0);
        assert_eq!(layer.position, Point::new(300.0, 300.0));
        assert_eq!(layer.anchor, Vec2::new(0.5, 0.5));
        assert_eq!(layer.scale, 0.5);
        assert_eq!(layer.alpha, 0.0);
    }

    #[test]
    fn add_remove_preserves_order_and_ids() {
        let mut stage = Stage::new(Canvas::default(), [255, 255, 255, 255]);
        let a = stage.add(Layer::centered(texture(1, 1), stage.canvas(), 1.0, 1.0));
        let b = stage.add(Layer::centered(texture(1, 1), stage.canvas(), 1.0, 1.0));
        let c = stage.add(Layer::centered(texture(1, 1), stage.canvas(), 1.0, 1.0));
        assert_eq!(stage.len(), 3);

        assert!(stage.remove(b).is_some());
        assert!(stage.remove(b).is_none());
        assert!(!stage.contains(b));

        let order: Vec<LayerId> = stage.iter().map(|(id, _)| id).collect();
        assert_eq!(order, vec![a, c]);

        // Ids are never reused.
        let d = stage.add(Layer::centered(texture(1, 1), stage.canvas(), 1.0, 1.0));
        assert!(d > c);
    }

    #[test]
    fn layer_mut_updates_in_place() {
        let mut stage = Stage::new(Canvas::default(), [255, 255, 255, 255]);
        let id = stage.add(Layer::centered(texture(1, 1), stage.canvas(), 1.0, 0.0));
        stage.layer_mut(id).unwrap().alpha = 0.4;
        assert_eq!(stage.layer(id).unwrap().alpha, 0.4);
    }
}
