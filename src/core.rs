pub use kurbo::{Affine, Point, Rect, Vec2};

use crate::error::{VitrineError, VitrineResult};

/// Stage dimensions in logical pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            width: 600,
            height: 600,
        }
    }
}

impl Canvas {
    /// Center point of the canvas; layers are positioned here.
    pub fn center(self) -> Point {
        Point::new(f64::from(self.width) / 2.0, f64::from(self.height) / 2.0)
    }

    /// Reject dimensions the CPU raster path cannot represent.
    pub fn validate(self) -> VitrineResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(VitrineError::validation("canvas width/height must be > 0"));
        }
        // vello_cpu pixmaps are u16-sized.
        if self.width > u32::from(u16::MAX) || self.height > u32::from(u16::MAX) {
            return Err(VitrineError::validation(format!(
                "canvas {}x{} exceeds the {} pixel per-axis limit",
                self.width,
                self.height,
                u16::MAX
            )));
        }
        Ok(())
    }
}
