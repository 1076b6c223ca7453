#![forbid(unsafe_code)]

//! Selection-driven product-image compositor.
//!
//! A [`Selection`] names a base texture and an optional cushion overlay; the
//! [`Compositor`] loads both through a [`TextureStore`], fades the new layers
//! in over the old ones, and commits the swap only once both are ready.
//! [`render_stage`] rasterizes the current stage into premultiplied RGBA8.

pub mod assets;
pub mod compositor;
pub mod config;
pub mod core;
pub mod error;
pub mod render;
pub mod selection;
pub mod stage;
pub mod tween;

pub use crate::assets::{FsTextureStore, LoadStatus, Texture, TextureStore};
pub use crate::compositor::{Compositor, DisplayLayer, DisplayState, Generation, TransitionStyle};
pub use crate::config::VisualizerConfig;
pub use crate::core::{Canvas, Point, Vec2};
pub use crate::error::{VitrineError, VitrineResult};
pub use crate::render::{FrameRGBA, render_stage};
pub use crate::selection::Selection;
pub use crate::stage::{FIT_MARGIN, Layer, LayerId, Stage, fit_scale};
pub use crate::tween::{DEFAULT_FADE_SECS, Ease, FadeSpec, Tween};
