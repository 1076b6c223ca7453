use serde::{Deserialize, Serialize};

use crate::{
    compositor::TransitionStyle,
    core::Canvas,
    error::{VitrineError, VitrineResult},
    tween::FadeSpec,
};

/// Top-level visualizer settings. Every field has a default, so `{}` is a
/// valid document describing the stock 600x600 white-background fade setup.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VisualizerConfig {
    #[serde(default)]
    pub canvas: Canvas,
    /// Straight (non-premultiplied) background color.
    #[serde(default = "default_background_rgba")]
    pub background_rgba: [u8; 4],
    #[serde(default)]
    pub style: TransitionStyle,
    #[serde(default)]
    pub fade: FadeSpec,
}

fn default_background_rgba() -> [u8; 4] {
    [255, 255, 255, 255]
}

impl Default for VisualizerConfig {
    fn default() -> Self {
        Self {
            canvas: Canvas::default(),
            background_rgba: default_background_rgba(),
            style: TransitionStyle::default(),
            fade: FadeSpec::default(),
        }
    }
}

impl VisualizerConfig {
    pub fn validate(&self) -> VitrineResult<()> {
        self.canvas.validate()?;
        self.fade.validate()?;
        Ok(())
    }

    /// Parse and validate a JSON settings document.
    pub fn from_json(json: &str) -> VitrineResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|err| VitrineError::serde(format!("parse visualizer config: {err}")))?;
        config.validate()?;
        Ok(config)
    }
}
