use crate::error::{VitrineError, VitrineResult};

/// Current product selection as read from the embedder's controls.
///
/// The core never mutates a selection; it derives asset paths from it on each
/// refresh. `cushion` is `None` when the embedder has no cushion control or no
/// value is selected, in which case no overlay is requested.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Selection {
    pub color: String,
    pub material: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cushion: Option<String>,
}

impl Selection {
    pub fn new(color: impl Into<String>, material: impl Into<String>) -> Self {
        Self {
            color: color.into(),
            material: material.into(),
            cushion: None,
        }
    }

    pub fn with_cushion(mut self, cushion: impl Into<String>) -> Self {
        self.cushion = Some(cushion.into());
        self
    }

    /// Relative path of the base-item texture for this selection.
    pub fn base_path(&self) -> String {
        format!("assets/screwdriver/{}-{}.png", self.color, self.material)
    }

    /// Relative path of the overlay texture, if a cushion is selected.
    pub fn overlay_path(&self) -> Option<String> {
        self.cushion
            .as_ref()
            .map(|cushion| format!("assets/cushion/{cushion}.png"))
    }

    /// Each value must form a single well-formed path segment.
    pub fn validate(&self) -> VitrineResult<()> {
        validate_segment("color", &self.color)?;
        validate_segment("material", &self.material)?;
        if let Some(cushion) = &self.cushion {
            validate_segment("cushion", cushion)?;
        }
        Ok(())
    }
}

fn validate_segment(field: &str, value: &str) -> VitrineResult<()> {
    if value.is_empty() {
        return Err(VitrineError::validation(format!(
            "selection {field} must be non-empty"
        )));
    }
    if value.contains('/') || value.contains('\\') {
        return Err(VitrineError::validation(format!(
            "selection {field} '{value}' must not contain path separators"
        )));
    }
    if value == "." || value == ".." {
        return Err(VitrineError::validation(format!(
            "selection {field} must not be a dot segment"
        )));
    }
    Ok(())
}
