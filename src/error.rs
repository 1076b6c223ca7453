pub type VitrineResult<T> = Result<T, VitrineError>;

#[derive(thiserror::Error, Debug)]
pub enum VitrineError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("texture error: {0}")]
    Texture(String),

    #[error("render error: {0}")]
    Render(String),

    #[error("serialization error: {0}")]
    Serde(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl VitrineError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn texture(msg: impl Into<String>) -> Self {
        Self::Texture(msg.into())
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}
