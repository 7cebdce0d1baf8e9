pub type FramefxResult<T> = Result<T, FramefxError>;

#[derive(thiserror::Error, Debug)]
pub enum FramefxError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("surface error: {0}")]
    SurfaceAcquisition(String),

    #[error("render error: {0}")]
    Render(String),

    #[error("export failed at frame {index}: {source}")]
    ExportFrame {
        index: u64,
        #[source]
        source: Box<FramefxError>,
    },

    #[error("preset error: {0}")]
    Preset(String),

    #[error("serialization error: {0}")]
    Serde(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FramefxError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn surface(msg: impl Into<String>) -> Self {
        Self::SurfaceAcquisition(msg.into())
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    pub fn export_frame(index: u64, source: FramefxError) -> Self {
        Self::ExportFrame {
            index,
            source: Box::new(source),
        }
    }

    pub fn preset(msg: impl Into<String>) -> Self {
        Self::Preset(msg.into())
    }

    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Frame index of a failed export, if this error came out of one.
    pub fn failed_frame(&self) -> Option<u64> {
        match self {
            Self::ExportFrame { index, .. } => Some(*index),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for FramefxError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde(err.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
