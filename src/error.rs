/// Result alias used by the pipeline modules.
pub type SmartcropResult<T> = Result<T, SmartcropError>;

/// Errors raised by the selection and overlay pipeline.
#[derive(thiserror::Error, Debug)]
pub enum SmartcropError {
    /// The remote segmentation service rejected a request or could not be reached.
    #[error("service error: {0}")]
    Service(String),

    /// A mask could not be built for the requested geometry.
    #[error("mask error: {0}")]
    Mask(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SmartcropError {
    pub fn service(msg: impl Into<String>) -> Self {
        Self::Service(msg.into())
    }

    pub fn mask(msg: impl Into<String>) -> Self {
        Self::Mask(msg.into())
    }
}

impl From<reqwest::Error> for SmartcropError {
    fn from(err: reqwest::Error) -> Self {
        Self::Service(err.to_string())
    }
}
