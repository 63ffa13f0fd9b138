use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("unknown semantic category: {0}")]
    UnknownCategory(String),
    #[error("unknown match method: {0}")]
    UnknownMethod(String),
    #[error("invalid field code {code:?}: {reason}")]
    InvalidFieldCode { code: String, reason: &'static str },
}

pub type Result<T> = std::result::Result<T, ModelError>;
