use thiserror::Error;

#[derive(Debug, Error)]
pub enum QnrError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("unknown field type: {0}")]
    UnknownFieldType(String),
    #[error("unknown comparison operator: {0}")]
    UnknownOperator(String),
    #[error("{0}")]
    Message(String),
}

pub type Result<T> = std::result::Result<T, QnrError>;
