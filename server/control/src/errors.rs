use thiserror::Error;

pub type ControlResult<T> = Result<T, ControlError>;

#[derive(Error, Debug)]
pub enum ControlError {
    #[error("not found: {0}")]
    NotFound(&'static str),

    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    #[error("event source unavailable: {0}")]
    Unavailable(String),
}
