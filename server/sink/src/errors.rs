use thiserror::Error;

pub type SinkResult<T> = Result<T, SinkError>;

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("http: {0}")]
    Http(#[from] reqwest::Error),

    #[error("write rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("sink unavailable: {0}")]
    Unavailable(String),
}
