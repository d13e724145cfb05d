//! Error type shared by every preparation step.
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PrepError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PrepError {
    /// A caller-supplied parameter is out of range (e.g. `sampling_freq <= 0`).
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The data handed in violates the input contract (empty, ragged, mismatched lengths).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A sound annotation lacks its `<ecode>` body or has the wrong field count.
    #[error("malformed event annotation: {0}")]
    MalformedEvent(String),

    /// No stream in the recording has the requested type or name.
    #[error("stream not found: {0}")]
    StreamNotFound(String),
}
