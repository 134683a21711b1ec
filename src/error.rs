use std::io;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed knowledge base text. `line` is 1-based.
    #[error("parse error on line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("configuration error: {0}")]
    Configuration(String),
    /// Measurement has zero membership in every category of its variable.
    #[error("measurement {value} for `{variable}` lies outside every category")]
    Domain { variable: String, value: f64 },
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        Error::Parse {
            line,
            message: message.into(),
        }
    }

    pub(crate) fn config(message: impl Into<String>) -> Self {
        Error::Configuration(message.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
