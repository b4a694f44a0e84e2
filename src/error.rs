use std::path::PathBuf;
use thiserror::Error;

/// Failure while pulling fields out of a single listing row. The row is
/// dropped and the run continues.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LineError {
    #[error("expected a token at position {index}, row has {len} tokens")]
    MissingToken { index: usize, len: usize },

    #[error("name span {start}..{end} is out of range for {len} tokens")]
    BadNameSpan { start: usize, end: usize, len: usize },
}

/// Failure that stops the run: the input document could not be read.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to load PDF {path}: {message}")]
    PdfLoad { path: PathBuf, message: String },

    #[error("document {0} has no pages")]
    NoPages(PathBuf),
}
