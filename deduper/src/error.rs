use std::fmt;
use std::path::PathBuf;

use crate::CompressionError;

/// Errors which break the measurement of a run.
///
/// Failing to open or read a source file is not an error of this kind, such
/// files are skipped.
#[derive(Debug)]
pub enum Error {
    /// A chunker returned a boundary at offset 0.
    ZeroLengthSplit,
    /// A chunk could not be hashed or compressed.
    Compression(CompressionError),
    /// Error while processing a specific file with a specific processor.
    Processing {
        path: PathBuf,
        processor: String,
        source: Box<Error>,
    },
    /// A worker thread panicked.
    WorkerPanic,
}

impl Error {
    pub(crate) fn processing(self, path: PathBuf, processor: String) -> Self {
        Self::Processing {
            path,
            processor,
            source: Box::new(self),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Compression(err) => Some(err),
            Error::Processing { source, .. } => Some(source.as_ref()),
            Error::ZeroLengthSplit | Error::WorkerPanic => None,
        }
    }
}

impl From<CompressionError> for Error {
    fn from(e: CompressionError) -> Self {
        Self::Compression(e)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ZeroLengthSplit => write!(f, "chunker requested a zero length chunk"),
            Error::Compression(_) => write!(f, "failed to hash or compress chunk"),
            Error::Processing {
                path, processor, ..
            } => write!(
                f,
                "failed to process {} with processor {}",
                path.display(),
                processor
            ),
            Error::WorkerPanic => write!(f, "worker thread panicked"),
        }
    }
}
