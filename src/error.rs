use std::{io, path::PathBuf};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("input file not found: {}", path.display())]
    InputNotFound { path: PathBuf },

    #[error("unable to read input file {}", path.display())]
    InputUnreadable {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("column `{column}` is missing from {}", path.display())]
    MissingColumn { path: PathBuf, column: String },

    #[error("{}:{line}: invalid value {value:?} in column `{column}`: {reason}", path.display())]
    Parse {
        path: PathBuf,
        line: u64,
        column: String,
        value: String,
        reason: String,
    },

    #[error(
        "only {matched} of {total} load rows matched a renewable aggregate \
         (minimum match rate {min_rate}); check timestamp granularity and timezone"
    )]
    JoinMismatch {
        matched: usize,
        total: usize,
        min_rate: f64,
    },

    #[error("unable to write {}", path.display())]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("unable to render chart {}: {reason}", path.display())]
    Chart { path: PathBuf, reason: String },
}

impl Error {
    pub(crate) fn output_write(path: impl Into<PathBuf>, source: impl Into<io::Error>) -> Self {
        Self::OutputWrite {
            path: path.into(),
            source: source.into(),
        }
    }
}
