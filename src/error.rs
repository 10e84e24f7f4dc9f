use std::path::PathBuf;

use thiserror::Error;

/// Structural problems that stop one input file from being processed.
#[derive(Error, Debug)]
pub enum DutyError {
    #[error("no name column found: header row is empty")]
    MissingNameColumn,

    #[error("no duty columns left after removing '{name_column}' and identifier columns")]
    MissingDutyColumns { name_column: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Config: {0}")]
    Config(String),
}
