use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("duplicate challenge id '{0}'")]
    DuplicateId(String),
    #[error("map config '{0}' has no matching challenge")]
    OrphanMapConfig(String),
    #[error("invalid color {value:?} at {path} for challenge '{id}'")]
    InvalidColor {
        id: String,
        path: String,
        value: String,
    },
    #[error("failed to read {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse challenge file {path:?}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("map backend failed: {0}")]
    Backend(String),
    #[error("could not encode map script")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VerifyError {
    #[error("challenge not found: '{0}'")]
    NotFound(String),
    #[error("empty flag")]
    EmptyInput,
    #[error("verification backend unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("ledger io error on {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("ledger csv error")]
    Csv(#[from] csv::Error),
}
