use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LabelError {
    #[error("required input table missing: {}", path.display())]
    MissingData { path: PathBuf },

    #[error("optional table {} is empty or unreadable: {reason}", path.display())]
    EmptyOptionalData { path: PathBuf, reason: String },

    #[error(
        "labels table {} does not exist; rerun `init --create` to create it",
        path.display()
    )]
    StoreNotReady { path: PathBuf },

    #[error("invalid category selection: {0}")]
    InvalidCategorySelection(String),

    #[error("malformed table {}: {reason}", path.display())]
    MalformedTable { path: PathBuf, reason: String },

    #[error("labels table {} lacks required columns: {}", path.display(), missing.join(", "))]
    SchemaMismatch { path: PathBuf, missing: Vec<String> },

    #[error("unknown doc_id: {doc_id}")]
    UnknownDocument { doc_id: String },

    #[error("no selectable question {q_id} for doc_id {doc_id}")]
    UnknownQuestion { doc_id: String, q_id: String },

    #[error("q_id {q_id} of doc_id {doc_id} exists as both confusing and non-confusing; pass --is-confusing")]
    AmbiguousQuestion { doc_id: String, q_id: String },

    #[error("invalid {field}: {value:?}")]
    InvalidIdentity { field: &'static str, value: String },

    #[error("i/o failure on {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("csv failure on {}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

pub type LabelResult<T> = std::result::Result<T, LabelError>;
