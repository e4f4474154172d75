use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataLoadError {
    #[error("failed to read dataset {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed dataset {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("dataset {0} contains no mountains")]
    Empty(PathBuf),
    #[error("duplicate mountain id: {0}")]
    DuplicateId(String),
    #[error("mountain record {index} has an empty {field}")]
    MissingKey { index: usize, field: &'static str },
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("no articles to export")]
    NoArticles,
    #[error("unknown mountain id: {0}")]
    UnknownMountain(String),
    #[error("scheduled date {date} is not in the past; publish status requires past dates")]
    PublishDateNotPast { date: String },
    #[error("invalid schedule: {0}")]
    InvalidSchedule(String),
    #[error("WXR schema violation: {0}")]
    SchemaViolation(String),
}

#[derive(Debug, Error)]
pub enum AffiliateLookupFailure {
    #[error("affiliate request failed: {0}")]
    Request(String),
    #[error("affiliate response could not be decoded: {0}")]
    Decode(String),
    #[error("affiliate search returned no results for '{0}'")]
    Empty(String),
}

#[derive(Debug, Error)]
pub enum PageRenderFailure {
    #[error("{subject}: missing required field {field}")]
    MissingField { subject: String, field: &'static str },
    #[error("{subject}: template error: {source}")]
    Template {
        subject: String,
        #[source]
        source: minijinja::Error,
    },
}
