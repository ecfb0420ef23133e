use std::path::PathBuf;

use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum StoreError {
    #[snafu(display("conversation at index {index} was not found ({len} stored)"))]
    ConversationNotFound {
        stage: &'static str,
        index: i64,
        len: usize,
    },
    #[snafu(display("refusing to append an empty message"))]
    EmptyMessage { stage: &'static str },
    #[snafu(display("store id '{raw}' is invalid for {id_type}"))]
    InvalidId {
        stage: &'static str,
        id_type: &'static str,
        raw: String,
        source: uuid::Error,
    },
    #[snafu(display("failed to create snapshot directory at {path:?}"))]
    CreateSnapshotDir {
        stage: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("failed to read snapshot from {path:?}"))]
    ReadSnapshot {
        stage: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("failed to parse snapshot at {path:?}: {source}"))]
    ParseSnapshot {
        stage: &'static str,
        path: PathBuf,
        source: serde_json::Error,
    },
    #[snafu(display("failed to serialize snapshot on `{stage}`: {source}"))]
    SerializeSnapshot {
        stage: &'static str,
        source: serde_json::Error,
    },
    #[snafu(display("failed to write snapshot file at {path:?}"))]
    WriteSnapshot {
        stage: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("failed to replace snapshot file from {from:?} to {to:?}"))]
    RenameSnapshot {
        stage: &'static str,
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },
}

pub type StoreResult<T> = Result<T, StoreError>;
