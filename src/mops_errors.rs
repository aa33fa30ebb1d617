use camino::Utf8PathBuf;
use thiserror::Error;

use crate::constants::{DiaId, ObsHistId};

#[derive(Error, Debug)]
pub enum MopsError {
    #[error("Unable to perform file operation: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Must give either a database connection or a file containing the diaSources")]
    MissingDiaSourceInput,

    #[error("Must give either a database connection or a file containing the opsim records")]
    MissingImageInput,

    #[error("USAGE: {0}")]
    Usage(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unable to parse configuration file {path}: {reason}")]
    ConfigParse { path: Utf8PathBuf, reason: String },

    #[error("Database backend requested but the crate was built without the `database` feature")]
    DatabaseDisabled,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Error while parsing {path} at line {line}: {reason}")]
    DumpParse {
        path: Utf8PathBuf,
        line: usize,
        reason: String,
    },

    #[error("Row {row} has {found} fields, header has {expected}")]
    MalformedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("No identifier column found among {0:?}")]
    NoIdentifierColumn(Vec<String>),

    #[error("Empty table: no header row")]
    EmptyTable,

    #[error("DiaSource not found: {0}")]
    UnknownDiaSource(DiaId),

    #[error("ObsHist not found: {0}")]
    UnknownImage(ObsHistId),

    #[error("Batch without start image")]
    EmptyBatch,

    #[error("Invalid tracklet in {path} at line {line}: {token}")]
    InvalidTrackletLine {
        path: Utf8PathBuf,
        line: usize,
        token: String,
    },

    #[error("Logger initialization failed: {0}")]
    LoggerInit(String),
}

impl From<flexi_logger::FlexiLoggerError> for MopsError {
    fn from(err: flexi_logger::FlexiLoggerError) -> Self {
        MopsError::LoggerInit(err.to_string())
    }
}

#[cfg(feature = "database")]
impl From<diesel::result::Error> for MopsError {
    fn from(err: diesel::result::Error) -> Self {
        MopsError::Database(err.to_string())
    }
}

#[cfg(feature = "database")]
impl From<diesel::ConnectionError> for MopsError {
    fn from(err: diesel::ConnectionError) -> Self {
        MopsError::Database(err.to_string())
    }
}

impl PartialEq for MopsError {
    fn eq(&self, other: &Self) -> bool {
        use MopsError::*;
        match (self, other) {
            // io errors carry no comparable payload
            (IoError(_), IoError(_)) => true,

            (Usage(a), Usage(b)) => a == b,
            (InvalidConfig(a), InvalidConfig(b)) => a == b,
            (
                ConfigParse { path: p1, reason: r1 },
                ConfigParse { path: p2, reason: r2 },
            ) => p1 == p2 && r1 == r2,
            (Database(a), Database(b)) => a == b,
            (
                DumpParse {
                    path: p1,
                    line: l1,
                    reason: r1,
                },
                DumpParse {
                    path: p2,
                    line: l2,
                    reason: r2,
                },
            ) => p1 == p2 && l1 == l2 && r1 == r2,
            (
                MalformedRow {
                    row: r1,
                    expected: e1,
                    found: f1,
                },
                MalformedRow {
                    row: r2,
                    expected: e2,
                    found: f2,
                },
            ) => r1 == r2 && e1 == e2 && f1 == f2,
            (NoIdentifierColumn(a), NoIdentifierColumn(b)) => a == b,
            (UnknownDiaSource(a), UnknownDiaSource(b)) => a == b,
            (UnknownImage(a), UnknownImage(b)) => a == b,
            (
                InvalidTrackletLine {
                    path: p1,
                    line: l1,
                    token: t1,
                },
                InvalidTrackletLine {
                    path: p2,
                    line: l2,
                    token: t2,
                },
            ) => p1 == p2 && l1 == l2 && t1 == t2,
            (LoggerInit(a), LoggerInit(b)) => a == b,

            (MissingDiaSourceInput, MissingDiaSourceInput) => true,
            (MissingImageInput, MissingImageInput) => true,
            (DatabaseDisabled, DatabaseDisabled) => true,
            (EmptyTable, EmptyTable) => true,
            (EmptyBatch, EmptyBatch) => true,

            _ => false,
        }
    }
}
