use std::path::PathBuf;

use thiserror::Error;

use crate::contract::RecordId;

pub type Result<T> = std::result::Result<T, LedgerError>;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Could not access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not parse {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Contract not found: {0}")]
    ContractNotFound(RecordId),

    #[error("Payment not found: {0}")]
    PaymentNotFound(RecordId),

    #[error("Payment rejected: {0}")]
    Rejected(String),
}
