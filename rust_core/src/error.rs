//! Error taxonomy shared by the normalizer, loader, schema and query engine.

use thiserror::Error;

/// Result alias used throughout the core crate.
pub type EtlResult<T> = Result<T, EtlError>;

/// Pipeline-wide errors
#[derive(Debug, Error)]
pub enum EtlError {
    /// A single field could not be coerced and its policy is `Fail`.
    #[error("Parse error in {dataset} row {row}, column '{column}': {message}")]
    Parse {
        dataset: &'static str,
        row: usize,
        column: String,
        message: String,
    },

    #[error("No valid records left in the {dataset} dataset")]
    EmptyDataset { dataset: &'static str },

    #[error("Unresolved team reference '{team}' in {context}")]
    UnresolvedTeamReference { team: String, context: String },

    #[error("Unknown result code '{0}' (expected W, L or D)")]
    UnknownResultCode(String),

    #[error("Value '{value}' is outside the {domain} domain")]
    DomainViolation { domain: &'static str, value: String },

    #[error("Unknown query template '{name}'{}", suggestion_suffix(.suggestion))]
    UnknownTemplateName {
        name: String,
        suggestion: Option<&'static str>,
    },

    #[error("Store already holds a loaded season; load into a fresh store")]
    StoreNotEmpty,

    #[error("Storage error: {0}")]
    Storage(#[source] sqlx::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn suggestion_suffix(suggestion: &Option<&'static str>) -> String {
    match suggestion {
        Some(name) => format!(" (did you mean '{}'?)", name),
        None => String::new(),
    }
}

impl From<sqlx::Error> for EtlError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            let message = db_err.message();
            if message.contains("CHECK constraint failed") {
                let domain = if message.contains("outcome") {
                    "outcome"
                } else {
                    "non-negative count"
                };
                return EtlError::DomainViolation {
                    domain,
                    value: message.to_string(),
                };
            }
        }
        EtlError::Storage(err)
    }
}
