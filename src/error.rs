// ⚠️ Generator Errors - typed failures surfaced to the CLI
//
// Everything else is plumbing and travels as anyhow::Error with context.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenError {
    /// A required upstream table has not been generated yet
    #[error("missing input table: {}", path.display())]
    MissingInput { path: PathBuf },

    /// Document type not allowed for the holder's nationality
    #[error("{document} is only allowed for South Africans (got {country})")]
    InvalidIdentity { document: String, country: String },

    #[error("year {year} is not supported by the {generator} generator (minimum {minimum})")]
    UnsupportedYear {
        generator: String,
        year: i32,
        minimum: i32,
    },

    #[error("unknown generator: {domain} {entity}")]
    UnknownGenerator { domain: String, entity: String },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("no recorded run for {generator} {year}")]
    NoRecordedRun { generator: String, year: i32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = GenError::InvalidIdentity {
            document: "National ID".to_string(),
            country: "Kenya".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "National ID is only allowed for South Africans (got Kenya)"
        );

        let err = GenError::MissingInput {
            path: PathBuf::from("banking_data/customers_2020.csv"),
        };
        assert!(err.to_string().contains("customers_2020.csv"));
    }
}
