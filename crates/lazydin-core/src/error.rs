use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Fragment {index} has an author but no post identifier (data-urn)")]
    MissingPostIdentifier { index: usize },

    #[error("Invalid selector: {0}")]
    Selector(String),

    #[error("Invalid CSV separator: {0}")]
    InvalidSeparator(String),

    #[error("Invalid output file: {0}")]
    InvalidOutput(String),

    #[error("Failed to write output: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize CSV: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
