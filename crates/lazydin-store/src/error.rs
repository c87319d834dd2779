use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{entity} not found: {url}")]
    NotFound { entity: &'static str, url: String },

    #[error("Cannot store {0} without a url")]
    EmptyUrl(&'static str),

    #[error("Invalid timestamp in store: {0}")]
    InvalidTimestamp(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
