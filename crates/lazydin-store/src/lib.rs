//! SQLite-backed stores for authors and posts.
//!
//! Both tables are keyed by url. Writes are upserts that return the row as it
//! is stored after the write, so callers always see store-assigned timestamps.

mod author;
mod database;
mod error;
mod post;

pub use author::AuthorStore;
pub use database::Database;
pub use error::{Error, Result};
pub use post::PostStore;

pub(crate) fn parse_timestamp(value: &str) -> Result<chrono::DateTime<chrono::Utc>> {
    chrono::DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&chrono::Utc))
        .map_err(|e| Error::InvalidTimestamp(format!("'{}': {}", value, e)))
}
