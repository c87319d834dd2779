pub mod error;
pub mod export;
pub mod extract;
pub mod model;

pub use error::{Error, Result};
pub use extract::{ContentExtractor, Selectors, extract_content};
pub use model::{Author, Content, Post, Relation, Relationship};
