use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A profile that authored at least one extracted post.
///
/// `url` is the natural key. Timestamps are `None` until the record has been
/// written to and read back from the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub url: String,
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Author {
    pub fn new(
        url: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            name: name.into(),
            description: description.into(),
            ..Default::default()
        }
    }
}

/// A single feed post, keyed by its unique per-post token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub url: String,
    pub content: String,
    pub author_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Post {
    pub fn new(
        url: impl Into<String>,
        content: impl Into<String>,
        author_url: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            content: content.into(),
            author_url: author_url.into(),
            ..Default::default()
        }
    }
}

/// Extraction-time pairing of a post with its author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Content {
    pub post: Post,
    pub author: Author,
}

impl Content {
    /// Pair a post with its author, cross-linking `post.author_url`.
    pub fn new(mut post: Post, author: Author) -> Self {
        post.author_url = author.url.clone();
        Self { post, author }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Relation {
    Follow,
    Mutual,
}

impl Relation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Relation::Follow => "follow",
            Relation::Mutual => "mutual",
        }
    }
}

/// Tracks how the logged-in account relates to an author. Not persisted yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    pub author_url: String,
    pub relation: Relation,
    pub mutuals: bool,
}
