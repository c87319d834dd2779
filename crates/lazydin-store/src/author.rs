use crate::{Error, Result, parse_timestamp};
use lazydin_core::Author;
use sqlx::FromRow;
use sqlx::sqlite::SqlitePool;

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS authors (
        url TEXT PRIMARY KEY NOT NULL,
        name TEXT NOT NULL DEFAULT '',
        description TEXT NOT NULL DEFAULT '',
        created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
        updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
    )
"#;

const UPSERT: &str = r#"
    INSERT INTO authors (url, name, description)
    VALUES (?1, ?2, ?3)
    ON CONFLICT(url) DO UPDATE SET
        name = excluded.name,
        description = excluded.description,
        updated_at = strftime(
            '%Y-%m-%dT%H:%M:%fZ',
            max(julianday('now'), julianday(authors.updated_at) + 0.0015 / 86400.0)
        )
"#;

const SELECT_BY_URL: &str =
    "SELECT url, name, description, created_at, updated_at FROM authors WHERE url = ?1";

const SELECT_ALL: &str =
    "SELECT url, name, description, created_at, updated_at FROM authors ORDER BY created_at, url";

#[derive(Debug, FromRow)]
struct AuthorRow {
    url: String,
    name: String,
    description: String,
    created_at: String,
    updated_at: String,
}

impl AuthorRow {
    fn into_author(self) -> Result<Author> {
        Ok(Author {
            created_at: Some(parse_timestamp(&self.created_at)?),
            updated_at: Some(parse_timestamp(&self.updated_at)?),
            url: self.url,
            name: self.name,
            description: self.description,
        })
    }
}

/// Author table access. Obtain one from [`crate::Database::authors`].
#[derive(Debug, Clone)]
pub struct AuthorStore {
    pool: SqlitePool,
}

impl AuthorStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create_table(&self) -> Result<()> {
        sqlx::query(CREATE_TABLE).execute(&self.pool).await?;
        Ok(())
    }

    /// Insert the author, or update name and description if the url exists.
    /// Returns the stored row.
    pub async fn upsert(&self, author: &Author) -> Result<Author> {
        if author.url.is_empty() {
            return Err(Error::EmptyUrl("author"));
        }

        tracing::debug!("Upserting author {}", author.url);

        sqlx::query(UPSERT)
            .bind(&author.url)
            .bind(&author.name)
            .bind(&author.description)
            .execute(&self.pool)
            .await?;

        self.get_by_url(&author.url).await
    }

    pub async fn get_by_url(&self, url: &str) -> Result<Author> {
        sqlx::query_as::<_, AuthorRow>(SELECT_BY_URL)
            .bind(url)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound {
                entity: "author",
                url: url.to_string(),
            })?
            .into_author()
    }

    pub async fn get_all(&self) -> Result<Vec<Author>> {
        sqlx::query_as::<_, AuthorRow>(SELECT_ALL)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(AuthorRow::into_author)
            .collect()
    }
}
