use crate::{Error, Result, parse_timestamp};
use lazydin_core::Post;
use sqlx::FromRow;
use sqlx::sqlite::SqlitePool;

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS posts (
        url TEXT PRIMARY KEY NOT NULL,
        content TEXT NOT NULL DEFAULT '',
        author_url TEXT NOT NULL,
        created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
        updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
        FOREIGN KEY(author_url) REFERENCES authors(url)
    )
"#;

const CREATE_AUTHOR_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_posts_author_url ON posts(author_url)";

const UPSERT: &str = r#"
    INSERT INTO posts (url, content, author_url)
    VALUES (?1, ?2, ?3)
    ON CONFLICT(url) DO UPDATE SET
        content = excluded.content,
        author_url = excluded.author_url,
        updated_at = strftime(
            '%Y-%m-%dT%H:%M:%fZ',
            max(julianday('now'), julianday(posts.updated_at) + 0.0015 / 86400.0)
        )
"#;

const SELECT_BY_URL: &str =
    "SELECT url, content, author_url, created_at, updated_at FROM posts WHERE url = ?1";

const SELECT_ALL: &str =
    "SELECT url, content, author_url, created_at, updated_at FROM posts ORDER BY created_at, url";

const SELECT_BY_AUTHOR_URL: &str = r#"
    SELECT url, content, author_url, created_at, updated_at
    FROM posts
    WHERE author_url = ?1
    ORDER BY created_at, url
"#;

// LIKE is case-insensitive for ASCII in SQLite
const SELECT_BY_AUTHOR_NAME: &str = r#"
    SELECT p.url, p.content, p.author_url, p.created_at, p.updated_at
    FROM posts p
    INNER JOIN authors a ON a.url = p.author_url
    WHERE a.name LIKE ?1 ESCAPE '\'
    ORDER BY p.created_at, p.url
"#;

#[derive(Debug, FromRow)]
struct PostRow {
    url: String,
    content: String,
    author_url: String,
    created_at: String,
    updated_at: String,
}

impl PostRow {
    fn into_post(self) -> Result<Post> {
        Ok(Post {
            created_at: Some(parse_timestamp(&self.created_at)?),
            updated_at: Some(parse_timestamp(&self.updated_at)?),
            url: self.url,
            content: self.content,
            author_url: self.author_url,
        })
    }
}

/// Post table access. Obtain one from [`crate::Database::posts`].
#[derive(Debug, Clone)]
pub struct PostStore {
    pool: SqlitePool,
}

impl PostStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Requires the authors table to exist
    pub async fn create_table(&self) -> Result<()> {
        sqlx::query(CREATE_TABLE).execute(&self.pool).await?;
        sqlx::query(CREATE_AUTHOR_INDEX).execute(&self.pool).await?;
        Ok(())
    }

    /// Insert the post, or update content and author if the url exists.
    /// The author row must already be stored. Returns the stored row.
    pub async fn upsert(&self, post: &Post) -> Result<Post> {
        if post.url.is_empty() {
            return Err(Error::EmptyUrl("post"));
        }

        tracing::debug!("Upserting post {} by {}", post.url, post.author_url);

        sqlx::query(UPSERT)
            .bind(&post.url)
            .bind(&post.content)
            .bind(&post.author_url)
            .execute(&self.pool)
            .await?;

        self.get_by_url(&post.url).await
    }

    pub async fn get_by_url(&self, url: &str) -> Result<Post> {
        sqlx::query_as::<_, PostRow>(SELECT_BY_URL)
            .bind(url)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound {
                entity: "post",
                url: url.to_string(),
            })?
            .into_post()
    }

    pub async fn get_all_posts(&self) -> Result<Vec<Post>> {
        let rows = sqlx::query_as::<_, PostRow>(SELECT_ALL)
            .fetch_all(&self.pool)
            .await?;
        collect(rows)
    }

    pub async fn get_all_posts_by_author_url(&self, author_url: &str) -> Result<Vec<Post>> {
        let rows = sqlx::query_as::<_, PostRow>(SELECT_BY_AUTHOR_URL)
            .bind(author_url)
            .fetch_all(&self.pool)
            .await?;
        collect(rows)
    }

    /// Posts whose author's name contains `name`, ignoring case
    pub async fn get_all_posts_by_author_name(&self, name: &str) -> Result<Vec<Post>> {
        let pattern = format!("%{}%", escape_like(name));
        let rows = sqlx::query_as::<_, PostRow>(SELECT_BY_AUTHOR_NAME)
            .bind(pattern)
            .fetch_all(&self.pool)
            .await?;
        collect(rows)
    }
}

fn collect(rows: Vec<PostRow>) -> Result<Vec<Post>> {
    let posts = rows
        .into_iter()
        .map(PostRow::into_post)
        .collect::<Result<Vec<_>>>()?;
    tracing::debug!("Loaded {} posts", posts.len());
    Ok(posts)
}

/// Escape LIKE wildcards so user input matches literally
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;
    use lazydin_core::Author;

    async fn seeded() -> Database {
        let db = Database::in_memory().await.unwrap();
        db.create_tables().await.unwrap();
        db.authors()
            .upsert(&Author::new("some-url", "Victor Raton", ""))
            .await
            .unwrap();
        db.authors()
            .upsert(&Author::new("some-other-url", "Captain Jack Sparrow", ""))
            .await
            .unwrap();
        db
    }

    #[tokio::test]
    async fn test_create_post() {
        let db = seeded().await;

        let post = db
            .posts()
            .upsert(&Post::new("some-url", "some-content", "some-url"))
            .await
            .unwrap();

        assert_eq!(post.url, "some-url");
        assert_eq!(post.content, "some-content");
        assert_eq!(post.author_url, "some-url");
        assert!(post.created_at.is_some());
    }

    #[tokio::test]
    async fn test_upsert_same_url_keeps_one_row() {
        let db = seeded().await;
        let posts = db.posts();

        let first = posts
            .upsert(&Post::new("urn:1", "draft", "some-url"))
            .await
            .unwrap();
        let second = posts
            .upsert(&Post::new("urn:1", "final", "some-url"))
            .await
            .unwrap();

        assert_eq!(second.content, "final");
        assert_eq!(second.created_at, first.created_at);
        assert!(second.updated_at > first.updated_at);
        assert_eq!(posts.get_all_posts().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_back_to_back_post_upserts_advance_updated_at() {
        let db = seeded().await;
        let posts = db.posts();
        let mut previous = posts
            .upsert(&Post::new("urn:1", "v0", "some-url"))
            .await
            .unwrap();

        for i in 1..50 {
            let current = posts
                .upsert(&Post::new("urn:1", format!("v{i}"), "some-url"))
                .await
                .unwrap();
            assert!(current.updated_at > previous.updated_at);
            previous = current;
        }
    }

    #[tokio::test]
    async fn test_get_by_url_round_trip() {
        let db = seeded().await;
        let stored = db
            .posts()
            .upsert(&Post::new("urn:2", "hello", "some-other-url"))
            .await
            .unwrap();

        let fetched = db.posts().get_by_url("urn:2").await.unwrap();

        assert_eq!(fetched, stored);
    }

    #[tokio::test]
    async fn test_get_by_url_missing_is_not_found() {
        let db = seeded().await;

        let result = db.posts().get_by_url("urn:missing").await;

        assert!(matches!(result, Err(Error::NotFound { entity: "post", .. })));
    }

    #[tokio::test]
    async fn test_queries_by_author() {
        let db = seeded().await;
        let posts = db.posts();
        posts
            .upsert(&Post::new("some-url", "some-content", "some-url"))
            .await
            .unwrap();
        posts
            .upsert(&Post::new("some-other-url", "some-other-content", "some-other-url"))
            .await
            .unwrap();

        assert_eq!(posts.get_all_posts().await.unwrap().len(), 2);

        let by_url = posts.get_all_posts_by_author_url("some-url").await.unwrap();
        assert_eq!(by_url.len(), 1);
        assert_eq!(by_url[0].content, "some-content");

        let by_name = posts.get_all_posts_by_author_name("ack").await.unwrap();
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].author_url, "some-other-url");

        let upper = posts.get_all_posts_by_author_name("JACK").await.unwrap();
        assert_eq!(upper.len(), 1);
    }

    #[tokio::test]
    async fn test_query_without_matches_is_empty() {
        let db = seeded().await;

        assert!(db.posts().get_all_posts().await.unwrap().is_empty());
        assert!(
            db.posts()
                .get_all_posts_by_author_url("nobody")
                .await
                .unwrap()
                .is_empty()
        );
        assert!(
            db.posts()
                .get_all_posts_by_author_name("%")
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_post_for_unknown_author_is_rejected() {
        let db = seeded().await;

        let result = db
            .posts()
            .upsert(&Post::new("urn:3", "orphan", "unknown-author"))
            .await;

        assert!(matches!(result, Err(Error::Database(_))));
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("ack"), "ack");
    }
}
