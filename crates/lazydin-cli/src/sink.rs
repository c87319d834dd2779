use anyhow::{Context, Result};
use lazydin_core::Content;
use lazydin_core::export::{CsvExporter, ensure_csv_extension};
use lazydin_store::Database;
use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;

/// Where extracted contents end up
pub enum Sink {
    Store(Database),
    Csv { path: PathBuf, exporter: CsvExporter },
}

/// Counts of what a [`Sink::write`] call persisted
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SinkReport {
    pub authors: usize,
    pub posts: usize,
    pub destination: String,
}

impl Sink {
    /// CSV sink; the extension and separator are checked before anything is
    /// written, so a bad flag fails before the browser is started
    pub fn csv(path: PathBuf, separator: &str) -> Result<Self> {
        ensure_csv_extension(&path)?;
        let exporter = CsvExporter::from_separator_str(separator)?;
        Ok(Sink::Csv { path, exporter })
    }

    pub async fn write(&self, contents: &[Content]) -> Result<SinkReport> {
        let authors = contents
            .iter()
            .map(|content| content.author.url.as_str())
            .collect::<HashSet<_>>()
            .len();

        match self {
            Sink::Store(db) => {
                for content in contents {
                    db.authors()
                        .upsert(&content.author)
                        .await
                        .with_context(|| format!("Failed to save author {}", content.author.url))?;
                    db.posts()
                        .upsert(&content.post)
                        .await
                        .with_context(|| format!("Failed to save post {}", content.post.url))?;
                }
            }
            Sink::Csv { path, exporter } => {
                exporter.contents_to_file(contents, path)?;
            }
        }

        Ok(SinkReport {
            authors,
            posts: contents.len(),
            destination: self.to_string(),
        })
    }
}

impl fmt::Display for Sink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sink::Store(_) => write!(f, "database"),
            Sink::Csv { path, .. } => write!(f, "{}", path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lazydin_core::{Author, Post};

    fn contents() -> Vec<Content> {
        let author = Author::new("https://www.linkedin.com/in/victor", "Victor Raton", "Dev");
        vec![
            Content::new(Post::new("urn:li:activity:1", "first", ""), author.clone()),
            Content::new(Post::new("urn:li:activity:2", "second", ""), author),
        ]
    }

    #[tokio::test]
    async fn test_store_sink_upserts_authors_then_posts() {
        let db = Database::in_memory().await.unwrap();
        db.create_tables().await.unwrap();
        let sink = Sink::Store(db.clone());

        let report = sink.write(&contents()).await.unwrap();
        // Writing the same batch again must not duplicate anything
        sink.write(&contents()).await.unwrap();

        assert_eq!(report.authors, 1);
        assert_eq!(report.posts, 2);
        assert_eq!(db.authors().get_all().await.unwrap().len(), 1);
        let posts = db
            .posts()
            .get_all_posts_by_author_url("https://www.linkedin.com/in/victor")
            .await
            .unwrap();
        assert_eq!(posts.len(), 2);
    }

    #[tokio::test]
    async fn test_csv_sink_writes_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("out.CSV");
        let sink = Sink::csv(path.clone(), ",").unwrap();

        let report = sink.write(&contents()).await.unwrap();

        assert_eq!(report.posts, 2);
        let written = std::fs::read_to_string(&path).unwrap();
        let mut lines = written.lines();
        assert_eq!(
            lines.next(),
            Some("post.url,post.content,post.author_url,author.url,author.name,author.description")
        );
        assert_eq!(lines.count(), 2);
    }

    #[test]
    fn test_csv_sink_rejects_other_extensions() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("out.json");

        let err = Sink::csv(path.clone(), ";").err().unwrap();

        assert!(err.to_string().contains("only supported is .csv"));
        assert!(!path.exists());
    }

    #[test]
    fn test_csv_sink_rejects_long_separator() {
        let result = Sink::csv(PathBuf::from("out.csv"), "::");
        assert!(result.is_err());
    }
}
