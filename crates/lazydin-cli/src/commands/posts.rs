use crate::OutputFormat;
use crate::config::Settings;
use anyhow::{Context, Result};
use lazydin_core::Post;
use lazydin_core::export::CsvExporter;
use lazydin_store::Database;

/// Which stored posts to list
#[derive(Debug, Clone)]
pub enum PostFilter {
    All,
    AuthorUrl(String),
    /// Case-insensitive substring of the author's name
    AuthorName(String),
}

impl PostFilter {
    pub fn new(author_url: Option<String>, author_name: Option<String>) -> Self {
        match (author_url, author_name) {
            (Some(url), _) => PostFilter::AuthorUrl(url),
            (None, Some(name)) => PostFilter::AuthorName(name),
            (None, None) => PostFilter::All,
        }
    }
}

pub async fn load_posts(db: &Database, filter: &PostFilter) -> Result<Vec<Post>> {
    let posts = db.posts();
    let found = match filter {
        PostFilter::All => posts.get_all_posts().await?,
        PostFilter::AuthorUrl(url) => posts.get_all_posts_by_author_url(url).await?,
        PostFilter::AuthorName(name) => posts.get_all_posts_by_author_name(name).await?,
    };
    Ok(found)
}

pub fn execute(settings: &Settings, filter: PostFilter, format: OutputFormat) -> Result<()> {
    tracing::info!("Listing posts from {}", settings.storage.display());

    let runtime = super::runtime()?;
    let posts = runtime.block_on(async {
        let db = Database::connect(&settings.storage)
            .await
            .with_context(|| format!("Failed to open database {}", settings.storage.display()))?;
        db.create_tables().await?;
        load_posts(&db, &filter).await
    })?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&posts)?),
        OutputFormat::Table => print!("{}", CsvExporter::default().posts_to_string(&posts)?),
        OutputFormat::Pretty => output_pretty(&posts),
    }

    Ok(())
}

fn output_pretty(posts: &[Post]) {
    use console::style;

    if posts.is_empty() {
        println!("No posts found.");
        return;
    }

    println!("\n{}", style(format!("{} posts", posts.len())).bold().cyan());
    for post in posts {
        println!("\n{}", style(&post.url).bold());
        println!("  Author:  {}", post.author_url);
        if let Some(updated_at) = post.updated_at {
            println!("  Updated: {}", updated_at.format("%Y-%m-%d %H:%M:%S"));
        }
        println!("  {}", preview(&post.content, 120));
    }
    println!();
}

/// First `max_chars` characters of `text` on a single line
fn preview(text: &str, max_chars: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max_chars {
        return flat;
    }
    let truncated: String = flat.chars().take(max_chars).collect();
    format!("{}...", truncated)
}
