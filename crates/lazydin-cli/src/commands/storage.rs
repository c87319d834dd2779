use crate::config::Settings;
use anyhow::{Context, Result};
use console::{Term, style};
use lazydin_store::Database;
use std::path::{Path, PathBuf};

/// Create the SQLite database at `path` (prompting when omitted) and make it
/// the configured storage
pub fn execute(config_path: &Path, mut settings: Settings, path: Option<PathBuf>) -> Result<()> {
    let path = match path {
        Some(path) => path,
        None => prompt_path(&settings.storage)?,
    };

    let runtime = super::runtime()?;
    runtime.block_on(async {
        let db = Database::connect(&path)
            .await
            .with_context(|| format!("Failed to create database {}", path.display()))?;
        db.create_tables().await?;
        db.pool().close().await;
        Ok::<_, anyhow::Error>(())
    })?;

    settings.storage = path;
    settings.save(config_path)?;

    println!(
        "{} Storage ready at {}",
        style("✓").green().bold(),
        settings.storage.display()
    );
    Ok(())
}

fn prompt_path(current: &Path) -> Result<PathBuf> {
    let term = Term::stderr();
    term.write_str(&format!("Database file [{}]: ", current.display()))?;
    let answer = term.read_line()?;
    let answer = answer.trim();

    if answer.is_empty() {
        Ok(current.to_path_buf())
    } else {
        Ok(PathBuf::from(answer))
    }
}
