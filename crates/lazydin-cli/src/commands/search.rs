use crate::OutputFormat;
use crate::config::Settings;
use crate::sink::{Sink, SinkReport};
use anyhow::{Context, Result};
use indicatif::ProgressBar;
use lazydin_browser::{ChromeSession, Credentials, Workflow};
use lazydin_core::extract_content;
use lazydin_store::Database;
use std::path::PathBuf;

/// Log in, search posts for `query` and write what was found to the
/// database or, when `output` is given, to a CSV file
pub fn execute(
    settings: &Settings,
    credentials: Credentials,
    query: &str,
    output: Option<PathBuf>,
    separator: &str,
    format: OutputFormat,
) -> Result<()> {
    let runtime = super::runtime()?;

    let result = runtime.block_on(async {
        let sink = match output {
            Some(path) => Sink::csv(path, separator)?,
            None => {
                let db = Database::connect(&settings.storage).await.with_context(|| {
                    format!("Failed to open database {}", settings.storage.display())
                })?;
                db.create_tables().await?;
                Sink::Store(db)
            }
        };

        let pb = super::spinner("Launching Chrome...");
        let fragments = collect_fragments(settings, &credentials, query, &pb).await;
        pb.finish_and_clear();
        let fragments = fragments?;

        let contents = extract_content(fragments.as_slice())?;

        let report = sink.write(&contents).await?;
        output_report(&report, query, format)
    });

    runtime.shutdown_timeout(std::time::Duration::from_millis(100));

    result
}

/// Run the browser part of the search, closing Chrome whether it succeeds,
/// fails or is interrupted
async fn collect_fragments(
    settings: &Settings,
    credentials: &Credentials,
    query: &str,
    pb: &ProgressBar,
) -> Result<Vec<String>> {
    let session = ChromeSession::launch(&settings.browser_options()?).await?;

    let result = tokio::select! {
        result = run_search(&session, credentials, query, pb) => result,
        _ = tokio::signal::ctrl_c() => Err(lazydin_browser::Error::Cancelled),
    };

    if let Err(e) = session.close().await {
        tracing::warn!("Failed to close Chrome cleanly: {}", e);
    }

    Ok(result?)
}

async fn run_search(
    session: &ChromeSession,
    credentials: &Credentials,
    query: &str,
    pb: &ProgressBar,
) -> lazydin_browser::Result<Vec<String>> {
    let mut workflow = Workflow::new(session.driver());

    pb.set_message(format!("Logging in as {}...", credentials.username));
    workflow.authenticate(credentials).await?;

    pb.set_message(format!("Searching posts for '{}'...", query));
    workflow.search(query).await?;

    pb.set_message("Reading results...");
    workflow.extract_fragments().await
}

fn output_report(report: &SinkReport, query: &str, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
        OutputFormat::Table => {
            println!("Metric,Value");
            println!("Query,{}", query);
            println!("Posts,{}", report.posts);
            println!("Authors,{}", report.authors);
            println!("Destination,{}", report.destination);
        }
        OutputFormat::Pretty => {
            use console::style;

            println!(
                "{} Saved {} posts by {} authors for '{}'",
                style("✓").green().bold(),
                report.posts,
                report.authors,
                query
            );
            println!("  Destination: {}", style(&report.destination).cyan());
        }
    }
    Ok(())
}
