use crate::OutputFormat;
use crate::config::Settings;
use anyhow::{Context, Result, bail};
use lazydin_browser::{ChromeSession, Credentials, Workflow};
use url::Url;

/// Log in and list the action buttons (Follow, Message, ...) shown on a
/// profile page. Nothing is clicked.
pub fn execute(
    settings: &Settings,
    credentials: Credentials,
    profile_url: &str,
    format: OutputFormat,
) -> Result<()> {
    let url = parse_profile_url(profile_url)?;

    let runtime = super::runtime()?;
    let result = runtime.block_on(async {
        let pb = super::spinner("Launching Chrome...");
        let session = ChromeSession::launch(&settings.browser_options()?).await?;

        let result = tokio::select! {
            result = async {
                let mut workflow = Workflow::new(session.driver());
                pb.set_message(format!("Logging in as {}...", credentials.username));
                workflow.authenticate(&credentials).await?;
                pb.set_message(format!("Opening {}...", url));
                workflow.profile_actions(url.as_str()).await
            } => result,
            _ = tokio::signal::ctrl_c() => Err(lazydin_browser::Error::Cancelled),
        };

        pb.finish_and_clear();
        if let Err(e) = session.close().await {
            tracing::warn!("Failed to close Chrome cleanly: {}", e);
        }
        Ok::<_, anyhow::Error>(result?)
    });

    runtime.shutdown_timeout(std::time::Duration::from_millis(100));

    let labels = result?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&labels)?),
        OutputFormat::Table => {
            println!("Action");
            for label in &labels {
                println!("{}", label);
            }
        }
        OutputFormat::Pretty => {
            use console::style;

            println!("\n{}", style(format!("Profile actions for {}", url)).bold().cyan());
            if labels.is_empty() {
                println!("  (none found)");
            }
            for label in &labels {
                println!("  • {}", label);
            }
            println!();
        }
    }

    Ok(())
}

fn parse_profile_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).with_context(|| format!("Invalid profile URL: {}", raw))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("Profile URL must use http or https, got {}", url.scheme());
    }
    Ok(url)
}
