use crate::config::Settings;
use anyhow::{Result, bail};
use console::{Term, style};
use std::path::Path;

/// Prompt for the login credentials and store them in the config file
pub fn execute(config_path: &Path, mut settings: Settings) -> Result<()> {
    let term = Term::stderr();

    term.write_str("Username (email): ")?;
    let username = term.read_line()?.trim().to_string();
    term.write_str("Password: ")?;
    let password = term.read_secure_line()?;

    if username.is_empty() || password.is_empty() {
        bail!("Username and password must not be empty");
    }

    settings.credentials.username = username;
    settings.credentials.password = password;
    settings.save(config_path)?;

    println!(
        "{} Credentials saved to {}",
        style("✓").green().bold(),
        config_path.display()
    );
    Ok(())
}
