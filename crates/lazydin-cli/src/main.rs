use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use lazydin_cli::OutputFormat;
use lazydin_cli::commands;
use lazydin_cli::commands::posts::PostFilter;
use lazydin_cli::config::Settings;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "lazydin")]
#[command(author, version, about, long_about = None)]
#[command(
    about = "Scrape LinkedIn post searches into a local database or CSV file",
    long_about = "lazydin logs into LinkedIn with a headless Chrome, searches posts, \
                  and saves each post with its author to SQLite or to a CSV file."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file [default: <config dir>/lazydin/config.json]
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Login username, overriding the stored one
    #[arg(short, long, global = true, env = "LAZYDIN_USERNAME")]
    user: Option<String>,

    /// Login password, overriding the stored one
    #[arg(
        short,
        long,
        global = true,
        env = "LAZYDIN_PASSWORD",
        hide_env_values = true
    )]
    password: Option<String>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value = "pretty")]
    format: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Search posts and save them with their authors
    Search {
        /// Search terms
        #[arg(short, long)]
        query: String,

        /// Write a CSV file instead of saving to the database
        #[arg(short, long, value_name = "FILE.csv")]
        output: Option<PathBuf>,

        /// CSV field separator (a single character)
        #[arg(long, default_value = ";")]
        sep: String,
    },

    /// List stored posts
    Posts {
        /// Only posts by the author with this profile URL
        #[arg(long, conflicts_with = "author_name")]
        author_url: Option<String>,

        /// Only posts whose author's name contains this text (case-insensitive)
        #[arg(long)]
        author_name: Option<String>,
    },

    /// List the action buttons on a profile page (nothing is clicked)
    Actions {
        /// Profile URL
        #[arg(long)]
        url: String,
    },

    /// Prompt for login credentials and save them to the config file
    CreateCredentials,

    /// Create the SQLite database and save its path to the config file
    CreateStorage {
        /// Database file; prompted for when omitted
        #[arg(value_name = "PATH")]
        path: Option<PathBuf>,
    },

    /// Generate shell completion scripts
    #[command(long_about = "Generate shell completion scripts for lazydin.

SUPPORTED SHELLS:
    bash, zsh, fish, powershell, elvish

INSTALLATION:
    bash:  lazydin completion --shell bash >> ~/.bashrc
    zsh:   lazydin completion --shell zsh > ~/.zfunc/_lazydin
           (add `fpath+=~/.zfunc` to ~/.zshrc before compinit)
    fish:  lazydin completion --shell fish > ~/.config/fish/completions/lazydin.fish")]
    Completion {
        /// Shell to generate completions for
        #[arg(long, value_enum)]
        shell: Shell,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    match cli.command {
        Commands::Search { query, output, sep } => {
            let (_, settings) = load_settings(cli.config)?;
            let credentials = settings.credentials(cli.user, cli.password)?;
            commands::search::execute(&settings, credentials, &query, output, &sep, cli.format)
        }
        Commands::Posts {
            author_url,
            author_name,
        } => {
            let (_, settings) = load_settings(cli.config)?;
            let filter = PostFilter::new(author_url, author_name);
            commands::posts::execute(&settings, filter, cli.format)
        }
        Commands::Actions { url } => {
            let (_, settings) = load_settings(cli.config)?;
            let credentials = settings.credentials(cli.user, cli.password)?;
            commands::actions::execute(&settings, credentials, &url, cli.format)
        }
        Commands::CreateCredentials => {
            let (path, settings) = load_settings(cli.config)?;
            commands::credentials::execute(&path, settings)
        }
        Commands::CreateStorage { path } => {
            let (config_path, settings) = load_settings(cli.config)?;
            commands::storage::execute(&config_path, settings, path)
        }
        Commands::Completion { shell } => commands::completion::execute(shell, &mut Cli::command()),
    }
}

fn load_settings(config: Option<PathBuf>) -> Result<(PathBuf, Settings)> {
    let path = match config {
        Some(path) => path,
        None => Settings::default_path()?,
    };
    let settings = Settings::load_or_init(&path)?;
    Ok((path, settings))
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new(
            "lazydin=debug,lazydin_cli=debug,lazydin_core=debug,lazydin_store=debug,lazydin_browser=debug",
        )
    } else {
        EnvFilter::new("lazydin=info,lazydin_cli=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}
