//! # Theme Extractor CLI (`themex`)
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `themex serve` | Start the HTTP server |
//! | `themex extract <url>` | Fetch a site and print its theme as JSON |
//! | `themex analyze --html <file>` | Analyze saved HTML/CSS without network access |
//! | `themex completions <shell>` | Print shell completions |
//!
//! ## Examples
//!
//! ```bash
//! themex extract https://linear.app --pretty
//! themex analyze --html saved/index.html --css saved/main.css --name Linear
//! themex --config ./config/themex.toml serve
//! ```

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use theme_extractor::config::{load_config, Config};
use theme_extractor::pipeline::{analyze_documents, ThemeExtractor};
use theme_extractor::server::run_server;

/// Theme Extractor: derive a light/dark UI theme from a website's HTML and CSS.
#[derive(Parser)]
#[command(name = "themex", version, about)]
struct Cli {
    /// Path to configuration file (TOML). Built-in defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server.
    ///
    /// Serves `POST /api/extract-theme` and `GET /health` on `[server].bind`.
    Serve {
        /// Override the bind address from the config file.
        #[arg(long)]
        bind: Option<String>,
    },

    /// Fetch a website and print the extracted theme as JSON.
    Extract {
        /// Absolute http(s) URL, or scheme-relative (`//host/path`).
        url: String,

        /// Pretty-print the JSON output.
        #[arg(long)]
        pretty: bool,
    },

    /// Analyze saved HTML and CSS files without touching the network.
    Analyze {
        /// Saved HTML page. Its `<style>` blocks and `style=` attributes are
        /// included in the CSS.
        #[arg(long)]
        html: PathBuf,

        /// Additional stylesheet files, appended in order.
        #[arg(long)]
        css: Vec<PathBuf>,

        /// Display name for the generated theme.
        #[arg(long, default_value = "Custom")]
        name: String,

        /// Pretty-print the JSON output.
        #[arg(long)]
        pretty: bool,
    },

    /// Print shell completion script to stdout.
    Completions {
        /// Target shell.
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => Config::default(),
    };

    match cli.command {
        Commands::Serve { bind } => {
            if let Some(bind) = bind {
                config.server.bind = bind;
            }
            run_server(&config).await?;
        }
        Commands::Extract { url, pretty } => {
            let extractor = ThemeExtractor::from_config(&config.fetch)?;
            let result = extractor
                .extract_theme(&url)
                .await
                .with_context(|| format!("Failed to extract theme from {}", url))?;
            print_json(&result, pretty)?;
        }
        Commands::Analyze {
            html,
            css,
            name,
            pretty,
        } => {
            let page = std::fs::read_to_string(&html)
                .with_context(|| format!("Failed to read HTML file: {}", html.display()))?;
            let mut styles = theme_extractor::extract::inline_css(&page);
            for path in &css {
                let sheet = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read CSS file: {}", path.display()))?;
                styles.push_str(&sheet);
                styles.push('\n');
            }
            let result = analyze_documents(&page, &styles, &name);
            print_json(&result, pretty)?;
        }
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "themex", &mut io::stdout());
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", out);
    Ok(())
}
