//! pdfqa CLI
//!
//! Commands:
//!   sections - Show the preview and detected headings of a document
//!   ask      - Ask a question (or start an interactive session)
//!   serve    - Start HTTP server
//!   config   - Show or initialize configuration

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;
use pdfqa::{repl, Assistant, Config, Document, HEADING_DISPLAY_LIMIT};
use std::path::{Path, PathBuf};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(name = "pdfqa")]
#[command(about = "Ask questions about PDF documents")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the text preview and detected section headings
    Sections {
        /// PDF (or .txt/.md) file
        path: PathBuf,
    },

    /// Ask a question about a document
    Ask {
        /// PDF (or .txt/.md) file
        path: PathBuf,

        /// Question to ask; omit for an interactive session
        question: Option<String>,

        /// API key for this session (overrides config and environment)
        #[arg(long)]
        api_key: Option<String>,

        /// Model identifier
        #[arg(short, long)]
        model: Option<String>,

        /// Chat-completions endpoint URL
        #[arg(long)]
        endpoint: Option<String>,
    },

    /// Start HTTP server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8005")]
        port: u16,
    },

    /// Show the effective configuration
    Config {
        /// Write a default config file to ~/.pdfqa/config.toml
        #[arg(long)]
        init: bool,
    },
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Read and section a document, turning extraction failures into a message.
fn load_document(path: &Path) -> Result<Document> {
    let bytes = std::fs::read(path)?;
    let file_name = path.to_string_lossy();
    Ok(Document::from_upload(&file_name, &bytes)?)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::resolve()?;

    match cli.command {
        Commands::Sections { path } => {
            let document = load_document(&path)?;

            println!("{}", "Document preview".green().bold());
            println!("{}\n", document.preview());

            println!("{}", "Detected section headings".green().bold());
            for heading in document.headings(HEADING_DISPLAY_LIMIT) {
                println!("  {}", heading);
            }
            let total = document.sections().len();
            if total > HEADING_DISPLAY_LIMIT {
                println!("  {} more", format!("... {}", total - HEADING_DISPLAY_LIMIT).dimmed());
            }
        }

        Commands::Ask {
            path,
            question,
            api_key,
            model,
            endpoint,
        } => {
            let config = config
                .with_api_key(api_key.as_deref())
                .with_model(model.as_deref())
                .with_endpoint(endpoint.as_deref());

            if !config.has_api_key() {
                eprintln!(
                    "{} No API key available. Set OPENROUTER_API_KEY in .env or the environment, or pass --api-key.",
                    "error:".red().bold()
                );
                std::process::exit(1);
            }

            let document = load_document(&path)?;
            println!(
                "{} Loaded {} ({} sections)",
                "✓".green(),
                path.display(),
                document.sections().len()
            );

            let assistant = Assistant::from_config(&config)?;

            match question {
                Some(question) => {
                    let interaction = assistant.ask(&document, &question).await?;
                    repl::print_interaction(&interaction);
                }
                None => repl::run(&assistant, &document).await?,
            }
        }

        Commands::Serve { port } => {
            if !config.has_api_key() {
                println!(
                    "{} No server-wide API key; clients must send api_key with each request.",
                    "!".yellow()
                );
            }
            println!("Starting server on http://localhost:{}...", port);
            pdfqa::run_server(config, port).await?;
        }

        Commands::Config { init } => {
            if init {
                let path = Config::path()?;
                if Config::exists() {
                    println!("Config already exists at {}", path.display());
                } else {
                    Config::default().save()?;
                    println!("{} Wrote default configuration to {}", "✓".green(), path.display());
                }
                return Ok(());
            }

            println!("pdfqa configuration\n");
            println!("  Model:          {}", config.model);
            println!("  Endpoint:       {}", config.endpoint);
            println!("  API key:        {}", config.masked_api_key());
            println!("  Timeout:        {}s", config.timeout_secs);
            println!("  Chunk size:     {} chars", config.max_chunk_chars);
            println!("  Summaries:      {} in parallel", config.summary_concurrency);
            println!("  Retries:        {} (backoff {}ms)", config.max_retries, config.backoff_base_ms);
            println!(
                "\n  Config file:    {}",
                Config::path().map(|p| p.display().to_string()).unwrap_or_default()
            );
        }
    }

    Ok(())
}
