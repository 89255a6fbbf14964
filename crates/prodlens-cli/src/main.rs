mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "prodlens")]
#[command(about = "Extract, question, and compare e-commerce products")]
struct Cli {
    /// Print compact JSON instead of pretty-printed JSON
    #[arg(long, global = true)]
    compact: bool,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Scrape a product page and print the normalized record
    Scrape {
        /// Product page URL
        url: String,
        /// Extract from a saved HTML file instead of fetching `url`
        #[arg(long)]
        html_file: Option<PathBuf>,
    },
    /// Scrape a product page and rank similar products from other storefronts
    Compare {
        /// Product page URL
        url: String,
        /// Skip the language-model comparison summary
        #[arg(long)]
        no_summary: bool,
    },
    /// Scrape a product page and ask a question about it
    Ask {
        /// Product page URL
        url: String,
        /// Question about the product
        question: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = prodlens_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output = match cli.command {
        Some(Commands::Scrape { url, html_file }) => {
            commands::run_scrape(&config, &url, html_file.as_deref()).await?
        }
        Some(Commands::Compare { url, no_summary }) => {
            commands::run_compare(&config, &url, !no_summary).await?
        }
        Some(Commands::Ask { url, question }) => {
            commands::run_ask(&config, &url, &question).await?
        }
        None => {
            println!("prodlens: run with --help for usage");
            return Ok(());
        }
    };

    let rendered = if cli.compact {
        serde_json::to_string(&output)?
    } else {
        serde_json::to_string_pretty(&output)?
    };
    println!("{rendered}");
    Ok(())
}

#[cfg(test)]
mod tests;
