use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use twitoff::config::{Config, EmbedderBackend};
use twitoff::embedding::{download, onnx, Embedder, HashingEmbedder};
use twitoff::pipeline::{compare, ingest, predict::Predictor};
use twitoff::store::MemoryTweetStore;

/// Twitoff: which of two accounts is more likely to say a given sentence?
///
/// Embeds each account's tweets, fits a logistic regression between the two
/// sets, and classifies the hypothetical text.
#[derive(Parser)]
#[command(name = "twitoff", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download the ONNX sentence embedding model (~90 MB)
    DownloadModel,

    /// List the tweet archives available for comparison
    Users {
        /// Directory of <user>.txt / <user>.json archives (default: TWITOFF_TWEETS_DIR or ./tweets)
        #[arg(long)]
        tweets_dir: Option<PathBuf>,
    },

    /// Print the embedding of a piece of text
    Embed {
        /// The text to embed
        text: String,

        /// Print the full vector as JSON
        #[arg(long)]
        json: bool,
    },

    /// Predict which of two users is more likely to say a text
    Compare {
        /// First user (leading @ optional)
        user1: String,

        /// Second user (leading @ optional)
        user2: String,

        /// The hypothetical tweet
        text: String,

        /// Directory of <user>.txt / <user>.json archives (default: TWITOFF_TWEETS_DIR or ./tweets)
        #[arg(long)]
        tweets_dir: Option<PathBuf>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Serialize)]
struct EmbeddingOutput<'a> {
    text: &'a str,
    dimension: usize,
    vector: &'a [f64],
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("twitoff=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::DownloadModel => {
            let config = Config::load()?;
            let model_dir = &config.model_dir;

            println!("Downloading ONNX embedding model...");
            println!("  Destination: {}", model_dir.display());

            download::download_model(model_dir).await?;

            println!("\n{}", "Model downloaded successfully.".bold());
            println!("You can now run `twitoff compare <user1> <user2> \"<text>\"`.");
        }

        Commands::Users { tweets_dir } => {
            let config = Config::load()?;
            let dir = tweets_dir.unwrap_or(config.tweets_dir);

            let mut listing = Vec::new();
            for entry in twitoff::archive::list_users(&dir)? {
                let count = twitoff::archive::load_tweets(&entry.path)?.len();
                listing.push((entry, count));
            }
            twitoff::output::terminal::display_archives(&listing);
        }

        Commands::Embed { text, json } => {
            let config = Config::load()?;
            config.require_embedder()?;
            let embedder = create_embedder(&config)?;

            let vector = embedder.embed(&text)?;

            if json {
                let output = EmbeddingOutput {
                    text: &text,
                    dimension: vector.len(),
                    vector: &vector,
                };
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                twitoff::output::terminal::display_vector(&text, &vector);
            }
        }

        Commands::Compare {
            user1,
            user2,
            text,
            tweets_dir,
            json,
        } => {
            let config = Config::load()?;
            config.require_embedder()?;
            let dir = tweets_dir.unwrap_or_else(|| config.tweets_dir.clone());
            let embedder = create_embedder(&config)?;

            let store = Arc::new(MemoryTweetStore::new());
            for user in [&user1, &user2] {
                let tweets = twitoff::archive::load_user(&dir, user)?;
                let count =
                    ingest::ingest_user(&store, Arc::clone(&embedder), user, tweets).await?;
                if !json {
                    println!(
                        "Loaded {count} tweets for @{}",
                        twitoff::store::normalize_user(user)
                    );
                }
            }

            let predictor = Predictor::new(store, embedder);
            let comparison = compare::compare(&predictor, &user1, &user2, &text)
                .await
                .context("Comparison failed")?;

            if json {
                println!("{}", serde_json::to_string_pretty(&comparison)?);
            } else {
                twitoff::output::terminal::display_comparison(&comparison);
            }
        }
    }

    Ok(())
}

/// Create the embedder for the configured backend.
fn create_embedder(config: &Config) -> Result<Arc<dyn Embedder>> {
    match config.embedder_backend {
        EmbedderBackend::Onnx => {
            info!("Using local ONNX sentence embedder");
            let embedder = onnx::shared(&download::embedding_model_dir(&config.model_dir))?;
            Ok(embedder)
        }
        EmbedderBackend::Hashing => {
            info!(dim = config.hash_dim, "Using feature-hashing embedder");
            Ok(Arc::new(HashingEmbedder::new(config.hash_dim)))
        }
    }
}
