use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::io::AsyncReadExt as _;

use dionysus_core::AppBuilder;

#[derive(Parser, Debug)]
#[command(
    name = "dionysus",
    version,
    about = "Index repositories and ask questions about their code"
)]
struct Cli {
    /// Path to the TOML config file (overrides DIONYSUS_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Summarize, embed and store every indexable file under PATH
    Index {
        /// Repository identifier, e.g. github.com/acme/widget
        namespace: String,
        path: PathBuf,
    },
    /// Answer a question using the namespace's indexed code
    Ask {
        namespace: String,
        question: String,
    },
    /// Print a short summary of one source file
    SummarizeFile { path: PathBuf },
    /// Summarize a unified diff read from FILE or stdin
    SummarizeDiff { file: Option<PathBuf> },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_subscriber();
    let cli = Cli::parse();
    tracing::debug!(command = ?cli.command, "starting");

    let assistant = AppBuilder::from_env(cli.config.as_deref())
        .await?
        .build()
        .await?;

    match cli.command {
        Command::Index { namespace, path } => {
            let report = assistant.index_directory(&namespace, &path).await?;
            println!(
                "indexed {} file(s) into {} ({} summary fallback(s), {} degraded embedding(s), stored: {})",
                report.files,
                report.collection,
                report.summaries_failed,
                report.embeddings_degraded,
                report.stored
            );
        }
        Command::Ask {
            namespace,
            question,
        } => {
            println!("{}", assistant.answer_query(&question, &namespace).await);
        }
        Command::SummarizeFile { path } => {
            let code = tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("failed to read {}", path.display()))?;
            println!("{}", assistant.summarize_file(&source_name(&path), &code).await);
        }
        Command::SummarizeDiff { file } => {
            let diff = read_diff(file.as_deref()).await?;
            println!("{}", assistant.summarize_diff(&diff).await);
        }
    }
    Ok(())
}

fn init_subscriber() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn source_name(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

async fn read_diff(file: Option<&Path>) -> anyhow::Result<String> {
    if let Some(path) = file {
        return tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()));
    }
    let mut diff = String::new();
    tokio::io::stdin()
        .read_to_string(&mut diff)
        .await
        .context("failed to read diff from stdin")?;
    Ok(diff)
}
