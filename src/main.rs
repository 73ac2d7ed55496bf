use clap::{Parser, Subcommand};
use corpus_qa::{api, config::Settings, indexer};
use std::path::PathBuf;
use tracing::Level;

#[derive(Parser)]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Run the question-answering HTTP service
    Api,
    /// Build the index and metadata artifacts from an embedded corpus (JSONL)
    Index {
        /// Corpus file, one JSON object per line: {"url", "text"?, "embedding"}
        #[arg(long)]
        corpus: PathBuf,
        /// Output path for the vector index artifact
        #[arg(long, default_value = "index/index.bin")]
        index_out: PathBuf,
        /// Output path for the metadata array
        #[arg(long, default_value = "index/metadata.json")]
        metadata_out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    match Cli::parse().cmd {
        Cmd::Api => api::run(Settings::from_env()).await?,
        Cmd::Index {
            corpus,
            index_out,
            metadata_out,
        } => indexer::build_artifacts(&corpus, &index_out, &metadata_out)?,
    }
    Ok(())
}
