//! Command-line caller for `docchat-rag`.
//!
//! `docchat chunk` plays the upload step: it turns a text file into a chunk
//! set the caller keeps. `docchat ask` plays the chat step: it re-submits that
//! chunk set with a question and prints what would be sent to the model.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use docchat_rag::{
    ChunkedDocument, Document, GroundedPrompt, OpenAIEmbeddingProvider, RagConfig, Retrieval,
    Retriever, chunk_document,
};
use tracing::{info, warn};

const DEFAULT_DEVELOPER_MESSAGE: &str = "You are a helpful AI assistant.";

#[derive(Debug, Parser)]
#[command(
    name = "docchat",
    version,
    about = "Chunk a document and retrieve context for questions about it"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Split a UTF-8 text file into overlapping chunks and emit them as JSON
    Chunk {
        /// Text file to chunk
        file: PathBuf,
        /// Maximum characters per chunk [env: DOCCHAT_CHUNK_SIZE, default: 1000]
        ///
        /// Must stay above the overlap; pair a size of 200 or less with
        /// `--chunk-overlap`.
        #[arg(long)]
        chunk_size: Option<usize>,
        /// Characters shared by consecutive chunks [env: DOCCHAT_CHUNK_OVERLAP, default: 200]
        #[arg(long)]
        chunk_overlap: Option<usize>,
        /// Write the chunk set here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Retrieve the chunks most relevant to a question and build the system prompt
    Ask {
        /// Chunk set produced by `docchat chunk`
        chunks: PathBuf,
        /// The user's question
        query: String,
        /// Number of chunks to retrieve [env: DOCCHAT_TOP_K, default: 3]
        #[arg(short)]
        k: Option<usize>,
        /// System message appended after the retrieved context
        #[arg(long, default_value = DEFAULT_DEVELOPER_MESSAGE)]
        developer_message: String,
        /// Skip the embedding service and rank by token overlap
        #[arg(long)]
        lexical: bool,
        /// Print a JSON object instead of text
        #[arg(long)]
        json: bool,
    },
}

/// Execute a parsed command, writing its result to `out`.
pub async fn run(cli: Cli, out: &mut impl Write) -> Result<()> {
    match cli.command {
        Commands::Chunk { file, chunk_size, chunk_overlap, output } => {
            let mut config = RagConfig::from_env()?;
            if let Some(size) = chunk_size {
                config.chunk_size = size;
            }
            match chunk_overlap {
                Some(overlap) => config.chunk_overlap = overlap,
                None if chunk_size.is_some() && config.chunk_overlap >= config.chunk_size => bail!(
                    "--chunk-size {} is not larger than the configured overlap of {}; \
                     pass a smaller --chunk-overlap as well",
                    config.chunk_size,
                    config.chunk_overlap
                ),
                None => {}
            }
            config.validate()?;
            let chunked = chunk_file(&file, &config)?;
            let json = serde_json::to_string_pretty(&chunked)?;
            match output {
                Some(path) => {
                    fs::write(&path, json)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    info!(
                        path = %path.display(),
                        chunks = chunked.chunks_processed,
                        "wrote chunk set"
                    );
                }
                None => writeln!(out, "{json}")?,
            }
            Ok(())
        }
        Commands::Ask { chunks, query, k, developer_message, lexical, json } => {
            let mut config = RagConfig::from_env()?;
            if let Some(k) = k {
                config.top_k = k;
            }
            let chunked = load_chunks(&chunks)?;
            let retriever = build_retriever(config, lexical)?;
            let grounded = GroundedPrompt::build(
                &retriever,
                chunked.filename.as_deref(),
                &chunked.chunks,
                &developer_message,
                &query,
            )
            .await?;

            if json {
                let body = serde_json::json!({
                    "strategy": grounded.retrieval.strategy,
                    "chunks": grounded.retrieval.chunks,
                    "system_prompt": grounded.system_prompt,
                });
                writeln!(out, "{}", serde_json::to_string_pretty(&body)?)?;
            } else {
                write_report(out, &grounded.retrieval, &grounded.system_prompt)?;
            }
            Ok(())
        }
    }
}

/// Read a text file and chunk it, naming the document after the file.
pub fn chunk_file(path: &Path, config: &RagConfig) -> Result<ChunkedDocument> {
    let text =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let mut document = Document::new(text);
    if let Some(name) = path.file_name() {
        document = document.with_name(name.to_string_lossy());
    }
    Ok(chunk_document(&document, config)?)
}

/// Load a chunk set written by `docchat chunk`.
pub fn load_chunks(path: &Path) -> Result<ChunkedDocument> {
    let raw =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a docchat chunk set", path.display()))
}

fn build_retriever(config: RagConfig, lexical: bool) -> Result<Retriever> {
    let mut builder = Retriever::builder().config(config);
    if !lexical {
        match OpenAIEmbeddingProvider::from_env() {
            Ok(provider) => builder = builder.embedding_provider(Arc::new(provider)),
            Err(e) => warn!(error = %e, "embeddings unavailable, ranking lexically"),
        }
    }
    Ok(builder.build()?)
}

fn write_report(out: &mut impl Write, retrieval: &Retrieval, prompt: &str) -> Result<()> {
    writeln!(out, "strategy: {}", retrieval.strategy)?;
    for (rank, chunk) in retrieval.chunks.iter().enumerate() {
        writeln!(out, "\n[{}] chunk #{} score {:.4}", rank + 1, chunk.index, chunk.score)?;
        writeln!(out, "{}", chunk.text)?;
    }
    writeln!(out, "\n--- system prompt ---\n{prompt}")?;
    Ok(())
}
