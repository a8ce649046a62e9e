use anyhow::{Context, Result, bail};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use walkdir::WalkDir;

use crate::config::{Config, get_config_dir};
use crate::embeddings::OllamaEmbedder;
use crate::index::{QdrantIndex, VectorIndex};
use crate::ingest::Ingestor;
use crate::loader;
use crate::recommend::{GenerationClient, LabPanel, OllamaChat, Recommender, RetryPolicy};

fn load_config() -> Result<Config> {
    let config_dir = get_config_dir()?;
    Config::load(config_dir)
}

/// Print the resolved configuration.
#[inline]
pub fn show_config() -> Result<()> {
    let config = load_config()?;

    println!(
        "Configuration file: {}",
        config.config_file_path().display()
    );
    println!();
    print!(
        "{}",
        toml::to_string_pretty(&config).context("Failed to render configuration")?
    );

    Ok(())
}

/// Write the resolved configuration to disk so it can be edited.
#[inline]
pub fn init_config() -> Result<()> {
    let config = load_config()?;
    config.save()?;

    println!("Wrote {}", config.config_file_path().display());
    Ok(())
}

/// Ingest a single document or a directory tree of documents.
#[inline]
pub fn ingest(path: Option<&Path>) -> Result<()> {
    let config = load_config()?;
    let embedder = OllamaEmbedder::new(&config.ollama)?;
    let index = QdrantIndex::new(&config.qdrant)?;
    let ingestor = Ingestor::new(embedder, index, config.chunking);

    let target = path.map_or_else(|| config.docs_dir(), Path::to_path_buf);

    if target.is_file() {
        let chunks = ingestor.ingest_file(&target)?;
        println!("Ingested {} chunks from {}", chunks, target.display());
        return Ok(());
    }

    if !target.is_dir() {
        bail!("{} is neither a file nor a directory", target.display());
    }

    let total = WalkDir::new(&target)
        .follow_links(true)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|e| e.file_type().is_file() && loader::is_supported(e.path()))
        .count();

    if total == 0 {
        println!("No supported documents found under {}", target.display());
        println!("Supported extensions: {}", loader::SUPPORTED_EXTENSIONS.join(", "));
        return Ok(());
    }

    let bar = ProgressBar::new(total as u64);
    bar.set_style(
        ProgressStyle::with_template("[{bar:40}] {pos}/{len} {msg}")
            .context("Invalid progress template")?,
    );

    let report = ingestor.ingest_directory_with(&target, |file| {
        bar.set_message(
            file.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
        );
        bar.inc(1);
    })?;
    bar.finish_and_clear();

    println!(
        "Ingested {} chunks from {} files",
        report.chunks, report.files_ingested
    );
    if report.files_failed > 0 {
        println!(
            "{} file(s) could not be ingested and were skipped (see logs)",
            report.files_failed
        );
    }

    Ok(())
}

/// Generate and print a recommendation for the given lab panel.
#[inline]
pub fn recommend(panel: &LabPanel) -> Result<()> {
    let config = load_config()?;
    let embedder = OllamaEmbedder::new(&config.ollama)?;
    let index = QdrantIndex::new(&config.qdrant)?;
    let generator = GenerationClient::new(OllamaChat::new(&config.ollama)?, RetryPolicy::default());
    let recommender = Recommender::new(embedder, index, generator, config.retrieval.top_k);

    let result = recommender.recommend(panel)?;

    println!("{}", style("Nutrition Recommendation").bold());
    println!();
    println!("{}", result.recommendation);

    if !result.sources.is_empty() {
        println!();
        println!("{}", style("Sources").bold());
        for source in &result.sources {
            println!(
                "  [{}] {} (relevance {:.2})",
                source.guideline, source.source, source.relevance_score
            );
        }
    }

    println!();
    println!("{}", style(result.disclaimer).dim());

    Ok(())
}

/// Report the health of both external services and collection statistics.
#[inline]
pub fn status() -> Result<()> {
    let config = load_config()?;

    let embedder = OllamaEmbedder::new(&config.ollama)?;
    match embedder.health_check() {
        Ok(()) => println!(
            "Ollama: healthy ({} available, chat model {})",
            config.ollama.embedding_model, config.ollama.chat_model
        ),
        Err(e) => println!("Ollama: unhealthy ({})", e),
    }

    let index = QdrantIndex::new(&config.qdrant)?;
    match index.collection_exists() {
        Ok(true) => {
            println!("Qdrant: healthy");
            println!("  Collection: {}", index.collection());
            match index.collection_info() {
                Ok(info) => {
                    println!("  Points: {}", info.points_count);
                    if let Some(vectors) = info.vectors_count {
                        println!("  Vectors: {}", vectors);
                    }
                }
                Err(e) => println!("  Statistics unavailable ({})", e),
            }
        }
        Ok(false) => {
            println!("Qdrant: healthy");
            println!(
                "  Collection {} does not exist yet; run `nutrition-rag ingest` first",
                index.collection()
            );
        }
        Err(e) => println!("Qdrant: unhealthy ({})", e),
    }

    Ok(())
}
