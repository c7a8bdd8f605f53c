use colored::Colorize;

use docscope::config::Config;
use docscope::embeddings::{self, EmbeddingProvider};
use docscope::error::{DocscopeError, Result};

pub fn cmd_embed(config: &Config, provider_override: Option<&str>) -> Result<()> {
    let provider = match provider_override {
        Some(name) => EmbeddingProvider::from_name(name, config.embedding_dim)?,
        None => EmbeddingProvider::from_env(config.embedding_dim)?,
    };

    if !config.processed_dir.exists() {
        eprintln!(
            "{} No processed documents in {}",
            "Not ready:".yellow(),
            config.processed_dir.display()
        );
        return Ok(());
    }

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| DocscopeError::Config(format!("tokio runtime: {}", e)))?;

    println!(
        "{} Embedding documents from {} with {}...",
        "Embedding".green().bold(),
        config.processed_dir.display(),
        provider.name()
    );

    let store = rt.block_on(embeddings::generate::generate_embeddings(config, &provider))?;

    println!("{} Embeddings created:", "Done!".green().bold());
    println!("  Documents: {}", store.len());
    println!("  Dimension: {}", store.dimension().unwrap_or(0));
    println!(
        "  Saved to: {}",
        store.index_path.display().to_string().cyan()
    );
    println!("\nSearch with:");
    println!("  {}", "docscope search \"your query\"".cyan());

    Ok(())
}
