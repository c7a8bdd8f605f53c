use colored::Colorize;

use docscope::config::Config;
use docscope::embeddings::{EmbeddingProvider, EmbeddingStore};
use docscope::error::{DocscopeError, Result};
use docscope::search;

/// Load the collection, or explain how to create it
pub(crate) fn load_store(config: &Config) -> Result<Option<EmbeddingStore>> {
    match EmbeddingStore::load(&config.embeddings_path) {
        Ok(store) => Ok(Some(store)),
        Err(DocscopeError::NotReady(path)) => {
            eprintln!(
                "{} No embedding collection at {}. Run 'docscope embed' first.",
                "Not ready:".yellow(),
                path.display()
            );
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

pub fn cmd_search(
    config: &Config,
    query: &str,
    top_n: usize,
    threshold: f32,
    provider_override: Option<&str>,
    json: bool,
) -> Result<()> {
    let Some(store) = load_store(config)? else {
        return Ok(());
    };

    let provider = match provider_override {
        Some(name) => EmbeddingProvider::from_name(name, config.embedding_dim)?,
        None => EmbeddingProvider::from_env(config.embedding_dim)?,
    };

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| DocscopeError::Config(format!("tokio runtime: {}", e)))?;

    let results: Vec<_> = rt
        .block_on(search::search_text(&store, &provider, query, top_n))?
        .into_iter()
        .filter(|r| r.score >= threshold)
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    if results.is_empty() {
        println!("{}", "No matching documents.".yellow());
        return Ok(());
    }

    println!(
        "{} Most relevant documents for '{}':\n",
        "Search".green().bold(),
        query
    );
    for result in &results {
        println!(
            "  {} {} ({:.4})",
            ">".green(),
            result.id.cyan(),
            result.score
        );
    }
    println!("\nRead one with:");
    println!("  {}", "docscope show <document>".cyan());

    Ok(())
}

pub fn cmd_show(config: &Config, id: &str, max_chars: usize) -> Result<()> {
    let Some(preview) = search::preview_document(&config.processed_dir, id, max_chars)? else {
        eprintln!("{} Document '{}' not found", "Not found:".yellow(), id);
        return Ok(());
    };

    println!("📄 {}\n", preview.title.bold());
    println!("{}", preview.body);
    if preview.truncated {
        println!("\n{}", "[... truncated ...]".dimmed());
    }
    Ok(())
}
