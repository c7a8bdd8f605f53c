use colored::Colorize;

use docscope::config::Config;
use docscope::embeddings::EmbeddingStore;
use docscope::error::Result;

pub fn cmd_status(config: &Config) -> Result<()> {
    println!("{} {}", "Data dir:".bold(), config.data_dir.display());

    let processed = if config.processed_dir.exists() {
        std::fs::read_dir(&config.processed_dir)?
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
            .count()
    } else {
        0
    };
    println!("  Processed documents: {}", processed);

    match EmbeddingStore::try_load(&config.embeddings_path)? {
        Some(store) => {
            println!("  Embedded documents: {}", store.len());
            println!("  Dimension: {}", store.dimension().unwrap_or(0));
            println!("  {}", "Ready".green().bold());
        }
        None => {
            println!(
                "  {} Run 'docscope embed' to build the collection.",
                "Not ready:".yellow()
            );
        }
    }

    Ok(())
}
