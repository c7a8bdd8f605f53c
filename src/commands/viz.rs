use std::path::Path;

use colored::Colorize;

use super::search::load_store;
use docscope::cli::VizFormat;
use docscope::config::Config;
use docscope::error::Result;
use docscope::viz::{self, VizRequest};

#[allow(clippy::too_many_arguments)]
pub fn cmd_viz(
    config: &Config,
    method: &str,
    clusters: usize,
    plain: bool,
    format: VizFormat,
    out: Option<&Path>,
    seed: u64,
    shrink: f64,
) -> Result<()> {
    // Reject bad names before touching the store
    let mut request = VizRequest::new(method, (!plain).then_some(clusters))?.with_seed(seed);
    request.shrink_factor = shrink;

    let Some(store) = load_store(config)? else {
        return Ok(());
    };

    eprintln!(
        "{} Reducing {} documents with {}...",
        "Projecting".green().bold(),
        store.len(),
        request.method.label()
    );

    let Some(scene) = viz::render(&store, &request)? else {
        eprintln!("{} No embeddings to visualize", "Empty:".yellow());
        return Ok(());
    };

    let rendered = match format {
        VizFormat::Svg => viz::svg::render(&scene),
        VizFormat::Json => serde_json::to_string_pretty(&scene)?,
        VizFormat::Ascii => viz::ascii::render(&scene),
    };

    match out {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            std::fs::write(path, rendered)?;
            eprintln!(
                "{} Wrote {}",
                "Done!".green().bold(),
                path.display().to_string().cyan()
            );
        }
        None => print!("{}", rendered),
    }

    Ok(())
}
