use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::config::{DEFAULT_CLUSTERS, DEFAULT_SEED, DEFAULT_TOP_N, PREVIEW_CHARS};

#[derive(Parser)]
#[command(
    name = "docscope",
    about = "Semantic search and cluster maps for a documentation corpus",
    version
)]
pub struct Cli {
    /// Enable verbose output
    #[arg(global = true, long, short)]
    pub verbose: bool,

    /// Data directory (defaults to $DOCSCOPE_HOME or ~/.docscope)
    #[arg(global = true, long)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Embed every processed document and save the collection
    Embed {
        /// Embedding provider override (openai, gemini, ollama)
        #[arg(long)]
        provider: Option<String>,
    },

    /// Rank documents by semantic similarity to a query
    Search {
        /// Free-form query text
        query: String,

        /// Number of results
        #[arg(short = 'n', long, default_value_t = DEFAULT_TOP_N)]
        top: usize,

        /// Hide results scoring below this similarity
        #[arg(long, default_value_t = -1.0, allow_hyphen_values = true)]
        threshold: f32,

        /// Embedding provider override (openai, gemini, ollama)
        #[arg(long)]
        provider: Option<String>,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the beginning of a processed document
    Show {
        /// Document identifier (file name)
        id: String,

        /// Characters to show
        #[arg(long, default_value_t = PREVIEW_CHARS)]
        chars: usize,
    },

    /// Project the collection to 2-D and draw a cluster map
    Viz {
        /// Reduction method (tsne, umap, pca)
        #[arg(short, long, default_value = "tsne")]
        method: String,

        /// Number of clusters
        #[arg(short = 'k', long, default_value_t = DEFAULT_CLUSTERS)]
        clusters: usize,

        /// Draw the unclustered layout instead
        #[arg(long)]
        plain: bool,

        /// Output format
        #[arg(long, value_enum, default_value_t = VizFormat::Svg)]
        format: VizFormat,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Seed for clustering and the randomized reducers
        #[arg(long, default_value_t = DEFAULT_SEED)]
        seed: u64,

        /// Pull cluster outlines towards their centre, in (0, 1]
        #[arg(long, default_value_t = crate::geometry::SHRINK_FACTOR)]
        shrink: f64,
    },

    /// Show whether the embedding collection is ready
    Status,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum VizFormat {
    Svg,
    Json,
    Ascii,
}
