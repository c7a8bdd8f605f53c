mod commands;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use docscope::cli::{Cli, Commands};
use docscope::config::Config;
use docscope::error::Result;

use commands::embed::cmd_embed;
use commands::search::{cmd_search, cmd_show};
use commands::status::cmd_status;
use commands::viz::cmd_viz;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::load(cli.data_dir.as_deref())?;

    match cli.command {
        Commands::Embed { provider } => cmd_embed(&config, provider.as_deref()),
        Commands::Search {
            query,
            top,
            threshold,
            provider,
            json,
        } => cmd_search(&config, &query, top, threshold, provider.as_deref(), json),
        Commands::Show { id, chars } => cmd_show(&config, &id, chars),
        Commands::Viz {
            method,
            clusters,
            plain,
            format,
            out,
            seed,
            shrink,
        } => cmd_viz(
            &config,
            &method,
            clusters,
            plain,
            format,
            out.as_deref(),
            seed,
            shrink,
        ),
        Commands::Status => cmd_status(&config),
    }
}

/// `RUST_LOG` wins; otherwise `--verbose` selects info, default is warn
fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "info" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
