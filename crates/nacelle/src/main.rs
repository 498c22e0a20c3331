mod cli;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::error;

use nacelle_core::host::config::HostConfig;
use nacelle_core::host::constants;
use nacelle_core::pilet_loader::strategy::LoadingStrategy;
use nacelle_core::pilet_loader::traits::{FeedSource, FileFeedSource};

/// Nacelle: a runtime plugin host
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Inspect pilet feeds
    Feed {
        #[command(subcommand)]
        command: FeedCommand,
    },
    /// Resolve a module request (e.g. `shop@^2.0.0`) against a feed
    Resolve {
        /// The requested module id
        id: String,
        /// The feed file to resolve against
        #[arg(long, default_value = constants::DEFAULT_FEED_FILE)]
        feed: PathBuf,
    },
    /// Run the demo host with the statically linked pilets
    Run {
        /// Pilet feed file (defaults to the static pilet set)
        #[arg(long)]
        feed: Option<PathBuf>,
        /// Loading strategy: parallel, sequential or on-demand
        #[arg(long)]
        strategy: Option<LoadingStrategy>,
        /// Host configuration file (TOML or JSON)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
enum FeedCommand {
    /// List the pilets a feed announces
    List {
        /// The feed file to read
        #[arg(long, default_value = constants::DEFAULT_FEED_FILE)]
        feed: PathBuf,
    },
    /// Validate versions and dependency ranges in a feed
    Check {
        /// The feed file to read
        #[arg(long, default_value = constants::DEFAULT_FEED_FILE)]
        feed: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = CliArgs::parse();
    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: CliArgs) -> nacelle_core::host::error::Result<ExitCode> {
    match args.command {
        Commands::Feed { command } => match command {
            FeedCommand::List { feed } => {
                let items = FileFeedSource::new(&feed).fetch_pilets().await?;
                println!("Pilets in '{}':", feed.display());
                cli::print_feed(&items);
                Ok(ExitCode::SUCCESS)
            }
            FeedCommand::Check { feed } => {
                let items = FileFeedSource::new(&feed).fetch_pilets().await?;
                println!("Checking '{}':", feed.display());
                let problems = cli::check_feed(&items);
                if problems == 0 {
                    println!("  All {} entries are valid.", items.len());
                    Ok(ExitCode::SUCCESS)
                } else {
                    println!("  {problems} problems found.");
                    Ok(ExitCode::FAILURE)
                }
            }
        },
        Commands::Resolve { id, feed } => {
            let items = FileFeedSource::new(&feed).fetch_pilets().await?;
            match cli::resolve_against_feed(&items, &id) {
                Some(resolved) => {
                    println!("'{id}' resolves to '{resolved}'");
                    Ok(ExitCode::SUCCESS)
                }
                None => {
                    println!("'{id}' does not resolve against '{}'", feed.display());
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Commands::Run {
            feed,
            strategy,
            config,
        } => {
            let config = match &config {
                Some(path) => Some(HostConfig::load(path).await?),
                None => None,
            };
            // An explicit --strategy flag wins over the config file.
            let effective_strategy = strategy
                .or(config.as_ref().map(|c| c.strategy))
                .unwrap_or_default();

            let mut host =
                cli::build_demo_host(feed.as_deref(), effective_strategy, config.as_ref())?;
            let outcome = host.bootstrap().await?;
            cli::print_outcome(&outcome, &host);

            host.shutdown().await?;
            if outcome.is_fully_active() {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::FAILURE)
            }
        }
    }
}
