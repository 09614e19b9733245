use std::io;
use std::path::Path;
use std::rc::Rc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use seen_cli::commands::{last, mark, watch};
use seen_cli::{Cli, Commands, Config};
use seen_core::{StorageProvider, VisibilityState};
use seen_store::FileStore;

/// Load config and open the store, ensuring the parent directory exists.
fn open_store(config_path: Option<&Path>) -> Result<(Rc<dyn StorageProvider>, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.storage_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create storage directory")?;
    }

    let store = FileStore::open(&config.storage_path).context("failed to open storage")?;
    Ok((Rc::new(store), config))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    match &cli.command {
        Some(Commands::Last { json }) => {
            let (store, config) = open_store(cli.config.as_deref())?;
            let mut stdout = io::stdout();
            last::run(&mut stdout, store.as_ref(), &config.storage_key, *json)?;
        }
        Some(Commands::Mark { state }) => {
            let (store, config) = open_store(cli.config.as_deref())?;
            let mut stdout = io::stdout();
            mark::run(
                &mut stdout,
                store,
                &config.storage_key,
                VisibilityState::from_signal(state),
            )?;
        }
        Some(Commands::Watch) => {
            let (store, config) = open_store(cli.config.as_deref())?;
            let stdin = io::stdin();
            let _ = watch::run(stdin.lock(), io::stdout(), store, &config.storage_key)?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
