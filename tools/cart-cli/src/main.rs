//! Cart CLI - inspect and edit the device-local shopping cart.
//!
//! Commands:
//! - `cart list` - Show the cart
//! - `cart add` - Add a product, or one more unit of it
//! - `cart increment` - Add one unit of a product in the cart
//! - `cart decrement` - Remove one unit, dropping the product at zero
//! - `cart config` - Manage configuration

mod commands;
mod config;
mod context;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{AddArgs, ConfigArgs, ItemArgs, ListArgs};

/// Cart CLI - Inspect and edit a device-local shopping cart
#[derive(Parser)]
#[command(name = "cart")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the cart contents
    List(ListArgs),

    /// Add a product to the cart
    Add(AddArgs),

    /// Add one unit of a product already in the cart
    Increment(ItemArgs),

    /// Remove one unit of a product
    Decrement(ItemArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Setup output formatting
    let output = output::Output::new(cli.verbose, cli.json);

    // Load config
    let config_path = cli.config.as_deref();
    let ctx = match context::Context::load(config_path, output.clone()) {
        Ok(ctx) => ctx,
        Err(e) => {
            output.error(&format!("{:#}", e));
            std::process::exit(1);
        }
    };

    // Execute command
    let result = match cli.command {
        Commands::List(args) => commands::cart::list(args, &ctx).await,
        Commands::Add(args) => commands::cart::add(args, &ctx).await,
        Commands::Increment(args) => commands::cart::increment(args, &ctx).await,
        Commands::Decrement(args) => commands::cart::decrement(args, &ctx).await,
        Commands::Config(args) => commands::config::run(args, &ctx).await,
    };

    if let Err(e) = result {
        ctx.output.error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}
