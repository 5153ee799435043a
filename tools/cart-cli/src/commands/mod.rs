//! CLI command implementations.

pub mod cart;
pub mod config;

use clap::{Args, Subcommand};

/// Arguments for the list command.
#[derive(Args)]
pub struct ListArgs {
    /// Print only the total quantity.
    #[arg(long)]
    pub count: bool,
}

/// Arguments for the add command.
#[derive(Args)]
pub struct AddArgs {
    /// Catalog product ID.
    pub id: String,

    /// Product title.
    #[arg(short, long)]
    pub title: String,

    /// Product image URL.
    #[arg(short, long, default_value = "")]
    pub image_url: String,

    /// Unit price.
    #[arg(short, long, value_parser = parse_price)]
    pub price: f64,
}

/// Parse a price, rejecting NaN and infinities.
fn parse_price(s: &str) -> Result<f64, String> {
    let price: f64 = s.parse().map_err(|e| format!("invalid price '{}': {}", s, e))?;
    if !price.is_finite() {
        return Err(format!("price must be a finite number, got '{}'", s));
    }
    Ok(price)
}

/// Arguments for commands addressing one line item.
#[derive(Args)]
pub struct ItemArgs {
    /// Catalog product ID.
    pub id: String,
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration.
    Show,
    /// Initialize a new config file.
    Init {
        /// Force overwrite existing config.
        #[arg(short, long)]
        force: bool,
    },
    /// Validate the config file.
    Validate,
}
