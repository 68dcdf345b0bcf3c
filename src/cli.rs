use clap::{Parser, Subcommand};
use std::path::PathBuf;

const LONG_ABOUT: &str = r#"
Price Feed - item catalog with live price broadcasting

Clients connect to ws://<host>:<port>/ws/prices and receive every price
change as a text frame of the form "<item_id>:<price>", e.g. "item1:42.50".
Prices change through PUT /api/items/:id/price, or when a client sends a
message on its socket, which is relayed to everyone as-is.

Configuration:
  Flags override PRICE_FEED_* environment variables, which override defaults.
"#;

#[derive(Parser, Clone, Debug)]
#[command(name = "price-feed")]
#[command(about = "Item catalog with a real-time WebSocket price broadcast channel")]
#[command(long_about = LONG_ABOUT)]
#[command(version)]
pub struct Cli {
    /// Enable verbose output (-v)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output (-q)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Start the HTTP and WebSocket server
    Serve {
        /// Address to bind (default: 127.0.0.1)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind (default: 4567)
        #[arg(long)]
        port: Option<u16>,

        /// JSON seed catalog
        #[arg(long)]
        items: Option<PathBuf>,

        /// Directory served under /static
        #[arg(long)]
        static_dir: Option<PathBuf>,

        /// Drop a client after the first failed send
        #[arg(long)]
        evict_on_failure: bool,
    },

    /// Print the catalog as JSON
    ///
    /// Examples:
    ///   price-feed items
    ///   price-feed items --category instruments --max-price 500
    ///   price-feed items --items data/items.json --available true
    Items {
        /// JSON seed catalog (default: built-in sample)
        #[arg(long)]
        items: Option<PathBuf>,

        /// Category, case-insensitive
        #[arg(long)]
        category: Option<String>,

        /// Minimum price, inclusive
        #[arg(long)]
        min_price: Option<f64>,

        /// Maximum price, inclusive
        #[arg(long)]
        max_price: Option<f64>,

        /// Availability
        #[arg(long)]
        available: Option<bool>,
    },
}
