use clap::{Parser, Subcommand};

use std::path::PathBuf;

use super::constants::{
    ENV_CONFIG, ENV_DEBUG, ENV_HOST, ENV_MAX_PAGE_SIZE, ENV_PAGE_SIZE, ENV_PAYPAL_CLIENT_ID,
    ENV_PORT,
};

#[derive(Parser)]
#[command(name = "storefront")]
#[command(version, about = "Storefront catalog server", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Server host address
    #[arg(long, short = 'H', global = true, env = ENV_HOST)]
    pub host: Option<String>,

    /// Server port
    #[arg(long, short = 'p', global = true, env = ENV_PORT)]
    pub port: Option<u16>,

    /// Enable debug mode (logs every HTTP request)
    #[arg(long, global = true, env = ENV_DEBUG)]
    pub debug: bool,

    /// Path to config file
    #[arg(long, short = 'c', global = true, env = ENV_CONFIG)]
    pub config: Option<PathBuf>,

    /// Products per page when a request sets no limit
    #[arg(long, global = true, env = ENV_PAGE_SIZE)]
    pub page_size: Option<u32>,

    /// Largest page size a request may ask for
    #[arg(long, global = true, env = ENV_MAX_PAGE_SIZE)]
    pub max_page_size: Option<u32>,

    /// PayPal client id served at /api/config/paypal
    #[arg(long, global = true, env = ENV_PAYPAL_CLIENT_ID)]
    pub paypal_client_id: Option<String>,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Start the server (default command)
    Start,
    /// Product catalog commands
    Catalog {
        #[command(subcommand)]
        command: CatalogCommands,
    },
    /// System maintenance commands
    System {
        #[command(subcommand)]
        command: SystemCommands,
    },
}

#[derive(Subcommand, Clone, Debug)]
pub enum CatalogCommands {
    /// Import products from a JSON array file
    Import {
        /// Path to the JSON file
        file: PathBuf,
    },
}

#[derive(Subcommand, Clone, Debug)]
pub enum SystemCommands {
    /// Delete local data directory (database included). Requires confirmation.
    Prune {
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub debug: bool,
    pub config: Option<PathBuf>,
    pub page_size: Option<u32>,
    pub max_page_size: Option<u32>,
    pub paypal_client_id: Option<String>,
}

/// Parse CLI arguments and return config with command
pub fn parse() -> (CliConfig, Option<Commands>) {
    let cli = Cli::parse();
    let config = CliConfig {
        host: cli.host,
        port: cli.port,
        debug: cli.debug,
        config: cli.config,
        page_size: cli.page_size,
        max_page_size: cli.max_page_size,
        paypal_client_id: cli.paypal_client_id,
    };
    (config, cli.command)
}
