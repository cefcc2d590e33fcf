//! Application configuration module

use clap::{Parser, Subcommand};
use jiff::Timestamp;

use crate::config::{observability::LoggingConfig, store::StoreConfig};

pub mod observability;
pub mod store;

pub use observability::LogFormat;
pub use store::StoreCurrency;

/// Nutrishop CLI configuration
#[derive(Debug, Parser)]
#[command(name = "nutrishop", about = "Nutrishop storefront CLI", long_about = None)]
pub struct AppConfig {
    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Storefront settings.
    #[command(flatten)]
    pub store: StoreConfig,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI commands. Each one seeds a fresh in-memory store from the fixture set first.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the seeded catalog.
    Products,

    /// Produce orders for every subscription due at the given time.
    Sweep {
        /// Sweep time; now when omitted
        #[arg(long)]
        at: Option<Timestamp>,
    },

    /// Fill the seeded cart and check it out.
    Checkout {
        /// Coupon to apply instead of the one in the fixture
        #[arg(long)]
        coupon: Option<String>,
    },
}

impl AppConfig {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }
}
