//! Store Config

use std::path::PathBuf;

use clap::Args;
use rusty_money::iso::{self, Currency};

/// Currencies the storefront can price in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum StoreCurrency {
    Gbp,
    Usd,
    Eur,
}

impl StoreCurrency {
    /// The ISO currency.
    #[must_use]
    pub fn currency(self) -> &'static Currency {
        match self {
            Self::Gbp => iso::GBP,
            Self::Usd => iso::USD,
            Self::Eur => iso::EUR,
        }
    }
}

/// Storefront settings.
#[derive(Debug, Args)]
pub struct StoreConfig {
    /// Currency every cart and product is priced in
    #[arg(long, env = "STORE_CURRENCY", value_enum, default_value_t = StoreCurrency::Usd)]
    pub currency: StoreCurrency,

    /// Directory holding the YAML seed fixtures
    #[arg(long, env = "FIXTURES_PATH", default_value = "./fixtures")]
    pub fixtures: PathBuf,

    /// Fixture set to seed from
    #[arg(long, env = "FIXTURE_SET", default_value = "demo")]
    pub fixture_set: String,
}
