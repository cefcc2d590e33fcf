//! Nutrishop CLI

use std::{io, process};

use jiff::Timestamp;
use nutrishop::{checkout::CheckoutDetails, fixtures::Fixture};
use nutrishop_app::{
    config::{AppConfig, Command},
    context::AppContext,
    observability::init_logging,
    report::{write_order, write_products, write_sweep},
};

#[tokio::main]
pub async fn main() {
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(error) => error.exit(),
    };

    if let Err(error) = init_logging(&config.logging) {
        eprintln!("{error}");
        process::exit(1);
    }

    if let Err(error) = run(config).await {
        eprintln!("{error}");
        process::exit(1);
    }
}

async fn run(config: AppConfig) -> Result<(), String> {
    let fixture = Fixture::from_set_at(config.store.fixtures.clone(), &config.store.fixture_set)
        .map_err(|error| format!("failed to load fixture set: {error}"))?;

    let context = AppContext::from_fixture(&fixture, config.store.currency.currency())
        .await
        .map_err(|error| format!("failed to seed store: {error}"))?;

    match config.command {
        Command::Products => list_products(&context).await,
        Command::Sweep { at } => sweep(&context, at.unwrap_or_else(Timestamp::now)).await,
        Command::Checkout { coupon } => checkout(&context, &fixture, coupon).await,
    }
}

async fn list_products(context: &AppContext) -> Result<(), String> {
    let products = context
        .products
        .list_products()
        .await
        .map_err(|error| format!("failed to list products: {error}"))?;

    write_products(io::stdout().lock(), &products).map_err(|error| error.to_string())
}

async fn sweep(context: &AppContext, now: Timestamp) -> Result<(), String> {
    let report = context.subscriptions.process_due(now).await;

    write_sweep(io::stdout().lock(), &report).map_err(|error| error.to_string())
}

async fn checkout(
    context: &AppContext,
    fixture: &Fixture,
    coupon: Option<String>,
) -> Result<(), String> {
    let seed = fixture
        .cart_lines()
        .map_err(|error| format!("invalid cart fixture: {error}"))?
        .ok_or_else(|| "fixture set has no cart".to_string())?;

    for (product, quantity) in &seed.lines {
        context
            .carts
            .add_item(seed.owner, *product, *quantity)
            .await
            .map_err(|error| format!("failed to add {product} to cart: {error}"))?;
    }

    if let Some(code) = coupon.or(seed.coupon) {
        context
            .carts
            .apply_coupon(seed.owner, code)
            .await
            .map_err(|error| format!("failed to apply coupon: {error}"))?;
    }

    let order = context
        .orders
        .checkout(
            seed.owner,
            CheckoutDetails {
                payment_method: seed.payment_method,
                shipping_address: seed.shipping_address,
                billing_address: None,
                delivery_instructions: None,
                notes: None,
            },
        )
        .await
        .map_err(|error| format!("checkout failed: {error}"))?;

    write_order(io::stdout().lock(), &order).map_err(|error| error.to_string())
}
