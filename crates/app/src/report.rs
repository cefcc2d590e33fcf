//! Report
//!
//! Plain-text tables for the CLI.

use std::io;

use nutrishop::{orders::Order, products::Product};
use tabled::{
    builder::Builder,
    settings::{
        Alignment, Style,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::domain::subscriptions::data::SweepReport;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to write report")]
    IO(#[from] io::Error),
}

/// Write the catalog as a table.
///
/// # Errors
///
/// Returns an error if `out` cannot be written.
pub fn write_products(mut out: impl io::Write, products: &[Product]) -> Result<(), ReportError> {
    let mut builder = Builder::default();

    builder.push_record(["Product", "Price", "Sale", "Stock", "Active"]);

    for product in products {
        builder.push_record([
            product.name.clone(),
            product.price.to_string(),
            product
                .sale_price
                .map_or_else(String::new, |price| price.to_string()),
            product.stock_quantity.to_string(),
            if product.is_active { "yes" } else { "no" }.to_string(),
        ]);
    }

    write_table(&mut out, builder, 1..4)
}

/// Write an order's lines followed by its totals.
///
/// # Errors
///
/// Returns an error if `out` cannot be written.
pub fn write_order(mut out: impl io::Write, order: &Order) -> Result<(), ReportError> {
    let mut builder = Builder::default();

    builder.push_record(["Item", "Qty", "Unit", "Total"]);

    for item in order.items() {
        builder.push_record([
            item.name().to_string(),
            item.quantity().to_string(),
            item.unit_price().to_string(),
            item.total_price().to_string(),
        ]);
    }

    writeln!(
        out,
        "Order {} ({}, payment {})",
        order.order_number(),
        order.status(),
        order.payment_status()
    )?;

    write_table(&mut out, builder, 1..4)?;

    let totals = order.totals();

    for (label, amount) in [
        ("Subtotal", totals.subtotal),
        ("Discount", totals.discount),
        ("Coupon", totals.coupon_discount),
        ("Tax", totals.tax),
        ("Shipping", totals.shipping),
        ("Total", totals.total),
    ] {
        writeln!(out, "{label:>10}: {amount}")?;
    }

    if let Some(code) = order.coupon_code() {
        writeln!(out, "{:>10}: {code}", "Code")?;
    }

    Ok(())
}

/// Write the orders a sweep produced and the subscriptions it could not advance.
///
/// # Errors
///
/// Returns an error if `out` cannot be written.
pub fn write_sweep(mut out: impl io::Write, report: &SweepReport) -> Result<(), ReportError> {
    if report.orders.is_empty() && report.failures.is_empty() {
        writeln!(out, "No subscriptions due")?;

        return Ok(());
    }

    let mut builder = Builder::default();

    builder.push_record(["Order", "Subscription", "Items", "Total"]);

    for order in &report.orders {
        builder.push_record([
            order.order_number().to_string(),
            order
                .subscription()
                .map_or_else(String::new, |uuid| uuid.to_string()),
            order.items().len().to_string(),
            order.total().to_string(),
        ]);
    }

    write_table(&mut out, builder, 2..4)?;

    for failure in &report.failures {
        writeln!(out, "skipped {}: {}", failure.subscription, failure.error)?;
    }

    Ok(())
}

fn write_table(
    out: &mut impl io::Write,
    builder: Builder,
    numeric: std::ops::Range<usize>,
) -> Result<(), ReportError> {
    let mut table = builder.build();

    table.with(Style::modern_rounded());
    table.modify(Columns::new(numeric), Alignment::right());
    table.modify(Rows::first(), Alignment::left());

    writeln!(out, "{table}")?;

    Ok(())
}
