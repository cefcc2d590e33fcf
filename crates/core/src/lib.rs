//! Nutrishop
//!
//! Cart totals, order lifecycle and subscription cadence for the Nutrishop storefront. Every
//! aggregate in this crate is an owned value mutated in place; callers are expected to hold the
//! document lock (or transaction) for the duration of a read-modify-write.

pub mod addresses;
pub mod calendar;
pub mod carts;
pub mod checkout;
pub mod coupons;
pub mod errors;
pub mod fixtures;
pub mod orders;
pub mod pricing;
pub mod products;
pub mod subscriptions;
pub mod users;
pub mod uuids;

pub mod prelude;
