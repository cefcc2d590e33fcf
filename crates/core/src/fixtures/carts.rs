//! Cart Fixtures

use serde::Deserialize;

use crate::{addresses::Address, fixtures::subscriptions::LineFixture, orders::PaymentMethod};

/// Wrapper for a seeded cart in YAML
#[derive(Debug, Deserialize)]
pub struct CartsFixture {
    /// The cart
    pub cart: CartFixture,
}

/// Cart Fixture
#[derive(Debug, Deserialize)]
pub struct CartFixture {
    /// Cart owner id
    pub owner: String,

    /// Coupon code to apply
    #[serde(default)]
    pub coupon: Option<String>,

    /// Lines, by product key
    pub items: Vec<LineFixture>,

    /// Where the checkout ships
    #[serde(default)]
    pub shipping_address: Address,

    /// How the checkout pays; credit card when absent
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
}
