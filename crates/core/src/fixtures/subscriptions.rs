//! Subscription Fixtures

use jiff::Timestamp;
use rustc_hash::FxHashMap;
use serde::Deserialize;

use crate::{
    addresses::Address,
    orders::PaymentMethod,
    subscriptions::SubscriptionPlan,
};

/// Wrapper for subscriptions in YAML
#[derive(Debug, Deserialize)]
pub struct SubscriptionsFixture {
    /// Map of subscription key -> subscription fixture
    pub subscriptions: FxHashMap<String, SubscriptionFixture>,
}

/// Subscription Fixture
#[derive(Debug, Deserialize)]
pub struct SubscriptionFixture {
    /// Subscriber id
    pub owner: String,

    /// Cadence
    pub plan: SubscriptionPlan,

    /// When the subscription started
    pub start: Timestamp,

    /// How produced orders are paid
    pub payment_method: PaymentMethod,

    /// Order cap
    #[serde(default)]
    pub max_orders: Option<u32>,

    /// Basket, by product key
    pub items: Vec<LineFixture>,

    /// Where to ship
    pub shipping_address: Address,

    /// Courier instructions
    #[serde(default)]
    pub delivery_instructions: Option<String>,
}

/// A product key and quantity, used by subscription and cart fixtures.
#[derive(Debug, Deserialize)]
pub struct LineFixture {
    /// Product key from the products fixture
    pub product: String,

    /// Quantity
    pub quantity: u32,
}
