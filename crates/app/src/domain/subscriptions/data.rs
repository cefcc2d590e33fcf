//! Subscriptions Data

use nutrishop::{
    addresses::Address,
    orders::{Order, PaymentMethod},
    products::ProductUuid,
    subscriptions::{SubscriptionPlan, SubscriptionUuid},
};

use crate::domain::subscriptions::errors::SubscriptionsServiceError;

/// A product and how many of it to send each time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionLine {
    pub product: ProductUuid,
    pub quantity: u32,
}

/// New Subscription Data
///
/// Lines are priced from the catalog when the subscription is created.
#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionRequest {
    pub plan: SubscriptionPlan,
    pub items: Vec<SubscriptionLine>,
    pub shipping_address: Address,
    pub delivery_instructions: Option<String>,
    pub payment_method: PaymentMethod,
    pub max_orders: Option<u32>,
    pub notes: Option<String>,
}

/// A subscription the sweep could not process.
#[derive(Debug)]
pub struct SweepFailure {
    pub subscription: SubscriptionUuid,
    pub error: SubscriptionsServiceError,
}

/// Outcome of one pass over the due subscriptions.
#[derive(Debug, Default)]
pub struct SweepReport {
    /// Orders produced, one per processed subscription
    pub orders: Vec<Order>,

    /// Subscriptions that were due but left unadvanced
    pub failures: Vec<SweepFailure>,
}
