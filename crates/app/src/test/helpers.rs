//! Test Helpers

use nutrishop::{
    addresses::Address,
    checkout::CheckoutDetails,
    orders::PaymentMethod,
    pricing::Amount,
    products::ProductUuid,
    subscriptions::SubscriptionPlan,
};
use rusty_money::{Money, iso};

use crate::domain::subscriptions::data::{SubscriptionLine, SubscriptionRequest};

/// US dollars from cents.
pub(crate) fn usd(minor: i64) -> Amount {
    Money::from_minor(minor, iso::USD)
}

pub(crate) fn address() -> Address {
    Address {
        first_name: "Ada".to_string(),
        last_name: "Byron".to_string(),
        street_address: "12 Analytical Way".to_string(),
        city: "Portland".to_string(),
        state: "OR".to_string(),
        zip_code: "97201".to_string(),
        country: "US".to_string(),
        phone: None,
    }
}

pub(crate) fn checkout_details() -> CheckoutDetails {
    CheckoutDetails {
        payment_method: PaymentMethod::CreditCard,
        shipping_address: address(),
        billing_address: None,
        delivery_instructions: Some("Leave at the door".to_string()),
        notes: None,
    }
}

pub(crate) fn subscription_request(
    plan: SubscriptionPlan,
    lines: &[(ProductUuid, u32)],
    max_orders: Option<u32>,
) -> SubscriptionRequest {
    SubscriptionRequest {
        plan,
        items: lines
            .iter()
            .map(|&(product, quantity)| SubscriptionLine { product, quantity })
            .collect(),
        shipping_address: address(),
        delivery_instructions: None,
        payment_method: PaymentMethod::Paypal,
        max_orders,
        notes: None,
    }
}
