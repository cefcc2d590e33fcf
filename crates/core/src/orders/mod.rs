//! Orders
//!
//! An order is a frozen snapshot of what was bought plus two state machines: fulfilment
//! ([`OrderStatus`]) and payment ([`PaymentStatus`]). The monetary fields are copied from the
//! source cart or subscription and are authoritative from then on.

use std::{fmt, str::FromStr};

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    addresses::Address,
    calendar::{CalendarError, add_days},
    errors::{ErrorKind, ParseEnumError},
    pricing::{Amount, PricingError, Totals, line_total, sum},
    products::ProductUuid,
    subscriptions::SubscriptionUuid,
    users::UserUuid,
    uuids::TypedUuid,
};

mod number;
mod status;

pub use number::OrderNumber;
pub use status::{OrderStatus, PaymentStatus};

/// Order UUID
pub type OrderUuid = TypedUuid<Order>;

/// Days between placing an order and its estimated delivery.
pub const ESTIMATED_DELIVERY_DAYS: u32 = 4;

/// Errors raised by order transitions. The order is unchanged whenever one is returned.
#[derive(Debug, Error, PartialEq)]
pub enum OrderError {
    /// An order needs at least one item.
    #[error("order has no items")]
    NoItems,

    /// The fulfilment table does not allow this move.
    #[error("cannot move order from {from} to {to}")]
    IllegalTransition {
        /// Current status
        from: OrderStatus,
        /// Requested status
        to: OrderStatus,
    },

    /// The payment table does not allow this move.
    #[error("cannot move payment from {from} to {to}")]
    IllegalPaymentTransition {
        /// Current status
        from: PaymentStatus,
        /// Requested status
        to: PaymentStatus,
    },

    /// The owner tried to cancel after the order left pending/confirmed.
    #[error("order cannot be cancelled at this stage")]
    NotCancellable(OrderStatus),

    /// Refund amounts must be non-negative and in the order's currency.
    #[error("refund amount {0} is not valid for this order")]
    InvalidRefund(Amount),

    /// Estimated delivery could not be computed.
    #[error(transparent)]
    Calendar(#[from] CalendarError),

    /// Wrapped pricing error.
    #[error(transparent)]
    Pricing(#[from] PricingError),
}

impl OrderError {
    /// Classify the error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NoItems | Self::InvalidRefund(_) => ErrorKind::Validation,
            Self::IllegalTransition { .. }
            | Self::IllegalPaymentTransition { .. }
            | Self::NotCancellable(_) => ErrorKind::Conflict,
            Self::Calendar(_) | Self::Pricing(_) => ErrorKind::Computation,
        }
    }
}

/// How the customer pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaymentMethod {
    /// Credit card
    CreditCard,
    /// Debit card
    DebitCard,
    /// `PayPal`
    Paypal,
    /// Apple Pay
    ApplePay,
    /// Google Pay
    GooglePay,
}

impl PaymentMethod {
    /// Every method.
    pub const ALL: [Self; 5] = [
        Self::CreditCard,
        Self::DebitCard,
        Self::Paypal,
        Self::ApplePay,
        Self::GooglePay,
    ];

    /// Kebab-case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreditCard => "credit-card",
            Self::DebitCard => "debit-card",
            Self::Paypal => "paypal",
            Self::ApplePay => "apple-pay",
            Self::GooglePay => "google-pay",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|method| method.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseEnumError::new("payment method", s))
    }
}

/// A line on an order, with the product name captured when the order was placed.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderItem {
    product: ProductUuid,
    name: String,
    quantity: u32,
    unit_price: Amount,
    total_price: Amount,
}

impl OrderItem {
    /// Snapshot a line.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::LineOverflow`] if the line total does not fit.
    pub fn new(
        product: ProductUuid,
        name: impl Into<String>,
        quantity: u32,
        unit_price: Amount,
    ) -> Result<Self, PricingError> {
        Ok(Self {
            product,
            name: name.into(),
            quantity,
            unit_price,
            total_price: line_total(unit_price, quantity)?,
        })
    }

    /// Product id
    pub fn product(&self) -> ProductUuid {
        self.product
    }

    /// Product name at order time
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Quantity
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Unit price
    pub fn unit_price(&self) -> Amount {
        self.unit_price
    }

    /// `quantity × unit_price`
    pub fn total_price(&self) -> Amount {
        self.total_price
    }
}

/// Refund recorded against an order.
#[derive(Debug, Clone, PartialEq)]
pub struct Refund {
    /// Amount returned
    pub amount: Amount,

    /// Reason given
    pub reason: Option<String>,

    /// When the refund was processed
    pub refunded_at: Timestamp,
}

/// Everything needed to place an order.
#[derive(Debug, Clone)]
pub struct NewOrder {
    /// Order id
    pub uuid: OrderUuid,

    /// Buyer
    pub owner: UserUuid,

    /// Display number
    pub order_number: OrderNumber,

    /// Lines
    pub items: Vec<OrderItem>,

    /// Monetary fields, copied verbatim
    pub totals: Totals,

    /// Applied coupon code
    pub coupon_code: Option<String>,

    /// Payment method
    pub payment_method: PaymentMethod,

    /// Where to ship
    pub shipping_address: Address,

    /// Where to bill; the shipping address when absent
    pub billing_address: Option<Address>,

    /// Courier instructions
    pub delivery_instructions: Option<String>,

    /// Free-form notes
    pub notes: Option<String>,

    /// Subscription that produced the order
    pub subscription: Option<SubscriptionUuid>,
}

/// What a customer sees when tracking an order.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderTracking {
    /// Order number
    pub order_number: OrderNumber,

    /// Fulfilment status
    pub status: OrderStatus,

    /// Estimated delivery
    pub estimated_delivery: Option<Timestamp>,

    /// Actual delivery
    pub actual_delivery: Option<Timestamp>,

    /// Courier tracking number
    pub tracking_number: Option<String>,

    /// Shipping address
    pub shipping_address: Address,
}

/// A placed order.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    uuid: OrderUuid,
    owner: UserUuid,
    number: OrderNumber,
    items: Vec<OrderItem>,
    totals: Totals,
    coupon_code: Option<String>,
    status: OrderStatus,
    payment_status: PaymentStatus,
    payment_method: PaymentMethod,
    shipping_address: Address,
    billing_address: Address,
    delivery_instructions: Option<String>,
    estimated_delivery: Option<Timestamp>,
    actual_delivery: Option<Timestamp>,
    tracking_number: Option<String>,
    notes: Option<String>,
    subscription: Option<SubscriptionUuid>,
    refund: Option<Refund>,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl Order {
    /// Place an order: both statuses pending, estimated delivery [`ESTIMATED_DELIVERY_DAYS`] out.
    ///
    /// # Errors
    ///
    /// - [`OrderError::NoItems`]: `new.items` is empty.
    /// - [`OrderError::Calendar`]: the delivery estimate is out of range.
    pub fn place(new: NewOrder, now: Timestamp) -> Result<Self, OrderError> {
        if new.items.is_empty() {
            return Err(OrderError::NoItems);
        }

        let estimated_delivery = add_days(now, ESTIMATED_DELIVERY_DAYS)?;
        let billing_address = new
            .billing_address
            .unwrap_or_else(|| new.shipping_address.clone());

        Ok(Self {
            uuid: new.uuid,
            owner: new.owner,
            number: new.order_number,
            items: new.items,
            totals: new.totals,
            coupon_code: new.coupon_code,
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Pending,
            payment_method: new.payment_method,
            shipping_address: new.shipping_address,
            billing_address,
            delivery_instructions: new.delivery_instructions,
            estimated_delivery: Some(estimated_delivery),
            actual_delivery: None,
            tracking_number: None,
            notes: new.notes,
            subscription: new.subscription,
            refund: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Order id
    pub fn uuid(&self) -> OrderUuid {
        self.uuid
    }

    /// Buyer
    pub fn owner(&self) -> UserUuid {
        self.owner
    }

    /// Display number
    pub fn order_number(&self) -> &OrderNumber {
        &self.number
    }

    /// Lines
    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    /// Monetary fields
    pub fn totals(&self) -> &Totals {
        &self.totals
    }

    /// Subtotal
    pub fn subtotal(&self) -> Amount {
        self.totals.subtotal
    }

    /// Grand total
    pub fn total(&self) -> Amount {
        self.totals.total
    }

    /// Applied coupon code
    pub fn coupon_code(&self) -> Option<&str> {
        self.coupon_code.as_deref()
    }

    /// Fulfilment status
    pub fn status(&self) -> OrderStatus {
        self.status
    }

    /// Payment status
    pub fn payment_status(&self) -> PaymentStatus {
        self.payment_status
    }

    /// Payment method
    pub fn payment_method(&self) -> PaymentMethod {
        self.payment_method
    }

    /// Shipping address
    pub fn shipping_address(&self) -> &Address {
        &self.shipping_address
    }

    /// Billing address
    pub fn billing_address(&self) -> &Address {
        &self.billing_address
    }

    /// Courier instructions
    pub fn delivery_instructions(&self) -> Option<&str> {
        self.delivery_instructions.as_deref()
    }

    /// Estimated delivery
    pub fn estimated_delivery(&self) -> Option<Timestamp> {
        self.estimated_delivery
    }

    /// When the order was delivered
    pub fn actual_delivery(&self) -> Option<Timestamp> {
        self.actual_delivery
    }

    /// Courier tracking number
    pub fn tracking_number(&self) -> Option<&str> {
        self.tracking_number.as_deref()
    }

    /// Notes
    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    /// Subscription that produced the order
    pub fn subscription(&self) -> Option<SubscriptionUuid> {
        self.subscription
    }

    /// Whether a subscription produced the order.
    pub fn is_subscription_order(&self) -> bool {
        self.subscription.is_some()
    }

    /// Recorded refund
    pub fn refund(&self) -> Option<&Refund> {
        self.refund.as_ref()
    }

    /// Placement time
    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// Last change
    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    /// Tracking view of the order.
    pub fn tracking(&self) -> OrderTracking {
        OrderTracking {
            order_number: self.number.clone(),
            status: self.status,
            estimated_delivery: self.estimated_delivery,
            actual_delivery: self.actual_delivery,
            tracking_number: self.tracking_number.clone(),
            shipping_address: self.shipping_address.clone(),
        }
    }

    /// Replace the order number, for when the store reports a collision before the order is
    /// persisted.
    pub fn renumber(&mut self, order_number: OrderNumber) {
        self.number = order_number;
    }

    /// Move to `next`. Entering [`OrderStatus::Delivered`] stamps the actual delivery time.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::IllegalTransition`] if the table does not allow the move.
    pub fn update_status(&mut self, next: OrderStatus, now: Timestamp) -> Result<(), OrderError> {
        self.ensure_transition(next)?;

        self.status = next;

        if next == OrderStatus::Delivered {
            self.actual_delivery = Some(now);
        }

        self.updated_at = now;

        Ok(())
    }

    /// Record the courier's tracking number. The status is unchanged.
    pub fn add_tracking(&mut self, tracking_number: impl Into<String>, now: Timestamp) {
        self.tracking_number = Some(tracking_number.into());
        self.updated_at = now;
    }

    /// Refund the order: both statuses move to refunded.
    ///
    /// # Errors
    ///
    /// - [`OrderError::InvalidRefund`]: the amount is negative or in another currency.
    /// - [`OrderError::IllegalTransition`] / [`OrderError::IllegalPaymentTransition`]: either
    ///   status cannot move to refunded.
    pub fn process_refund(
        &mut self,
        amount: Amount,
        reason: Option<String>,
        now: Timestamp,
    ) -> Result<(), OrderError> {
        if amount.to_minor_units() < 0 || amount.currency() != self.totals.currency() {
            return Err(OrderError::InvalidRefund(amount));
        }

        self.ensure_transition(OrderStatus::Refunded)?;
        self.ensure_payment_transition(PaymentStatus::Refunded)?;

        self.status = OrderStatus::Refunded;
        self.payment_status = PaymentStatus::Refunded;
        self.refund = Some(Refund {
            amount,
            reason,
            refunded_at: now,
        });
        self.updated_at = now;

        Ok(())
    }

    /// Owner-initiated cancellation, allowed only while pending or confirmed. Overwrites the
    /// notes with the reason.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::NotCancellable`] once the order is processing or later.
    pub fn cancel(&mut self, reason: Option<&str>, now: Timestamp) -> Result<(), OrderError> {
        if !self.status.is_cancellable() {
            return Err(OrderError::NotCancellable(self.status));
        }

        self.status = OrderStatus::Cancelled;
        self.notes = Some(match reason.map(str::trim).filter(|reason| !reason.is_empty()) {
            Some(reason) => format!("Cancelled: {reason}"),
            None => "Cancelled by user".to_string(),
        });
        self.updated_at = now;

        Ok(())
    }

    /// Recompute subtotal and total from the items, keeping the stored adjustments and coupon
    /// discount. Only for administrative correction.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::Pricing`] on overflow or currency mismatch.
    pub fn calculate_totals(&mut self, now: Timestamp) -> Result<(), OrderError> {
        let subtotal = sum(
            self.totals.currency(),
            self.items.iter().map(OrderItem::total_price),
        )?;

        self.totals = Totals::from_parts(
            subtotal,
            self.totals.adjustments(),
            self.totals.coupon_discount,
        )?;
        self.updated_at = now;

        Ok(())
    }

    /// Record a successful charge.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::IllegalPaymentTransition`] unless pending or failed.
    pub fn mark_paid(&mut self, now: Timestamp) -> Result<(), OrderError> {
        self.set_payment_status(PaymentStatus::Paid, now)
    }

    /// Record a declined charge.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::IllegalPaymentTransition`] unless pending.
    pub fn mark_payment_failed(&mut self, now: Timestamp) -> Result<(), OrderError> {
        self.set_payment_status(PaymentStatus::Failed, now)
    }

    fn set_payment_status(
        &mut self,
        next: PaymentStatus,
        now: Timestamp,
    ) -> Result<(), OrderError> {
        self.ensure_payment_transition(next)?;

        self.payment_status = next;
        self.updated_at = now;

        Ok(())
    }

    fn ensure_transition(&self, next: OrderStatus) -> Result<(), OrderError> {
        if self.status.can_transition_to(next) {
            Ok(())
        } else {
            Err(OrderError::IllegalTransition {
                from: self.status,
                to: next,
            })
        }
    }

    fn ensure_payment_transition(&self, next: PaymentStatus) -> Result<(), OrderError> {
        if self.payment_status.can_transition_to(next) {
            Ok(())
        } else {
            Err(OrderError::IllegalPaymentTransition {
                from: self.payment_status,
                to: next,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::{
        Money,
        iso::{GBP, USD},
    };
    use testresult::TestResult;

    use crate::pricing::{Adjustments, zero};

    use super::*;

    fn gbp(minor: i64) -> Amount {
        Money::from_minor(minor, GBP)
    }

    fn placed_at() -> Result<Timestamp, jiff::Error> {
        "2026-05-04T12:00:00Z".parse()
    }

    fn order() -> Result<Order, Box<dyn std::error::Error>> {
        let items = vec![
            OrderItem::new(ProductUuid::new(), "Whey Protein", 2, gbp(10_00))?,
            OrderItem::new(ProductUuid::new(), "Oat Bar", 1, gbp(5_00))?,
        ];

        let totals = Totals::from_parts(gbp(25_00), Adjustments::none(GBP), zero(GBP))?;

        let order = Order::place(
            NewOrder {
                uuid: OrderUuid::new(),
                owner: UserUuid::new(),
                order_number: "NC123456789".parse()?,
                items,
                totals,
                coupon_code: None,
                payment_method: PaymentMethod::CreditCard,
                shipping_address: Address::default(),
                billing_address: None,
                delivery_instructions: None,
                notes: Some("leave with neighbour".to_string()),
                subscription: None,
            },
            placed_at()?,
        )?;

        Ok(order)
    }

    #[test]
    fn place_starts_pending_with_delivery_estimate() -> TestResult {
        let order = order()?;

        assert_eq!(order.status(), OrderStatus::Pending);
        assert_eq!(order.payment_status(), PaymentStatus::Pending);
        assert_eq!(
            order.estimated_delivery(),
            Some("2026-05-08T12:00:00Z".parse()?)
        );
        assert_eq!(order.actual_delivery(), None);
        assert_eq!(order.billing_address(), order.shipping_address());
        assert!(!order.is_subscription_order());

        Ok(())
    }

    #[test]
    fn renumber_replaces_number_seen_by_tracking() -> TestResult {
        let mut order = order()?;

        assert_eq!(order.order_number().as_str(), "NC123456789");

        order.renumber("NC987654321".parse()?);

        assert_eq!(order.order_number().as_str(), "NC987654321");
        assert_eq!(order.tracking().order_number.as_str(), "NC987654321");

        Ok(())
    }

    #[test]
    fn place_rejects_empty_items() -> TestResult {
        let result = Order::place(
            NewOrder {
                uuid: OrderUuid::new(),
                owner: UserUuid::new(),
                order_number: "NC000000000".parse()?,
                items: Vec::new(),
                totals: Totals::zero(GBP),
                coupon_code: None,
                payment_method: PaymentMethod::Paypal,
                shipping_address: Address::default(),
                billing_address: None,
                delivery_instructions: None,
                notes: None,
                subscription: None,
            },
            placed_at()?,
        );

        assert_eq!(result, Err(OrderError::NoItems));

        Ok(())
    }

    #[test]
    fn delivered_stamps_actual_delivery() -> TestResult {
        let mut order = order()?;
        let delivered_at: Timestamp = "2026-05-07T09:15:00Z".parse()?;

        for status in [
            OrderStatus::Confirmed,
            OrderStatus::Processing,
            OrderStatus::Shipped,
        ] {
            order.update_status(status, placed_at()?)?;
        }

        assert_eq!(order.actual_delivery(), None);

        order.update_status(OrderStatus::Delivered, delivered_at)?;

        assert_eq!(order.actual_delivery(), Some(delivered_at));

        Ok(())
    }

    #[test]
    fn illegal_transition_is_rejected() -> TestResult {
        let mut order = order()?;

        assert_eq!(
            order.update_status(OrderStatus::Delivered, Timestamp::now()),
            Err(OrderError::IllegalTransition {
                from: OrderStatus::Pending,
                to: OrderStatus::Delivered,
            })
        );
        assert_eq!(order.status(), OrderStatus::Pending);

        Ok(())
    }

    #[test]
    fn tracking_does_not_change_status() -> TestResult {
        let mut order = order()?;

        order.add_tracking("RM123456789GB", Timestamp::now());

        assert_eq!(order.tracking_number(), Some("RM123456789GB"));
        assert_eq!(order.status(), OrderStatus::Pending);
        assert_eq!(
            order.tracking().tracking_number.as_deref(),
            Some("RM123456789GB")
        );

        Ok(())
    }

    #[test]
    fn refund_moves_both_statuses() -> TestResult {
        let mut order = order()?;

        order.mark_paid(Timestamp::now())?;
        order.process_refund(gbp(25_00), Some("damaged".to_string()), Timestamp::now())?;

        assert_eq!(order.status(), OrderStatus::Refunded);
        assert_eq!(order.payment_status(), PaymentStatus::Refunded);
        assert_eq!(order.refund().map(|refund| refund.amount), Some(gbp(25_00)));

        Ok(())
    }

    #[test]
    fn refund_of_refunded_order_is_rejected() -> TestResult {
        let mut order = order()?;

        order.process_refund(gbp(1_00), None, Timestamp::now())?;

        let result = order.process_refund(gbp(1_00), None, Timestamp::now());

        assert!(
            matches!(result, Err(OrderError::IllegalTransition { .. })),
            "got {result:?}"
        );

        Ok(())
    }

    #[test]
    fn refund_rejects_negative_or_foreign_amounts() -> TestResult {
        let mut order = order()?;

        assert_eq!(
            order.process_refund(gbp(-1), None, Timestamp::now()),
            Err(OrderError::InvalidRefund(gbp(-1)))
        );

        let dollars = Money::from_minor(1_00, USD);

        assert_eq!(
            order.process_refund(dollars, None, Timestamp::now()),
            Err(OrderError::InvalidRefund(dollars))
        );
        assert_eq!(order.status(), OrderStatus::Pending);

        Ok(())
    }

    #[test]
    fn refund_with_failed_payment_leaves_order_untouched() -> TestResult {
        let mut order = order()?;

        order.mark_payment_failed(Timestamp::now())?;

        let result = order.process_refund(gbp(1_00), None, Timestamp::now());

        assert_eq!(
            result,
            Err(OrderError::IllegalPaymentTransition {
                from: PaymentStatus::Failed,
                to: PaymentStatus::Refunded,
            })
        );
        assert_eq!(order.status(), OrderStatus::Pending);
        assert_eq!(order.refund(), None);

        Ok(())
    }

    #[test]
    fn cancel_records_reason() -> TestResult {
        let mut order = order()?;

        order.cancel(Some("changed my mind"), Timestamp::now())?;

        assert_eq!(order.status(), OrderStatus::Cancelled);
        assert_eq!(order.notes(), Some("Cancelled: changed my mind"));

        Ok(())
    }

    #[test]
    fn cancel_without_reason() -> TestResult {
        let mut order = order()?;

        order.update_status(OrderStatus::Confirmed, Timestamp::now())?;
        order.cancel(None, Timestamp::now())?;

        assert_eq!(order.notes(), Some("Cancelled by user"));

        Ok(())
    }

    #[test]
    fn cancel_after_processing_is_rejected() -> TestResult {
        let mut order = order()?;

        order.update_status(OrderStatus::Processing, Timestamp::now())?;

        let result = order.cancel(Some("too slow"), Timestamp::now());

        assert_eq!(
            result,
            Err(OrderError::NotCancellable(OrderStatus::Processing))
        );
        assert_eq!(
            result.map_err(|error| error.to_string()),
            Err("order cannot be cancelled at this stage".to_string())
        );
        assert_eq!(order.notes(), Some("leave with neighbour"));

        Ok(())
    }

    #[test]
    fn failed_payment_can_be_retried() -> TestResult {
        let mut order = order()?;

        order.mark_payment_failed(Timestamp::now())?;
        order.mark_paid(Timestamp::now())?;

        assert_eq!(order.payment_status(), PaymentStatus::Paid);
        assert!(order.mark_payment_failed(Timestamp::now()).is_err());

        Ok(())
    }

    #[test]
    fn calculate_totals_recomputes_from_items() -> TestResult {
        let mut order = order()?;

        order.totals.subtotal = gbp(1);
        order.totals.total = gbp(1);
        order.calculate_totals(Timestamp::now())?;

        assert_eq!(order.subtotal(), gbp(25_00));
        assert_eq!(order.total(), gbp(25_00));

        Ok(())
    }

    #[test]
    fn payment_methods_parse_kebab_case() -> TestResult {
        assert_eq!(
            "apple-pay".parse::<PaymentMethod>()?,
            PaymentMethod::ApplePay
        );
        assert_eq!(PaymentMethod::Paypal.to_string(), "paypal");
        assert!("cash".parse::<PaymentMethod>().is_err());

        Ok(())
    }
}
