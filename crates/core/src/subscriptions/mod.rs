//! Subscriptions
//!
//! A subscription repeats a snapshotted basket on a fixed cadence. The next order date is derived
//! from the last order (or the start date) plus the plan frequency; it is only written by
//! creation, [`Subscription::calculate_next_order_date`] and the transitions that call it.
//!
//! Producing an order is split in two: the caller checks [`Subscription::should_process_order`]
//! and builds the order, then calls [`Subscription::process_order`] to advance the schedule. Both
//! steps must happen under the same document lock, so a retried sweep sees the advanced date.

use jiff::Timestamp;
use thiserror::Error;

use crate::{
    addresses::Address,
    calendar::{CalendarError, add_days},
    errors::ErrorKind,
    orders::PaymentMethod,
    pricing::{Amount, PricingError, line_total, sum},
    products::ProductUuid,
    users::UserUuid,
    uuids::TypedUuid,
};

mod plan;
mod status;

pub use plan::SubscriptionPlan;
pub use status::SubscriptionStatus;

/// Subscription UUID
pub type SubscriptionUuid = TypedUuid<Subscription>;

/// Errors raised by subscription transitions. The subscription is unchanged whenever one is
/// returned.
#[derive(Debug, Error, PartialEq)]
pub enum SubscriptionError {
    /// A subscription needs at least one item.
    #[error("subscription has no items")]
    NoItems,

    /// Item quantities must be at least one.
    #[error("quantity for product {0} must be at least 1")]
    InvalidQuantity(ProductUuid),

    /// An order cap of zero would never produce an order.
    #[error("max orders must be at least 1")]
    InvalidMaxOrders,

    /// The status table does not allow this move.
    #[error("cannot move subscription from {from} to {to}")]
    IllegalTransition {
        /// Current status
        from: SubscriptionStatus,
        /// Requested status
        to: SubscriptionStatus,
    },

    /// Replacement items are priced in another currency.
    #[error("items are priced in {actual}, but the subscription is in {expected}")]
    CurrencyMismatch {
        /// Subscription currency
        expected: &'static str,
        /// Currency of the new items
        actual: &'static str,
    },

    /// The operation needs an active subscription.
    #[error("subscription is {0}, not active")]
    NotActive(SubscriptionStatus),

    /// A date calculation overflowed.
    #[error(transparent)]
    Calendar(#[from] CalendarError),

    /// Wrapped pricing error.
    #[error(transparent)]
    Pricing(#[from] PricingError),
}

impl SubscriptionError {
    /// Classify the error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NoItems
            | Self::InvalidQuantity(_)
            | Self::InvalidMaxOrders
            | Self::CurrencyMismatch { .. } => ErrorKind::Validation,
            Self::IllegalTransition { .. } | Self::NotActive(_) => ErrorKind::Conflict,
            Self::Calendar(_) | Self::Pricing(_) => ErrorKind::Computation,
        }
    }
}

/// A product repeated on every order, priced when the subscription was set up.
#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionItem {
    /// Product
    pub product: ProductUuid,

    /// Quantity per order
    pub quantity: u32,

    /// Price per unit, snapshotted
    pub unit_price: Amount,
}

impl SubscriptionItem {
    /// `quantity × unit_price`
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::LineOverflow`] on overflow.
    pub fn total_price(&self) -> Result<Amount, PricingError> {
        line_total(self.unit_price, self.quantity)
    }
}

/// An owner-requested pause.
#[derive(Debug, Clone, PartialEq)]
pub struct PauseWindow {
    /// Reason given
    pub reason: Option<String>,

    /// When the pause began
    pub start: Timestamp,

    /// When the pause is meant to end; open-ended when absent
    pub end: Option<Timestamp>,
}

/// A recorded cancellation.
#[derive(Debug, Clone, PartialEq)]
pub struct Cancellation {
    /// Reason given
    pub reason: Option<String>,

    /// When it was cancelled
    pub cancelled_at: Timestamp,
}

/// Everything needed to start a subscription.
#[derive(Debug, Clone)]
pub struct NewSubscription {
    /// Subscription id
    pub uuid: SubscriptionUuid,

    /// Subscriber
    pub owner: UserUuid,

    /// Cadence
    pub plan: SubscriptionPlan,

    /// Basket repeated on every order
    pub items: Vec<SubscriptionItem>,

    /// Where to ship
    pub shipping_address: Address,

    /// Courier instructions
    pub delivery_instructions: Option<String>,

    /// How produced orders are paid
    pub payment_method: PaymentMethod,

    /// Order cap; unlimited when absent
    pub max_orders: Option<u32>,

    /// Free-form notes
    pub notes: Option<String>,
}

/// Recurring order schedule.
#[derive(Debug, Clone, PartialEq)]
pub struct Subscription {
    uuid: SubscriptionUuid,
    owner: UserUuid,
    plan: SubscriptionPlan,
    frequency_days: u32,
    status: SubscriptionStatus,
    start_date: Timestamp,
    next_order_date: Timestamp,
    end_date: Option<Timestamp>,
    items: Vec<SubscriptionItem>,
    total_amount: Amount,
    shipping_address: Address,
    delivery_instructions: Option<String>,
    payment_method: PaymentMethod,
    auto_renew: bool,
    max_orders: Option<u32>,
    current_order_count: u32,
    pause: Option<PauseWindow>,
    cancellation: Option<Cancellation>,
    last_order_date: Option<Timestamp>,
    next_order_number: u64,
    notes: Option<String>,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl Subscription {
    /// Start a subscription at `now`: active, first order one period from now.
    ///
    /// # Errors
    ///
    /// - [`SubscriptionError::NoItems`], [`SubscriptionError::InvalidQuantity`],
    ///   [`SubscriptionError::InvalidMaxOrders`]: malformed input.
    /// - [`SubscriptionError::Pricing`]: items in mixed currencies or overflowing totals.
    /// - [`SubscriptionError::Calendar`]: the first order date is out of range.
    pub fn new(new: NewSubscription, now: Timestamp) -> Result<Self, SubscriptionError> {
        if new.max_orders == Some(0) {
            return Err(SubscriptionError::InvalidMaxOrders);
        }

        let total_amount = total_amount(&new.items)?;
        let frequency_days = new.plan.frequency_days();
        let next_order_date = add_days(now, frequency_days)?;

        Ok(Self {
            uuid: new.uuid,
            owner: new.owner,
            plan: new.plan,
            frequency_days,
            status: SubscriptionStatus::Active,
            start_date: now,
            next_order_date,
            end_date: None,
            items: new.items,
            total_amount,
            shipping_address: new.shipping_address,
            delivery_instructions: new.delivery_instructions,
            payment_method: new.payment_method,
            auto_renew: true,
            max_orders: new.max_orders,
            current_order_count: 0,
            pause: None,
            cancellation: None,
            last_order_date: None,
            next_order_number: 1,
            notes: new.notes,
            created_at: now,
            updated_at: now,
        })
    }

    /// Subscription id
    pub fn uuid(&self) -> SubscriptionUuid {
        self.uuid
    }

    /// Subscriber
    pub fn owner(&self) -> UserUuid {
        self.owner
    }

    /// Cadence
    pub fn plan(&self) -> SubscriptionPlan {
        self.plan
    }

    /// Days between orders
    pub fn frequency_days(&self) -> u32 {
        self.frequency_days
    }

    /// Lifecycle status
    pub fn status(&self) -> SubscriptionStatus {
        self.status
    }

    /// When the subscription started
    pub fn start_date(&self) -> Timestamp {
        self.start_date
    }

    /// When the next order is due
    pub fn next_order_date(&self) -> Timestamp {
        self.next_order_date
    }

    /// When the subscription expired
    pub fn end_date(&self) -> Option<Timestamp> {
        self.end_date
    }

    /// Basket repeated on every order
    pub fn items(&self) -> &[SubscriptionItem] {
        &self.items
    }

    /// `Σ quantity × unit_price`
    pub fn total_amount(&self) -> Amount {
        self.total_amount
    }

    /// Where to ship
    pub fn shipping_address(&self) -> &Address {
        &self.shipping_address
    }

    /// Courier instructions
    pub fn delivery_instructions(&self) -> Option<&str> {
        self.delivery_instructions.as_deref()
    }

    /// How produced orders are paid
    pub fn payment_method(&self) -> PaymentMethod {
        self.payment_method
    }

    /// Whether the subscription renews
    pub fn auto_renew(&self) -> bool {
        self.auto_renew
    }

    /// Order cap
    pub fn max_orders(&self) -> Option<u32> {
        self.max_orders
    }

    /// Orders produced so far
    pub fn current_order_count(&self) -> u32 {
        self.current_order_count
    }

    /// Current pause, if paused
    pub fn pause_window(&self) -> Option<&PauseWindow> {
        self.pause.as_ref()
    }

    /// Recorded cancellation
    pub fn cancellation(&self) -> Option<&Cancellation> {
        self.cancellation.as_ref()
    }

    /// When the last order was produced
    pub fn last_order_date(&self) -> Option<Timestamp> {
        self.last_order_date
    }

    /// Sequence number the next produced order will carry, starting at 1
    pub fn next_order_number(&self) -> u64 {
        self.next_order_number
    }

    /// Notes
    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    /// Creation time
    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// Last change
    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    /// Whether the order cap has been reached.
    pub fn reached_max_orders(&self) -> bool {
        self.max_orders
            .is_some_and(|max| self.current_order_count >= max)
    }

    /// Derive the next order date as the last order (or start) plus one period.
    ///
    /// Does nothing unless active and unpaused. Calling it twice gives the same date.
    ///
    /// # Errors
    ///
    /// Returns [`SubscriptionError::Calendar`] if the date is out of range.
    pub fn calculate_next_order_date(&mut self) -> Result<Timestamp, SubscriptionError> {
        if self.status == SubscriptionStatus::Active && self.pause.is_none() {
            let from = self.last_order_date.unwrap_or(self.start_date);

            self.next_order_date = add_days(from, self.frequency_days)?;
        }

        Ok(self.next_order_date)
    }

    /// Pause an active subscription. The next order date is left as it was.
    ///
    /// # Errors
    ///
    /// Returns [`SubscriptionError::IllegalTransition`] unless active.
    pub fn pause(
        &mut self,
        reason: Option<String>,
        end: Option<Timestamp>,
        now: Timestamp,
    ) -> Result<(), SubscriptionError> {
        if self.status != SubscriptionStatus::Active {
            return Err(self.illegal(SubscriptionStatus::Paused));
        }

        self.status = SubscriptionStatus::Paused;
        self.pause = Some(PauseWindow {
            reason,
            start: now,
            end,
        });
        self.updated_at = now;

        Ok(())
    }

    /// Resume a paused subscription and re-derive the next order date from the last order. Time
    /// spent paused is not added back.
    ///
    /// # Errors
    ///
    /// - [`SubscriptionError::IllegalTransition`]: not paused.
    /// - [`SubscriptionError::Calendar`]: the next order date is out of range.
    pub fn resume(&mut self, now: Timestamp) -> Result<(), SubscriptionError> {
        if self.status != SubscriptionStatus::Paused {
            return Err(self.illegal(SubscriptionStatus::Active));
        }

        let mut draft = self.clone();

        draft.status = SubscriptionStatus::Active;
        draft.pause = None;
        draft.calculate_next_order_date()?;
        draft.updated_at = now;

        *self = draft;

        Ok(())
    }

    /// Cancel an active or paused subscription. Turns off auto-renew.
    ///
    /// # Errors
    ///
    /// Returns [`SubscriptionError::IllegalTransition`] when already cancelled or expired.
    pub fn cancel(
        &mut self,
        reason: Option<String>,
        now: Timestamp,
    ) -> Result<(), SubscriptionError> {
        if !self.status.can_transition_to(SubscriptionStatus::Cancelled) {
            return Err(self.illegal(SubscriptionStatus::Cancelled));
        }

        self.status = SubscriptionStatus::Cancelled;
        self.cancellation = Some(Cancellation {
            reason,
            cancelled_at: now,
        });
        self.auto_renew = false;
        self.updated_at = now;

        Ok(())
    }

    /// Whether an order is due at `now`.
    ///
    /// False unless active, false inside a bounded pause window, false once the cap is reached,
    /// otherwise true when `now` has reached the next order date.
    pub fn should_process_order(&self, now: Timestamp) -> bool {
        if self.status != SubscriptionStatus::Active {
            return false;
        }

        let paused = self
            .pause
            .as_ref()
            .and_then(|pause| pause.end)
            .is_some_and(|end| now < end);

        if paused || self.reached_max_orders() {
            return false;
        }

        now >= self.next_order_date
    }

    /// Record that an order was produced at `now` and advance the schedule.
    ///
    /// Returns the sequence number the produced order carried. Reaching the cap expires the
    /// subscription without moving the next order date.
    ///
    /// # Errors
    ///
    /// - [`SubscriptionError::NotActive`]: not active.
    /// - [`SubscriptionError::Calendar`]: the next order date is out of range.
    pub fn process_order(&mut self, now: Timestamp) -> Result<u64, SubscriptionError> {
        if self.status != SubscriptionStatus::Active {
            return Err(SubscriptionError::NotActive(self.status));
        }

        let sequence = self.next_order_number;
        let mut draft = self.clone();

        draft.current_order_count = draft.current_order_count.saturating_add(1);
        draft.last_order_date = Some(now);
        draft.next_order_number = sequence.saturating_add(1);
        draft.updated_at = now;

        if draft.reached_max_orders() {
            draft.status = SubscriptionStatus::Expired;
            draft.end_date = Some(now);
        } else {
            draft.calculate_next_order_date()?;
        }

        *self = draft;

        Ok(sequence)
    }

    /// Replace the basket of an active subscription and recompute its total.
    ///
    /// # Errors
    ///
    /// - [`SubscriptionError::NotActive`]: not active.
    /// - [`SubscriptionError::NoItems`], [`SubscriptionError::InvalidQuantity`],
    ///   [`SubscriptionError::Pricing`]: malformed items.
    pub fn update_items(
        &mut self,
        items: Vec<SubscriptionItem>,
        now: Timestamp,
    ) -> Result<(), SubscriptionError> {
        if self.status != SubscriptionStatus::Active {
            return Err(SubscriptionError::NotActive(self.status));
        }

        let total = total_amount(&items)?;

        if total.currency() != self.total_amount.currency() {
            return Err(SubscriptionError::CurrencyMismatch {
                expected: self.total_amount.currency().iso_alpha_code,
                actual: total.currency().iso_alpha_code,
            });
        }

        self.items = items;
        self.total_amount = total;
        self.updated_at = now;

        Ok(())
    }

    fn illegal(&self, to: SubscriptionStatus) -> SubscriptionError {
        SubscriptionError::IllegalTransition {
            from: self.status,
            to,
        }
    }
}

fn total_amount(items: &[SubscriptionItem]) -> Result<Amount, SubscriptionError> {
    let first = items.first().ok_or(SubscriptionError::NoItems)?;

    if let Some(item) = items.iter().find(|item| item.quantity == 0) {
        return Err(SubscriptionError::InvalidQuantity(item.product));
    }

    let lines = items
        .iter()
        .map(SubscriptionItem::total_price)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(sum(first.unit_price.currency(), lines)?)
}

#[cfg(test)]
mod tests {
    use rusty_money::{Money, iso::GBP};
    use testresult::TestResult;

    use super::*;

    fn start() -> Result<Timestamp, jiff::Error> {
        "2026-01-01T08:00:00Z".parse()
    }

    fn days(from: Timestamp, count: u32) -> Result<Timestamp, CalendarError> {
        add_days(from, count)
    }

    fn item(quantity: u32, minor: i64) -> SubscriptionItem {
        SubscriptionItem {
            product: ProductUuid::new(),
            quantity,
            unit_price: Money::from_minor(minor, GBP),
        }
    }

    fn new_subscription(plan: SubscriptionPlan, max_orders: Option<u32>) -> NewSubscription {
        NewSubscription {
            uuid: SubscriptionUuid::new(),
            owner: UserUuid::new(),
            plan,
            items: vec![item(2, 12_50), item(1, 4_00)],
            shipping_address: Address::default(),
            delivery_instructions: None,
            payment_method: PaymentMethod::DebitCard,
            max_orders,
            notes: None,
        }
    }

    fn weekly(max_orders: Option<u32>) -> Result<Subscription, Box<dyn std::error::Error>> {
        Ok(Subscription::new(
            new_subscription(SubscriptionPlan::Weekly, max_orders),
            start()?,
        )?)
    }

    #[test]
    fn new_schedules_first_order_one_period_out() -> TestResult {
        let subscription = Subscription::new(
            new_subscription(SubscriptionPlan::Monthly, None),
            start()?,
        )?;

        assert_eq!(subscription.status(), SubscriptionStatus::Active);
        assert_eq!(subscription.frequency_days(), 30);
        assert_eq!(subscription.next_order_date(), days(start()?, 30)?);
        assert_eq!(subscription.total_amount(), Money::from_minor(29_00, GBP));
        assert_eq!(subscription.next_order_number(), 1);
        assert!(subscription.auto_renew());

        Ok(())
    }

    #[test]
    fn new_rejects_malformed_input() -> TestResult {
        let mut empty = new_subscription(SubscriptionPlan::Weekly, None);
        empty.items.clear();

        assert_eq!(
            Subscription::new(empty, start()?),
            Err(SubscriptionError::NoItems)
        );

        let mut zero = new_subscription(SubscriptionPlan::Weekly, None);
        let bad = item(0, 1_00);
        let bad_product = bad.product;
        zero.items.push(bad);

        assert_eq!(
            Subscription::new(zero, start()?),
            Err(SubscriptionError::InvalidQuantity(bad_product))
        );

        assert_eq!(
            Subscription::new(
                new_subscription(SubscriptionPlan::Weekly, Some(0)),
                start()?
            ),
            Err(SubscriptionError::InvalidMaxOrders)
        );

        Ok(())
    }

    #[test]
    fn calculate_next_order_date_is_idempotent() -> TestResult {
        let mut subscription = weekly(None)?;

        let first = subscription.calculate_next_order_date()?;
        let second = subscription.calculate_next_order_date()?;

        assert_eq!(first, second);
        assert_eq!(first, days(start()?, 7)?);

        Ok(())
    }

    #[test]
    fn should_process_once_due() -> TestResult {
        let subscription = weekly(None)?;

        assert!(!subscription.should_process_order(days(start()?, 6)?));
        assert!(subscription.should_process_order(days(start()?, 7)?));
        assert!(subscription.should_process_order(days(start()?, 20)?));

        Ok(())
    }

    #[test]
    fn process_order_advances_from_processing_time() -> TestResult {
        let mut subscription = weekly(None)?;
        let processed_at = days(start()?, 9)?;

        let sequence = subscription.process_order(processed_at)?;

        assert_eq!(sequence, 1);
        assert_eq!(subscription.next_order_number(), 2);
        assert_eq!(subscription.current_order_count(), 1);
        assert_eq!(subscription.last_order_date(), Some(processed_at));
        assert_eq!(subscription.next_order_date(), days(processed_at, 7)?);
        assert!(!subscription.should_process_order(processed_at));

        Ok(())
    }

    #[test]
    fn expires_exactly_on_the_cap() -> TestResult {
        let mut subscription = weekly(Some(3))?;

        for _ in 0..2 {
            let due = subscription.next_order_date();
            subscription.process_order(due)?;

            assert_eq!(subscription.status(), SubscriptionStatus::Active);
        }

        let third = subscription.next_order_date();

        subscription.process_order(third)?;

        assert_eq!(subscription.status(), SubscriptionStatus::Expired);
        assert_eq!(subscription.end_date(), Some(third));
        assert_eq!(subscription.next_order_date(), third);
        assert_eq!(subscription.current_order_count(), 3);
        assert!(!subscription.should_process_order(days(third, 100)?));
        assert_eq!(
            subscription.process_order(third),
            Err(SubscriptionError::NotActive(SubscriptionStatus::Expired))
        );

        Ok(())
    }

    #[test]
    fn paused_with_future_end_is_not_due_until_resumed() -> TestResult {
        let mut subscription = weekly(None)?;
        let paused_at = days(start()?, 3)?;
        let pause_end = days(start()?, 20)?;

        subscription.pause(Some("holiday".to_string()), Some(pause_end), paused_at)?;

        assert_eq!(
            subscription.pause_window(),
            Some(&PauseWindow {
                reason: Some("holiday".to_string()),
                start: paused_at,
                end: Some(pause_end),
            })
        );

        let overdue = days(start()?, 10)?;

        assert!(!subscription.should_process_order(overdue));
        assert_eq!(subscription.next_order_date(), days(start()?, 7)?);

        let after_end = days(start()?, 21)?;

        assert!(!subscription.should_process_order(after_end));

        subscription.resume(after_end)?;

        assert_eq!(subscription.status(), SubscriptionStatus::Active);
        assert_eq!(subscription.pause_window(), None);
        assert!(subscription.should_process_order(after_end));

        Ok(())
    }

    #[test]
    fn pause_and_resume_follow_the_table() -> TestResult {
        let mut subscription = weekly(None)?;

        assert_eq!(
            subscription.resume(start()?),
            Err(SubscriptionError::IllegalTransition {
                from: SubscriptionStatus::Active,
                to: SubscriptionStatus::Active,
            })
        );

        subscription.pause(None, None, start()?)?;

        assert_eq!(
            subscription.pause(None, None, start()?),
            Err(SubscriptionError::IllegalTransition {
                from: SubscriptionStatus::Paused,
                to: SubscriptionStatus::Paused,
            })
        );

        Ok(())
    }

    #[test]
    fn cancel_from_paused_turns_off_renewal() -> TestResult {
        let mut subscription = weekly(None)?;

        subscription.pause(None, None, start()?)?;
        subscription.cancel(Some("moving".to_string()), start()?)?;

        assert_eq!(subscription.status(), SubscriptionStatus::Cancelled);
        assert!(!subscription.auto_renew());
        assert_eq!(
            subscription
                .cancellation()
                .and_then(|c| c.reason.as_deref()),
            Some("moving")
        );

        Ok(())
    }

    #[test]
    fn cancel_twice_is_rejected() -> TestResult {
        let mut subscription = weekly(None)?;

        subscription.cancel(None, start()?)?;

        assert_eq!(
            subscription.cancel(None, start()?),
            Err(SubscriptionError::IllegalTransition {
                from: SubscriptionStatus::Cancelled,
                to: SubscriptionStatus::Cancelled,
            })
        );
        assert!(!subscription.should_process_order(days(start()?, 30)?));

        Ok(())
    }

    #[test]
    fn cancel_after_expiry_is_rejected() -> TestResult {
        let mut subscription = weekly(Some(1))?;

        subscription.process_order(days(start()?, 7)?)?;

        assert!(matches!(
            subscription.cancel(None, start()?),
            Err(SubscriptionError::IllegalTransition { .. })
        ));

        Ok(())
    }

    #[test]
    fn update_items_recomputes_total_while_active() -> TestResult {
        let mut subscription = weekly(None)?;

        subscription.update_items(vec![item(3, 2_00)], start()?)?;

        assert_eq!(subscription.total_amount(), Money::from_minor(6_00, GBP));
        assert_eq!(subscription.items().len(), 1);

        subscription.pause(None, None, start()?)?;

        assert_eq!(
            subscription.update_items(vec![item(1, 1_00)], start()?),
            Err(SubscriptionError::NotActive(SubscriptionStatus::Paused))
        );
        assert_eq!(subscription.total_amount(), Money::from_minor(6_00, GBP));

        Ok(())
    }

    #[test]
    fn update_items_rejects_empty_basket() -> TestResult {
        let mut subscription = weekly(None)?;

        assert_eq!(
            subscription.update_items(Vec::new(), start()?),
            Err(SubscriptionError::NoItems)
        );

        Ok(())
    }
}
