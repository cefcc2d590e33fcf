//! Order number allocation.

use jiff::Timestamp;
use mockall::automock;
use nutrishop::orders::{Order, OrderNumber};
use tracing::warn;

use crate::store::{Store, StoreError};

/// How many numbers are tried before an insert gives up.
pub const MAX_ORDER_NUMBER_ATTEMPTS: u32 = 5;

/// Source of candidate order numbers.
#[automock]
pub trait OrderNumbers: Send + Sync {
    /// A fresh candidate for an order placed at `now`. Uniqueness is checked on insert.
    fn next(&self, now: Timestamp) -> OrderNumber;
}

/// Timestamp digits plus a random suffix.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomOrderNumbers;

impl OrderNumbers for RandomOrderNumbers {
    fn next(&self, now: Timestamp) -> OrderNumber {
        OrderNumber::generate(now, &mut rand::thread_rng())
    }
}

/// Store an order, drawing a new number whenever the current one is taken.
///
/// # Errors
///
/// Returns [`StoreError::Duplicate`] once [`MAX_ORDER_NUMBER_ATTEMPTS`] numbers have collided.
pub(crate) async fn insert_order(
    store: &Store,
    numbers: &dyn OrderNumbers,
    mut order: Order,
    now: Timestamp,
) -> Result<Order, StoreError> {
    let mut attempt = 1;

    loop {
        match store.insert_order(order.clone()).await {
            Ok(()) => return Ok(order),
            Err(StoreError::Duplicate) if attempt < MAX_ORDER_NUMBER_ATTEMPTS => {
                warn!(
                    order_number = %order.order_number(),
                    attempt,
                    "order number taken, retrying"
                );

                attempt += 1;
                order.renumber(numbers.next(now));
            }
            Err(error) => return Err(error),
        }
    }
}
