//! Orders Data

use nutrishop::orders::{Order, OrderStatus};

/// Default page size for order listings.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Order listing filter and page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderQuery {
    /// Only orders in this status
    pub status: Option<OrderStatus>,

    /// One-based page number
    pub page: usize,

    /// Orders per page
    pub limit: usize,
}

impl Default for OrderQuery {
    fn default() -> Self {
        Self {
            status: None,
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

/// One page of an owner's orders, newest first.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderPage {
    pub orders: Vec<Order>,
    pub current: usize,
    pub total: usize,
    pub has_next: bool,
    pub has_prev: bool,
}

impl OrderPage {
    /// Slice `orders`, already filtered and sorted, into the requested page.
    pub(crate) fn paginate(orders: Vec<Order>, page: usize, limit: usize) -> Self {
        let total = orders.len().div_ceil(limit);
        let start = page.saturating_sub(1).saturating_mul(limit);

        let orders = orders.into_iter().skip(start).take(limit).collect();

        Self {
            orders,
            current: page,
            total,
            has_next: page < total,
            has_prev: page > 1,
        }
    }
}
