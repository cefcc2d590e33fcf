//! Orders service.

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use nutrishop::{
    checkout::{CheckoutDetails, CheckoutError},
    orders::{Order, OrderError, OrderNumber, OrderStatus, OrderTracking, OrderUuid},
    pricing::Amount,
    products::{Product, ProductUuid},
    users::UserUuid,
};
use rustc_hash::FxHashMap;
use tracing::{Span, info};

use crate::{
    domain::{
        orders::{
            data::{OrderPage, OrderQuery},
            errors::OrdersServiceError,
            numbers::{self, OrderNumbers},
        },
        products::ProductsService,
    },
    store::Store,
};

#[derive(Clone)]
pub struct InMemoryOrdersService {
    store: Store,
    products: Arc<dyn ProductsService>,
    numbers: Arc<dyn OrderNumbers>,
}

impl fmt::Debug for InMemoryOrdersService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryOrdersService")
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

impl InMemoryOrdersService {
    #[must_use]
    pub fn new(
        store: Store,
        products: Arc<dyn ProductsService>,
        numbers: Arc<dyn OrderNumbers>,
    ) -> Self {
        Self {
            store,
            products,
            numbers,
        }
    }

    /// Apply `change` under the order's lock. With `owner` set, other owners' orders are
    /// reported as missing.
    async fn modify<F>(
        &self,
        uuid: OrderUuid,
        owner: Option<UserUuid>,
        change: F,
    ) -> Result<Order, OrdersServiceError>
    where
        F: FnOnce(&mut Order, Timestamp) -> Result<(), OrderError> + Send,
    {
        let document = self
            .store
            .orders()
            .document(uuid)
            .await
            .ok_or(OrdersServiceError::NotFound)?;

        let mut order = document.lock().await;

        if owner.is_some_and(|owner| owner != order.owner()) {
            return Err(OrdersServiceError::NotFound);
        }

        change(&mut *order, Timestamp::now())?;

        Span::current().record("order_status", tracing::field::display(order.status()));

        Ok(order.clone())
    }
}

#[async_trait]
impl OrdersService for InMemoryOrdersService {
    #[tracing::instrument(
        name = "orders.service.checkout",
        skip(self, details),
        fields(
            owner = %owner,
            order_uuid = tracing::field::Empty,
            order_number = tracing::field::Empty,
            item_count = tracing::field::Empty,
            total = tracing::field::Empty
        ),
        err
    )]
    async fn checkout(
        &self,
        owner: UserUuid,
        details: CheckoutDetails,
    ) -> Result<Order, OrdersServiceError> {
        let document = self
            .store
            .carts()
            .document(owner)
            .await
            .ok_or(CheckoutError::EmptyCart)?;

        let mut cart = document.lock().await;

        let mut catalog: FxHashMap<ProductUuid, Product> = FxHashMap::default();

        for item in cart.items() {
            let product = self
                .products
                .get_product(item.product())
                .await
                .map_err(|error| OrdersServiceError::from_catalog(item.product(), error))?;

            catalog.insert(product.uuid, product);
        }

        let now = Timestamp::now();
        let mut draft = cart.clone();

        let order = nutrishop::checkout::checkout(
            &mut draft,
            &catalog,
            details,
            self.numbers.next(now),
            now,
        )?;

        let order = numbers::insert_order(&self.store, self.numbers.as_ref(), order, now).await?;

        *cart = draft;

        let span = Span::current();

        span.record("order_uuid", tracing::field::display(order.uuid()));
        span.record(
            "order_number",
            tracing::field::display(order.order_number()),
        );
        span.record("item_count", order.items().len());
        span.record("total", tracing::field::display(order.total()));

        info!(order_uuid = %order.uuid(), order_number = %order.order_number(), "placed order");

        Ok(order)
    }

    async fn get_order(
        &self,
        owner: UserUuid,
        order: OrderUuid,
    ) -> Result<Order, OrdersServiceError> {
        self.store
            .orders()
            .get(order)
            .await
            .filter(|found| found.owner() == owner)
            .ok_or(OrdersServiceError::NotFound)
    }

    async fn list_orders(
        &self,
        owner: UserUuid,
        query: OrderQuery,
    ) -> Result<OrderPage, OrdersServiceError> {
        if query.page == 0 || query.limit == 0 {
            return Err(OrdersServiceError::InvalidPage);
        }

        let mut orders: Vec<Order> = self
            .store
            .orders()
            .values()
            .await
            .into_iter()
            .filter(|order| order.owner() == owner)
            .filter(|order| query.status.is_none_or(|status| order.status() == status))
            .collect();

        orders.sort_by(|a, b| {
            b.created_at()
                .cmp(&a.created_at())
                .then_with(|| b.uuid().cmp(&a.uuid()))
        });

        Ok(OrderPage::paginate(orders, query.page, query.limit))
    }

    async fn track_order(&self, number: OrderNumber) -> Result<OrderTracking, OrdersServiceError> {
        let uuid = self
            .store
            .order_by_number(&number)
            .await
            .ok_or(OrdersServiceError::NotFound)?;

        let order = self
            .store
            .orders()
            .get(uuid)
            .await
            .ok_or(OrdersServiceError::NotFound)?;

        Ok(order.tracking())
    }

    #[tracing::instrument(
        name = "orders.service.cancel_order",
        skip(self, reason),
        fields(owner = %owner, order_uuid = %order, order_status = tracing::field::Empty),
        err
    )]
    async fn cancel_order(
        &self,
        owner: UserUuid,
        order: OrderUuid,
        reason: Option<String>,
    ) -> Result<Order, OrdersServiceError> {
        let cancelled = self
            .modify(order, Some(owner), |current, now| {
                current.cancel(reason.as_deref(), now)
            })
            .await?;

        info!(order_uuid = %order, "cancelled order");

        Ok(cancelled)
    }

    #[tracing::instrument(
        name = "orders.service.update_status",
        skip(self),
        fields(order_uuid = %order, order_status = tracing::field::Empty),
        err
    )]
    async fn update_status(
        &self,
        order: OrderUuid,
        status: OrderStatus,
    ) -> Result<Order, OrdersServiceError> {
        let updated = self
            .modify(order, None, |current, now| {
                current.update_status(status, now)
            })
            .await?;

        info!(order_uuid = %order, status = %status, "updated order status");

        Ok(updated)
    }

    #[tracing::instrument(
        name = "orders.service.add_tracking",
        skip(self),
        fields(order_uuid = %order, order_status = tracing::field::Empty),
        err
    )]
    async fn add_tracking(
        &self,
        order: OrderUuid,
        tracking_number: String,
    ) -> Result<Order, OrdersServiceError> {
        let updated = self
            .modify(order, None, |current, now| {
                current.add_tracking(tracking_number, now);

                Ok(())
            })
            .await?;

        info!(order_uuid = %order, "added tracking number");

        Ok(updated)
    }

    #[tracing::instrument(
        name = "orders.service.process_refund",
        skip(self, reason),
        fields(order_uuid = %order, amount = %amount, order_status = tracing::field::Empty),
        err
    )]
    async fn process_refund(
        &self,
        order: OrderUuid,
        amount: Amount,
        reason: Option<String>,
    ) -> Result<Order, OrdersServiceError> {
        let refunded = self
            .modify(order, None, |current, now| {
                current.process_refund(amount, reason, now)
            })
            .await?;

        info!(order_uuid = %order, amount = %amount, "refunded order");

        Ok(refunded)
    }

    #[tracing::instrument(
        name = "orders.service.mark_paid",
        skip(self),
        fields(order_uuid = %order, order_status = tracing::field::Empty),
        err
    )]
    async fn mark_paid(&self, order: OrderUuid) -> Result<Order, OrdersServiceError> {
        let paid = self
            .modify(order, None, |current, now| current.mark_paid(now))
            .await?;

        info!(order_uuid = %order, "order paid");

        Ok(paid)
    }

    #[tracing::instrument(
        name = "orders.service.mark_payment_failed",
        skip(self),
        fields(order_uuid = %order, order_status = tracing::field::Empty),
        err
    )]
    async fn mark_payment_failed(&self, order: OrderUuid) -> Result<Order, OrdersServiceError> {
        let failed = self
            .modify(order, None, |current, now| current.mark_payment_failed(now))
            .await?;

        info!(order_uuid = %order, "order payment failed");

        Ok(failed)
    }

    #[tracing::instrument(
        name = "orders.service.recalculate_totals",
        skip(self),
        fields(order_uuid = %order, order_status = tracing::field::Empty),
        err
    )]
    async fn recalculate_totals(&self, order: OrderUuid) -> Result<Order, OrdersServiceError> {
        let updated = self
            .modify(order, None, |current, now| current.calculate_totals(now))
            .await?;

        info!(order_uuid = %order, total = %updated.total(), "recalculated order totals");

        Ok(updated)
    }
}

#[automock]
#[async_trait]
pub trait OrdersService: Send + Sync {
    /// Place an order from the owner's cart and clear the cart. On any error the cart is left
    /// as it was.
    async fn checkout(
        &self,
        owner: UserUuid,
        details: CheckoutDetails,
    ) -> Result<Order, OrdersServiceError>;

    /// Retrieve one of the owner's orders.
    async fn get_order(
        &self,
        owner: UserUuid,
        order: OrderUuid,
    ) -> Result<Order, OrdersServiceError>;

    /// List the owner's orders, newest first.
    async fn list_orders(
        &self,
        owner: UserUuid,
        query: OrderQuery,
    ) -> Result<OrderPage, OrdersServiceError>;

    /// Public tracking view by order number.
    async fn track_order(&self, number: OrderNumber) -> Result<OrderTracking, OrdersServiceError>;

    /// Owner-initiated cancellation.
    async fn cancel_order(
        &self,
        owner: UserUuid,
        order: OrderUuid,
        reason: Option<String>,
    ) -> Result<Order, OrdersServiceError>;

    /// Move an order along the fulfilment table.
    async fn update_status(
        &self,
        order: OrderUuid,
        status: OrderStatus,
    ) -> Result<Order, OrdersServiceError>;

    /// Record a courier tracking number.
    async fn add_tracking(
        &self,
        order: OrderUuid,
        tracking_number: String,
    ) -> Result<Order, OrdersServiceError>;

    /// Refund an order.
    async fn process_refund(
        &self,
        order: OrderUuid,
        amount: Amount,
        reason: Option<String>,
    ) -> Result<Order, OrdersServiceError>;

    /// Record a successful charge.
    async fn mark_paid(&self, order: OrderUuid) -> Result<Order, OrdersServiceError>;

    /// Record a declined charge.
    async fn mark_payment_failed(&self, order: OrderUuid) -> Result<Order, OrdersServiceError>;

    /// Recompute an order's subtotal and total from its items.
    async fn recalculate_totals(&self, order: OrderUuid) -> Result<Order, OrdersServiceError>;
}
