//! Subscriptions service.

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use nutrishop::{
    checkout::subscription_order,
    orders::Order,
    products::{Product, ProductError, ProductUuid},
    subscriptions::{
        NewSubscription, Subscription, SubscriptionError, SubscriptionItem, SubscriptionStatus,
        SubscriptionUuid,
    },
    users::UserUuid,
};
use rustc_hash::FxHashMap;
use tracing::{Span, info, warn};

use crate::{
    domain::{
        orders::{OrderNumbers, numbers},
        products::ProductsService,
        subscriptions::{
            data::{SubscriptionLine, SubscriptionRequest, SweepFailure, SweepReport},
            errors::SubscriptionsServiceError,
        },
    },
    store::{Document, Store},
};

#[derive(Clone)]
pub struct InMemorySubscriptionsService {
    store: Store,
    products: Arc<dyn ProductsService>,
    numbers: Arc<dyn OrderNumbers>,
}

impl fmt::Debug for InMemorySubscriptionsService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemorySubscriptionsService")
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

impl InMemorySubscriptionsService {
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

    async fn product(&self, product: ProductUuid) -> Result<Product, SubscriptionsServiceError> {
        self.products
            .get_product(product)
            .await
            .map_err(|error| SubscriptionsServiceError::from_catalog(product, error))
    }

    /// Price each line at the product's current final price.
    async fn price_lines(
        &self,
        lines: Vec<SubscriptionLine>,
    ) -> Result<Vec<SubscriptionItem>, SubscriptionsServiceError> {
        let mut items = Vec::with_capacity(lines.len());

        for line in lines {
            let product = self.product(line.product).await?;

            if !product.is_active {
                return Err(ProductError::Inactive(product.uuid).into());
            }

            items.push(SubscriptionItem {
                product: line.product,
                quantity: line.quantity,
                unit_price: product.final_price(),
            });
        }

        Ok(items)
    }

    async fn owned_document(
        &self,
        owner: UserUuid,
        uuid: SubscriptionUuid,
    ) -> Result<Document<Subscription>, SubscriptionsServiceError> {
        let document = self
            .store
            .subscriptions()
            .document(uuid)
            .await
            .ok_or(SubscriptionsServiceError::NotFound)?;

        if document.lock().await.owner() != owner {
            return Err(SubscriptionsServiceError::NotFound);
        }

        Ok(document)
    }

    async fn modify<F>(
        &self,
        owner: UserUuid,
        uuid: SubscriptionUuid,
        change: F,
    ) -> Result<Subscription, SubscriptionsServiceError>
    where
        F: FnOnce(&mut Subscription, Timestamp) -> Result<(), SubscriptionError> + Send,
    {
        let document = self.owned_document(owner, uuid).await?;
        let mut subscription = document.lock().await;

        change(&mut *subscription, Timestamp::now())?;

        Span::current().record(
            "subscription_status",
            tracing::field::display(subscription.status()),
        );

        Ok(subscription.clone())
    }

    /// Produce and store the next order for one subscription, then advance it. Re-checks that
    /// the subscription is due under its lock; returns `Ok(None)` when it is not.
    async fn process_one(
        &self,
        document: Document<Subscription>,
        now: Timestamp,
    ) -> Result<Option<Order>, SubscriptionsServiceError> {
        let mut subscription = document.lock().await;

        if !subscription.should_process_order(now) {
            return Ok(None);
        }

        let mut catalog: FxHashMap<ProductUuid, Product> = FxHashMap::default();

        for item in subscription.items() {
            let product = self.product(item.product).await?;

            catalog.insert(product.uuid, product);
        }

        let mut advanced = subscription.clone();

        advanced.process_order(now)?;

        let order = subscription_order(&subscription, &catalog, self.numbers.next(now), now)?;
        let order = numbers::insert_order(&self.store, self.numbers.as_ref(), order, now)
            .await
            .map_err(|_err| SubscriptionsServiceError::OrderNumberExhausted)?;

        *subscription = advanced;

        info!(
            subscription_uuid = %subscription.uuid(),
            order_uuid = %order.uuid(),
            order_number = %order.order_number(),
            status = %subscription.status(),
            "produced subscription order"
        );

        Ok(Some(order))
    }
}

#[async_trait]
impl SubscriptionsService for InMemorySubscriptionsService {
    #[tracing::instrument(
        name = "subscriptions.service.create_subscription",
        skip(self, request),
        fields(
            owner = %owner,
            plan = %request.plan,
            subscription_uuid = tracing::field::Empty
        ),
        err
    )]
    async fn create_subscription(
        &self,
        owner: UserUuid,
        request: SubscriptionRequest,
    ) -> Result<Subscription, SubscriptionsServiceError> {
        let items = self.price_lines(request.items).await?;

        let subscription = Subscription::new(
            NewSubscription {
                uuid: SubscriptionUuid::new(),
                owner,
                plan: request.plan,
                items,
                shipping_address: request.shipping_address,
                delivery_instructions: request.delivery_instructions,
                payment_method: request.payment_method,
                max_orders: request.max_orders,
                notes: request.notes,
            },
            Timestamp::now(),
        )?;

        self.store
            .subscriptions()
            .insert(subscription.uuid(), subscription.clone())
            .await
            .map_err(|_err| SubscriptionsServiceError::AlreadyExists)?;

        Span::current().record(
            "subscription_uuid",
            tracing::field::display(subscription.uuid()),
        );

        info!(
            subscription_uuid = %subscription.uuid(),
            next_order_date = %subscription.next_order_date(),
            "created subscription"
        );

        Ok(subscription)
    }

    async fn get_subscription(
        &self,
        owner: UserUuid,
        subscription: SubscriptionUuid,
    ) -> Result<Subscription, SubscriptionsServiceError> {
        let document = self.owned_document(owner, subscription).await?;
        let found = document.lock().await.clone();

        Ok(found)
    }

    async fn list_subscriptions(
        &self,
        owner: UserUuid,
        status: Option<SubscriptionStatus>,
    ) -> Result<Vec<Subscription>, SubscriptionsServiceError> {
        let mut subscriptions: Vec<Subscription> = self
            .store
            .subscriptions()
            .values()
            .await
            .into_iter()
            .filter(|subscription| subscription.owner() == owner)
            .filter(|subscription| status.is_none_or(|status| subscription.status() == status))
            .collect();

        subscriptions.sort_by(|a, b| {
            b.created_at()
                .cmp(&a.created_at())
                .then_with(|| b.uuid().cmp(&a.uuid()))
        });

        Ok(subscriptions)
    }

    #[tracing::instrument(
        name = "subscriptions.service.pause_subscription",
        skip(self, reason),
        fields(
            owner = %owner,
            subscription_uuid = %subscription,
            subscription_status = tracing::field::Empty
        ),
        err
    )]
    async fn pause_subscription(
        &self,
        owner: UserUuid,
        subscription: SubscriptionUuid,
        reason: Option<String>,
        until: Option<Timestamp>,
    ) -> Result<Subscription, SubscriptionsServiceError> {
        let paused = self
            .modify(owner, subscription, |current, now| {
                current.pause(reason, until, now)
            })
            .await?;

        info!(subscription_uuid = %subscription, "paused subscription");

        Ok(paused)
    }

    #[tracing::instrument(
        name = "subscriptions.service.resume_subscription",
        skip(self),
        fields(
            owner = %owner,
            subscription_uuid = %subscription,
            subscription_status = tracing::field::Empty
        ),
        err
    )]
    async fn resume_subscription(
        &self,
        owner: UserUuid,
        subscription: SubscriptionUuid,
    ) -> Result<Subscription, SubscriptionsServiceError> {
        let resumed = self
            .modify(owner, subscription, |current, now| current.resume(now))
            .await?;

        info!(
            subscription_uuid = %subscription,
            next_order_date = %resumed.next_order_date(),
            "resumed subscription"
        );

        Ok(resumed)
    }

    #[tracing::instrument(
        name = "subscriptions.service.cancel_subscription",
        skip(self, reason),
        fields(
            owner = %owner,
            subscription_uuid = %subscription,
            subscription_status = tracing::field::Empty
        ),
        err
    )]
    async fn cancel_subscription(
        &self,
        owner: UserUuid,
        subscription: SubscriptionUuid,
        reason: Option<String>,
    ) -> Result<Subscription, SubscriptionsServiceError> {
        let cancelled = self
            .modify(owner, subscription, |current, now| {
                current.cancel(reason, now)
            })
            .await?;

        info!(subscription_uuid = %subscription, "cancelled subscription");

        Ok(cancelled)
    }

    #[tracing::instrument(
        name = "subscriptions.service.update_items",
        skip(self, items),
        fields(
            owner = %owner,
            subscription_uuid = %subscription,
            item_count = items.len(),
            subscription_status = tracing::field::Empty
        ),
        err
    )]
    async fn update_items(
        &self,
        owner: UserUuid,
        subscription: SubscriptionUuid,
        items: Vec<SubscriptionLine>,
    ) -> Result<Subscription, SubscriptionsServiceError> {
        let items = self.price_lines(items).await?;

        let updated = self
            .modify(owner, subscription, |current, now| {
                current.update_items(items, now)
            })
            .await?;

        info!(
            subscription_uuid = %subscription,
            total = %updated.total_amount(),
            "updated subscription items"
        );

        Ok(updated)
    }

    #[tracing::instrument(
        name = "subscriptions.service.process_due",
        skip(self),
        fields(
            at = %now,
            produced = tracing::field::Empty,
            failed = tracing::field::Empty
        )
    )]
    async fn process_due(&self, now: Timestamp) -> SweepReport {
        let mut report = SweepReport::default();

        for document in self.store.subscriptions().documents().await {
            let uuid = document.lock().await.uuid();

            match self.process_one(document, now).await {
                Ok(Some(order)) => report.orders.push(order),
                Ok(None) => {}
                Err(error) => {
                    warn!(subscription_uuid = %uuid, error = %error, "subscription not processed");

                    report.failures.push(SweepFailure {
                        subscription: uuid,
                        error,
                    });
                }
            }
        }

        let span = Span::current();

        span.record("produced", report.orders.len());
        span.record("failed", report.failures.len());

        info!(
            produced = report.orders.len(),
            failed = report.failures.len(),
            "subscription sweep finished"
        );

        report
    }
}

#[automock]
#[async_trait]
pub trait SubscriptionsService: Send + Sync {
    /// Start a subscription, pricing its lines from the catalog.
    async fn create_subscription(
        &self,
        owner: UserUuid,
        request: SubscriptionRequest,
    ) -> Result<Subscription, SubscriptionsServiceError>;

    /// Retrieve one of the owner's subscriptions.
    async fn get_subscription(
        &self,
        owner: UserUuid,
        subscription: SubscriptionUuid,
    ) -> Result<Subscription, SubscriptionsServiceError>;

    /// List the owner's subscriptions, newest first.
    async fn list_subscriptions(
        &self,
        owner: UserUuid,
        status: Option<SubscriptionStatus>,
    ) -> Result<Vec<Subscription>, SubscriptionsServiceError>;

    /// Pause an active subscription, optionally until a given time.
    async fn pause_subscription(
        &self,
        owner: UserUuid,
        subscription: SubscriptionUuid,
        reason: Option<String>,
        until: Option<Timestamp>,
    ) -> Result<Subscription, SubscriptionsServiceError>;

    /// Resume a paused subscription.
    async fn resume_subscription(
        &self,
        owner: UserUuid,
        subscription: SubscriptionUuid,
    ) -> Result<Subscription, SubscriptionsServiceError>;

    /// Cancel an active or paused subscription.
    async fn cancel_subscription(
        &self,
        owner: UserUuid,
        subscription: SubscriptionUuid,
        reason: Option<String>,
    ) -> Result<Subscription, SubscriptionsServiceError>;

    /// Replace the basket of an active subscription, repricing from the catalog.
    async fn update_items(
        &self,
        owner: UserUuid,
        subscription: SubscriptionUuid,
        items: Vec<SubscriptionLine>,
    ) -> Result<Subscription, SubscriptionsServiceError>;

    /// Produce one order for every subscription due at `now`.
    ///
    /// Each subscription is re-checked under its lock and only advanced after its order is
    /// stored, so overlapping sweeps never produce two orders for the same due date.
    async fn process_due(&self, now: Timestamp) -> SweepReport;
}

#[cfg(test)]
mod tests {
    use nutrishop::{calendar::add_days, orders::OrderStatus, subscriptions::SubscriptionPlan};
    use testresult::TestResult;

    use crate::test::{
        TestContext,
        helpers::{subscription_request, usd},
    };

    use super::*;

    #[tokio::test]
    async fn create_subscription_prices_from_catalog_and_schedules_first_order() -> TestResult {
        let ctx = TestContext::new();
        let owner = UserUuid::new();
        let whey = ctx.create_sale_product("Whey", 2999, 2499, 40).await?;

        let subscription = ctx
            .subscriptions
            .create_subscription(
                owner,
                subscription_request(SubscriptionPlan::Weekly, &[(whey.uuid, 2)], None),
            )
            .await?;

        assert_eq!(subscription.status(), SubscriptionStatus::Active);
        assert_eq!(subscription.total_amount(), usd(4998));
        assert_eq!(
            subscription.next_order_date(),
            add_days(subscription.start_date(), 7)?
        );
        assert_eq!(subscription.next_order_number(), 1);
        assert!(subscription.auto_renew());

        let found = ctx
            .subscriptions
            .get_subscription(owner, subscription.uuid())
            .await?;

        assert_eq!(found, subscription);

        Ok(())
    }

    #[tokio::test]
    async fn create_subscription_rejects_unknown_and_inactive_products() -> TestResult {
        let ctx = TestContext::new();
        let owner = UserUuid::new();
        let missing = ProductUuid::new();

        let result = ctx
            .subscriptions
            .create_subscription(
                owner,
                subscription_request(SubscriptionPlan::Monthly, &[(missing, 1)], None),
            )
            .await;

        assert_eq!(
            result.map(|_| ()),
            Err(SubscriptionsServiceError::ProductNotFound(missing))
        );

        let mut retired = ctx.product("Creatine", 2200, 10);

        retired.is_active = false;

        let retired = ctx.products.create_product(retired).await?;

        let result = ctx
            .subscriptions
            .create_subscription(
                owner,
                subscription_request(SubscriptionPlan::Monthly, &[(retired.uuid, 1)], None),
            )
            .await;

        assert_eq!(
            result.map(|_| ()),
            Err(SubscriptionsServiceError::Product(ProductError::Inactive(
                retired.uuid
            )))
        );

        Ok(())
    }

    #[tokio::test]
    async fn create_subscription_validates_items() -> TestResult {
        let ctx = TestContext::new();
        let oats = ctx.create_product("Oats", 650, 10).await?;

        let empty = ctx
            .subscriptions
            .create_subscription(
                UserUuid::new(),
                subscription_request(SubscriptionPlan::Weekly, &[], None),
            )
            .await;

        assert_eq!(
            empty.map(|_| ()),
            Err(SubscriptionsServiceError::Subscription(SubscriptionError::NoItems))
        );

        let zero = ctx
            .subscriptions
            .create_subscription(
                UserUuid::new(),
                subscription_request(SubscriptionPlan::Weekly, &[(oats.uuid, 0)], None),
            )
            .await;

        assert_eq!(
            zero.map(|_| ()),
            Err(SubscriptionsServiceError::Subscription(
                SubscriptionError::InvalidQuantity(oats.uuid)
            ))
        );

        Ok(())
    }

    #[tokio::test]
    async fn other_owners_cannot_see_or_change_a_subscription() -> TestResult {
        let ctx = TestContext::new();
        let subscription = ctx
            .subscribe(UserUuid::new(), SubscriptionPlan::Weekly, None)
            .await?;
        let stranger = UserUuid::new();

        let result = ctx
            .subscriptions
            .get_subscription(stranger, subscription.uuid())
            .await;

        assert_eq!(result.map(|_| ()), Err(SubscriptionsServiceError::NotFound));

        let result = ctx
            .subscriptions
            .cancel_subscription(stranger, subscription.uuid(), None)
            .await;

        assert_eq!(result.map(|_| ()), Err(SubscriptionsServiceError::NotFound));
        assert!(ctx
            .subscriptions
            .list_subscriptions(stranger, None)
            .await?
            .is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn pause_resume_and_cancel_follow_the_status_table() -> TestResult {
        let ctx = TestContext::new();
        let owner = UserUuid::new();
        let subscription = ctx
            .subscribe(owner, SubscriptionPlan::BiWeekly, None)
            .await?;
        let uuid = subscription.uuid();

        let paused = ctx
            .subscriptions
            .pause_subscription(owner, uuid, Some("travelling".to_string()), None)
            .await?;

        assert_eq!(paused.status(), SubscriptionStatus::Paused);
        assert_eq!(paused.next_order_date(), subscription.next_order_date());

        let again = ctx
            .subscriptions
            .pause_subscription(owner, uuid, None, None)
            .await;

        assert!(matches!(
            again,
            Err(SubscriptionsServiceError::Subscription(
                SubscriptionError::IllegalTransition { .. }
            ))
        ));

        let resumed = ctx.subscriptions.resume_subscription(owner, uuid).await?;

        assert_eq!(resumed.status(), SubscriptionStatus::Active);
        assert!(resumed.pause_window().is_none());

        let cancelled = ctx
            .subscriptions
            .cancel_subscription(owner, uuid, Some("too much protein".to_string()))
            .await?;

        assert_eq!(cancelled.status(), SubscriptionStatus::Cancelled);
        assert!(!cancelled.auto_renew());

        let after = ctx.subscriptions.resume_subscription(owner, uuid).await;

        assert!(after.is_err());

        let listed = ctx
            .subscriptions
            .list_subscriptions(owner, Some(SubscriptionStatus::Cancelled))
            .await?;

        assert_eq!(listed.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn update_items_reprices_and_requires_active() -> TestResult {
        let ctx = TestContext::new();
        let owner = UserUuid::new();
        let subscription = ctx.subscribe(owner, SubscriptionPlan::Monthly, None).await?;
        let bars = ctx.create_product("Bars", 1800, 4).await?;

        let updated = ctx
            .subscriptions
            .update_items(
                owner,
                subscription.uuid(),
                vec![SubscriptionLine {
                    product: bars.uuid,
                    quantity: 3,
                }],
            )
            .await?;

        assert_eq!(updated.total_amount(), usd(5400));
        assert_eq!(updated.items().len(), 1);

        ctx.subscriptions
            .pause_subscription(owner, subscription.uuid(), None, None)
            .await?;

        let result = ctx
            .subscriptions
            .update_items(
                owner,
                subscription.uuid(),
                vec![SubscriptionLine {
                    product: bars.uuid,
                    quantity: 1,
                }],
            )
            .await;

        assert_eq!(
            result.map(|_| ()),
            Err(SubscriptionsServiceError::Subscription(
                SubscriptionError::NotActive(SubscriptionStatus::Paused)
            ))
        );

        Ok(())
    }

    #[tokio::test]
    async fn sweep_produces_one_linked_order_per_due_subscription() -> TestResult {
        let ctx = TestContext::new();
        let owner = UserUuid::new();
        let subscription = ctx.subscribe(owner, SubscriptionPlan::Weekly, None).await?;
        let not_due = ctx.subscribe(owner, SubscriptionPlan::Monthly, None).await?;
        let at = add_days(subscription.next_order_date(), 1)?;

        let report = ctx.subscriptions.process_due(at).await;

        assert!(report.failures.is_empty());
        assert_eq!(report.orders.len(), 1);

        let order = report.orders.first().ok_or("no order produced")?;

        assert_eq!(order.subscription(), Some(subscription.uuid()));
        assert_eq!(order.owner(), owner);
        assert_eq!(order.notes(), Some("Subscription order #1"));
        assert_eq!(order.total(), subscription.total_amount());
        assert_eq!(order.status(), OrderStatus::Pending);

        let advanced = ctx
            .subscriptions
            .get_subscription(owner, subscription.uuid())
            .await?;

        assert_eq!(advanced.current_order_count(), 1);
        assert_eq!(advanced.last_order_date(), Some(at));
        assert_eq!(advanced.next_order_date(), add_days(at, 7)?);
        assert_eq!(advanced.next_order_number(), 2);

        let untouched = ctx
            .subscriptions
            .get_subscription(owner, not_due.uuid())
            .await?;

        assert_eq!(untouched, not_due);

        Ok(())
    }

    #[tokio::test]
    async fn repeated_and_overlapping_sweeps_do_not_double_process() -> TestResult {
        let ctx = TestContext::new();
        let subscription = ctx
            .subscribe(UserUuid::new(), SubscriptionPlan::Weekly, None)
            .await?;
        let at = subscription.next_order_date();

        let (first, second) = tokio::join!(
            ctx.subscriptions.process_due(at),
            ctx.subscriptions.process_due(at)
        );

        assert_eq!(first.orders.len() + second.orders.len(), 1);

        let third = ctx.subscriptions.process_due(at).await;

        assert!(third.orders.is_empty());
        assert_eq!(ctx.store.orders().len().await, 1);

        Ok(())
    }

    #[tokio::test]
    async fn capped_subscription_expires_on_its_last_order() -> TestResult {
        let ctx = TestContext::new();
        let owner = UserUuid::new();
        let subscription = ctx
            .subscribe(owner, SubscriptionPlan::Weekly, Some(2))
            .await?;

        let first_at = subscription.next_order_date();
        ctx.subscriptions.process_due(first_at).await;

        let second_at = add_days(first_at, 7)?;
        let report = ctx.subscriptions.process_due(second_at).await;

        assert_eq!(report.orders.len(), 1);

        let expired = ctx
            .subscriptions
            .get_subscription(owner, subscription.uuid())
            .await?;

        assert_eq!(expired.status(), SubscriptionStatus::Expired);
        assert_eq!(expired.end_date(), Some(second_at));
        assert_eq!(expired.next_order_date(), second_at);

        let later = ctx
            .subscriptions
            .process_due(add_days(second_at, 30)?)
            .await;

        assert!(later.orders.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn paused_subscription_is_skipped_until_resumed() -> TestResult {
        let ctx = TestContext::new();
        let owner = UserUuid::new();
        let subscription = ctx.subscribe(owner, SubscriptionPlan::Weekly, None).await?;
        let overdue = add_days(subscription.next_order_date(), 3)?;

        ctx.subscriptions
            .pause_subscription(
                owner,
                subscription.uuid(),
                None,
                Some(add_days(overdue, 10)?),
            )
            .await?;

        assert!(ctx.subscriptions.process_due(overdue).await.orders.is_empty());

        let resumed = ctx
            .subscriptions
            .resume_subscription(owner, subscription.uuid())
            .await?;

        let report = ctx
            .subscriptions
            .process_due(resumed.next_order_date())
            .await;

        assert_eq!(report.orders.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn missing_product_is_reported_and_subscription_not_advanced() -> TestResult {
        let ctx = TestContext::new();
        let owner = UserUuid::new();
        let subscription = ctx.subscribe(owner, SubscriptionPlan::Weekly, None).await?;
        let product = subscription
            .items()
            .first()
            .map(|item| item.product)
            .ok_or("subscription has no items")?;

        ctx.products.delete_product(product).await?;

        let report = ctx
            .subscriptions
            .process_due(subscription.next_order_date())
            .await;

        assert!(report.orders.is_empty());
        assert_eq!(report.failures.len(), 1);
        assert!(matches!(
            report.failures.first().map(|failure| &failure.error),
            Some(SubscriptionsServiceError::ProductNotFound(uuid)) if *uuid == product
        ));

        let unchanged = ctx
            .subscriptions
            .get_subscription(owner, subscription.uuid())
            .await?;

        assert_eq!(unchanged.current_order_count(), 0);
        assert_eq!(unchanged.next_order_date(), subscription.next_order_date());
        assert!(ctx.store.orders().is_empty().await);

        Ok(())
    }
}
