//! App Context

use std::{fmt, sync::Arc};

use nutrishop::{
    coupons::CouponBook,
    fixtures::{Fixture, FixtureError},
};
use rusty_money::iso::Currency;
use thiserror::Error;
use tracing::info;

use crate::{
    domain::{
        carts::{CartsService, InMemoryCartsService},
        orders::{InMemoryOrdersService, OrderNumbers, OrdersService, RandomOrderNumbers},
        products::{InMemoryProductsService, ProductsService, ProductsServiceError},
        subscriptions::{InMemorySubscriptionsService, SubscriptionsService},
    },
    store::{Store, StoreError},
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to load fixtures")]
    Fixture(#[source] FixtureError),

    #[error("fixtures are priced in {fixture}, but the store is configured for {configured}")]
    CurrencyMismatch {
        configured: &'static str,
        fixture: &'static str,
    },

    #[error("failed to seed product catalog")]
    Products(#[source] ProductsServiceError),

    #[error("failed to seed subscriptions")]
    Subscriptions(#[source] StoreError),
}

#[derive(Clone)]
pub struct AppContext {
    pub store: Store,
    pub products: Arc<dyn ProductsService>,
    pub carts: Arc<dyn CartsService>,
    pub orders: Arc<dyn OrdersService>,
    pub subscriptions: Arc<dyn SubscriptionsService>,
}

impl fmt::Debug for AppContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppContext")
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

impl AppContext {
    /// Build an empty application context.
    #[must_use]
    pub fn new(currency: &'static Currency, coupons: CouponBook) -> Self {
        Self::with_numbers(currency, coupons, Arc::new(RandomOrderNumbers))
    }

    /// Build an empty application context drawing order numbers from `numbers`.
    #[must_use]
    pub fn with_numbers(
        currency: &'static Currency,
        coupons: CouponBook,
        numbers: Arc<dyn OrderNumbers>,
    ) -> Self {
        let store = Store::new();
        let products: Arc<dyn ProductsService> =
            Arc::new(InMemoryProductsService::new(store.clone()));

        Self {
            carts: Arc::new(InMemoryCartsService::new(
                store.clone(),
                Arc::clone(&products),
                Arc::new(coupons),
                currency,
            )),
            orders: Arc::new(InMemoryOrdersService::new(
                store.clone(),
                Arc::clone(&products),
                Arc::clone(&numbers),
            )),
            subscriptions: Arc::new(InMemorySubscriptionsService::new(
                store.clone(),
                Arc::clone(&products),
                numbers,
            )),
            products,
            store,
        }
    }

    /// Build application context seeded from a fixture's products, coupons and subscriptions.
    ///
    /// # Errors
    ///
    /// Returns an error when the fixture is priced in another currency or cannot be seeded.
    pub async fn from_fixture(
        fixture: &Fixture,
        currency: &'static Currency,
    ) -> Result<Self, AppInitError> {
        let priced_in = fixture.currency().map_err(AppInitError::Fixture)?;

        if priced_in != currency {
            return Err(AppInitError::CurrencyMismatch {
                configured: currency.iso_alpha_code,
                fixture: priced_in.iso_alpha_code,
            });
        }

        let context = Self::new(currency, fixture.coupons().clone());

        for product in fixture.products() {
            context
                .products
                .create_product(product.clone())
                .await
                .map_err(AppInitError::Products)?;
        }

        for subscription in fixture.subscriptions() {
            context
                .store
                .subscriptions()
                .insert(subscription.uuid(), subscription.clone())
                .await
                .map_err(AppInitError::Subscriptions)?;
        }

        info!(
            products = context.store.products().len().await,
            subscriptions = context.store.subscriptions().len().await,
            "seeded store"
        );

        Ok(context)
    }
}
