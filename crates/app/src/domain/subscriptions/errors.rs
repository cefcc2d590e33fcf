//! Subscriptions service errors.

use nutrishop::{
    checkout::CheckoutError,
    errors::ErrorKind,
    products::{ProductError, ProductUuid},
    subscriptions::SubscriptionError,
};
use thiserror::Error;

use crate::domain::products::ProductsServiceError;

#[derive(Debug, Error, PartialEq)]
pub enum SubscriptionsServiceError {
    #[error("subscription already exists")]
    AlreadyExists,

    #[error("subscription not found")]
    NotFound,

    #[error("product {0} not found")]
    ProductNotFound(ProductUuid),

    #[error("could not allocate a unique order number")]
    OrderNumberExhausted,

    #[error(transparent)]
    Product(#[from] ProductError),

    #[error(transparent)]
    Subscription(#[from] SubscriptionError),

    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    #[error("product catalog unavailable")]
    Catalog(#[source] ProductsServiceError),
}

impl SubscriptionsServiceError {
    pub(crate) fn from_catalog(product: ProductUuid, error: ProductsServiceError) -> Self {
        match error {
            ProductsServiceError::NotFound => Self::ProductNotFound(product),
            ProductsServiceError::AlreadyExists => Self::Catalog(error),
        }
    }

    /// Classify the error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound | Self::ProductNotFound(_) => ErrorKind::NotFound,
            Self::AlreadyExists | Self::OrderNumberExhausted => ErrorKind::Conflict,
            Self::Product(error) => error.kind(),
            Self::Subscription(error) => error.kind(),
            Self::Checkout(error) => error.kind(),
            Self::Catalog(_) => ErrorKind::Computation,
        }
    }
}
