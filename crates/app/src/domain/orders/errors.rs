//! Orders service errors.

use nutrishop::{
    checkout::CheckoutError, errors::ErrorKind, orders::OrderError, products::ProductUuid,
};
use thiserror::Error;

use crate::{domain::products::ProductsServiceError, store::StoreError};

#[derive(Debug, Error, PartialEq)]
pub enum OrdersServiceError {
    #[error("order not found")]
    NotFound,

    #[error("page and limit must be at least 1")]
    InvalidPage,

    #[error("could not allocate a unique order number")]
    OrderNumberExhausted,

    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    #[error(transparent)]
    Order(#[from] OrderError),

    #[error("product catalog unavailable")]
    Catalog(#[source] ProductsServiceError),
}

impl From<StoreError> for OrdersServiceError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::Duplicate => Self::OrderNumberExhausted,
        }
    }
}

impl OrdersServiceError {
    pub(crate) fn from_catalog(product: ProductUuid, error: ProductsServiceError) -> Self {
        match error {
            ProductsServiceError::NotFound => CheckoutError::ProductNotFound(product).into(),
            ProductsServiceError::AlreadyExists => Self::Catalog(error),
        }
    }

    /// Classify the error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound => ErrorKind::NotFound,
            Self::InvalidPage => ErrorKind::Validation,
            Self::OrderNumberExhausted => ErrorKind::Conflict,
            Self::Checkout(error) => error.kind(),
            Self::Order(error) => error.kind(),
            Self::Catalog(_) => ErrorKind::Computation,
        }
    }
}
