//! Carts service errors.

use nutrishop::{
    carts::CartError,
    errors::ErrorKind,
    products::{ProductError, ProductUuid},
};
use thiserror::Error;

use crate::domain::products::ProductsServiceError;

#[derive(Debug, Error, PartialEq)]
pub enum CartsServiceError {
    #[error("product {0} not found")]
    ProductNotFound(ProductUuid),

    #[error("product {0} is not in the cart")]
    ItemNotFound(ProductUuid),

    #[error(transparent)]
    Product(#[from] ProductError),

    #[error(transparent)]
    Cart(#[from] CartError),

    #[error("product catalog unavailable")]
    Catalog(#[source] ProductsServiceError),
}

impl CartsServiceError {
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
            Self::ProductNotFound(_) | Self::ItemNotFound(_) => ErrorKind::NotFound,
            Self::Product(error) => error.kind(),
            Self::Cart(error) => error.kind(),
            Self::Catalog(_) => ErrorKind::Computation,
        }
    }
}
