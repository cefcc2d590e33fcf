//! Products
//!
//! The slice of the product catalog this crate reads: enough to price a line and check stock.

use std::{collections::HashMap, hash::BuildHasher};

use thiserror::Error;

use crate::{errors::ErrorKind, pricing::Amount, uuids::TypedUuid};

/// Product UUID
pub type ProductUuid = TypedUuid<Product>;

/// Errors raised when a product cannot satisfy a request.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProductError {
    /// The product is not (or no longer) sold.
    #[error("product {0} is not available")]
    Inactive(ProductUuid),

    /// Not enough stock for the requested quantity.
    #[error("only {available} of {name} available in stock, {requested} requested")]
    InsufficientStock {
        /// Product
        product: ProductUuid,
        /// Product name, for messages
        name: String,
        /// Quantity asked for
        requested: u32,
        /// Quantity in stock
        available: u32,
    },
}

impl ProductError {
    /// Classify the error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Inactive(_) => ErrorKind::NotFound,
            Self::InsufficientStock { .. } => ErrorKind::Conflict,
        }
    }
}

/// Product as seen from the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    /// Product id
    pub uuid: ProductUuid,

    /// Display name, captured onto orders
    pub name: String,

    /// List price
    pub price: Amount,

    /// Sale price, when on offer
    pub sale_price: Option<Amount>,

    /// Units in stock
    pub stock_quantity: u32,

    /// Whether the product is sold
    pub is_active: bool,
}

impl Product {
    /// The price a customer pays: the sale price when there is one, otherwise the list price.
    #[must_use]
    pub fn final_price(&self) -> Amount {
        self.sale_price.unwrap_or(self.price)
    }

    /// Whether the sale price undercuts the list price.
    #[must_use]
    pub fn is_on_sale(&self) -> bool {
        self.sale_price
            .is_some_and(|sale| sale.to_minor_units() < self.price.to_minor_units())
    }

    /// Check the product can be sold in the given quantity.
    ///
    /// # Errors
    ///
    /// - [`ProductError::Inactive`]: the product is not sold.
    /// - [`ProductError::InsufficientStock`]: stock is below `quantity`.
    pub fn ensure_available(&self, quantity: u32) -> Result<(), ProductError> {
        if !self.is_active {
            return Err(ProductError::Inactive(self.uuid));
        }

        if self.stock_quantity < quantity {
            return Err(ProductError::InsufficientStock {
                product: self.uuid,
                name: self.name.clone(),
                requested: quantity,
                available: self.stock_quantity,
            });
        }

        Ok(())
    }
}

/// Read access to products by id.
pub trait ProductLookup {
    /// Find a product.
    fn product(&self, uuid: ProductUuid) -> Option<&Product>;
}

impl<S: BuildHasher> ProductLookup for HashMap<ProductUuid, Product, S> {
    fn product(&self, uuid: ProductUuid) -> Option<&Product> {
        self.get(&uuid)
    }
}

impl ProductLookup for [Product] {
    fn product(&self, uuid: ProductUuid) -> Option<&Product> {
        self.iter().find(|product| product.uuid == uuid)
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::{Money, iso::GBP};

    use super::*;

    fn oats() -> Product {
        Product {
            uuid: ProductUuid::new(),
            name: "Rolled Oats".to_string(),
            price: Money::from_minor(4_00, GBP),
            sale_price: None,
            stock_quantity: 3,
            is_active: true,
        }
    }

    #[test]
    fn final_price_prefers_sale_price() {
        let mut product = oats();

        assert_eq!(product.final_price(), Money::from_minor(4_00, GBP));
        assert!(!product.is_on_sale());

        product.sale_price = Some(Money::from_minor(3_50, GBP));

        assert_eq!(product.final_price(), Money::from_minor(3_50, GBP));
        assert!(product.is_on_sale());
    }

    #[test]
    fn ensure_available_reports_stock_shortfall() {
        let product = oats();

        assert_eq!(product.ensure_available(3), Ok(()));

        let error = product.ensure_available(4);

        assert!(
            matches!(
                error,
                Err(ProductError::InsufficientStock {
                    requested: 4,
                    available: 3,
                    ..
                })
            ),
            "expected InsufficientStock, got {error:?}"
        );
    }

    #[test]
    fn ensure_available_rejects_inactive_products() {
        let mut product = oats();
        product.is_active = false;

        let uuid = product.uuid;

        assert_eq!(
            product.ensure_available(1),
            Err(ProductError::Inactive(uuid))
        );
    }

    #[test]
    fn map_lookup_works_with_any_hasher() {
        let product = oats();
        let wanted = product.uuid;

        let fx: rustc_hash::FxHashMap<ProductUuid, Product> =
            [(wanted, product.clone())].into_iter().collect();
        let default: HashMap<ProductUuid, Product> = [(wanted, product)].into_iter().collect();

        assert_eq!(fx.product(wanted).map(|p| p.uuid), Some(wanted));
        assert_eq!(default.product(wanted).map(|p| p.uuid), Some(wanted));
        assert!(default.product(ProductUuid::new()).is_none());
    }

    #[test]
    fn slice_lookup_finds_by_id() {
        let target = oats();
        let wanted = target.uuid;
        let products = [oats(), target];

        assert_eq!(
            products.as_slice().product(wanted).map(|p| p.uuid),
            Some(wanted)
        );
        assert!(products.as_slice().product(ProductUuid::new()).is_none());
    }
}
