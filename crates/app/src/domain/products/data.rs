//! Products Data

use nutrishop::{pricing::Amount, products::Product};

/// Product Update Data
///
/// Replaces every mutable field of a catalog entry.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductUpdate {
    pub name: String,
    pub price: Amount,
    pub sale_price: Option<Amount>,
    pub stock_quantity: u32,
    pub is_active: bool,
}

impl ProductUpdate {
    pub(crate) fn apply(self, product: &mut Product) {
        product.name = self.name;
        product.price = self.price;
        product.sale_price = self.sale_price;
        product.stock_quantity = self.stock_quantity;
        product.is_active = self.is_active;
    }
}
