//! Carts
//!
//! A cart owns its line items and derives every monetary field from them. Subtotal, coupon
//! discount and total are caches: each mutation builds the new item list, recomputes the totals
//! from scratch and only then writes both back, so a failed mutation leaves the cart as it was.

use jiff::Timestamp;
use rusty_money::iso::Currency;
use thiserror::Error;

use crate::{
    coupons::{AppliedCoupon, CouponLookup},
    errors::ErrorKind,
    pricing::{Adjustments, Amount, PricingError, Totals, line_total, sum, zero},
    products::ProductUuid,
    users::UserUuid,
    uuids::TypedUuid,
};

/// Cart UUID
pub type CartUuid = TypedUuid<Cart>;

/// Errors raised by cart mutations. The cart is unchanged whenever one is returned.
#[derive(Debug, Error, PartialEq)]
pub enum CartError {
    /// Quantities must be at least one.
    #[error("quantity must be at least 1")]
    InvalidQuantity,

    /// Adding to an existing line would overflow its quantity.
    #[error("quantity for product {0} overflowed")]
    QuantityOverflow(ProductUuid),

    /// A price is in a different currency to the cart.
    #[error("price for product {product} is in {item}, but cart is in {cart}")]
    CurrencyMismatch {
        /// Product being added
        product: ProductUuid,
        /// Currency of the price
        item: &'static str,
        /// Currency of the cart
        cart: &'static str,
    },

    /// No coupon code was given.
    #[error("coupon code is required")]
    MissingCouponCode,

    /// The coupon code is not recognised.
    #[error("invalid coupon code: {0}")]
    InvalidCoupon(String),

    /// Cached totals no longer match the items and adjustments.
    #[error("cart totals drifted: cached total {cached}, recomputed {recomputed}")]
    TotalsDrift {
        /// Cached total in minor units
        cached: i64,
        /// Recomputed total in minor units
        recomputed: i64,
    },

    /// Wrapped pricing error.
    #[error(transparent)]
    Pricing(#[from] PricingError),
}

impl CartError {
    /// Classify the error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidQuantity | Self::MissingCouponCode | Self::CurrencyMismatch { .. } => {
                ErrorKind::Validation
            }
            Self::InvalidCoupon(_) => ErrorKind::Conflict,
            Self::TotalsDrift { .. } => ErrorKind::InvariantViolation,
            Self::QuantityOverflow(_) | Self::Pricing(_) => ErrorKind::Computation,
        }
    }
}

/// A line in a cart.
#[derive(Debug, Clone, PartialEq)]
pub struct CartItem {
    product: ProductUuid,
    quantity: u32,
    unit_price: Amount,
    total_price: Amount,
    added_at: Timestamp,
    note: Option<String>,
}

impl CartItem {
    /// Product on this line.
    pub fn product(&self) -> ProductUuid {
        self.product
    }

    /// Quantity on this line.
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Price per unit when the line was first added.
    pub fn unit_price(&self) -> Amount {
        self.unit_price
    }

    /// `quantity × unit_price`
    pub fn total_price(&self) -> Amount {
        self.total_price
    }

    /// When the line was first added.
    pub fn added_at(&self) -> Timestamp {
        self.added_at
    }

    /// Customer note.
    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }
}

/// Shopping cart.
#[derive(Debug, Clone)]
pub struct Cart {
    uuid: CartUuid,
    owner: UserUuid,
    items: Vec<CartItem>,
    coupon: Option<AppliedCoupon>,
    totals: Totals,
    is_active: bool,
    created_at: Timestamp,
    last_updated: Timestamp,
}

impl Cart {
    /// Create an empty, active cart.
    pub fn new(
        uuid: CartUuid,
        owner: UserUuid,
        currency: &'static Currency,
        now: Timestamp,
    ) -> Self {
        Self {
            uuid,
            owner,
            items: Vec::new(),
            coupon: None,
            totals: Totals::zero(currency),
            is_active: true,
            created_at: now,
            last_updated: now,
        }
    }

    /// Cart id
    pub fn uuid(&self) -> CartUuid {
        self.uuid
    }

    /// Owning user
    pub fn owner(&self) -> UserUuid {
        self.owner
    }

    /// Currency every amount in the cart is held in.
    pub fn currency(&self) -> &'static Currency {
        self.totals.currency()
    }

    /// Lines in the cart.
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// The line for a product, if any.
    pub fn item(&self, product: ProductUuid) -> Option<&CartItem> {
        self.items.iter().find(|item| item.product == product)
    }

    /// Number of lines.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// All derived monetary fields.
    pub fn totals(&self) -> &Totals {
        &self.totals
    }

    /// Sum of line totals.
    pub fn subtotal(&self) -> Amount {
        self.totals.subtotal
    }

    /// Tax
    pub fn tax(&self) -> Amount {
        self.totals.tax
    }

    /// Shipping
    pub fn shipping(&self) -> Amount {
        self.totals.shipping
    }

    /// Flat discount
    pub fn discount(&self) -> Amount {
        self.totals.discount
    }

    /// Applied coupon, if any.
    pub fn coupon(&self) -> Option<&AppliedCoupon> {
        self.coupon.as_ref()
    }

    /// Applied coupon code, if any.
    pub fn coupon_code(&self) -> Option<&str> {
        self.coupon.as_ref().map(AppliedCoupon::code)
    }

    /// Discount from the applied coupon.
    pub fn coupon_discount(&self) -> Amount {
        self.totals.coupon_discount
    }

    /// Grand total.
    pub fn total(&self) -> Amount {
        self.totals.total
    }

    /// Whether this is the owner's current cart.
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// When the cart was created.
    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// When the cart was last mutated.
    pub fn last_updated(&self) -> Timestamp {
        self.last_updated
    }

    /// Add `quantity` of a product.
    ///
    /// An existing line for the product keeps its original unit price and has its quantity
    /// increased; `unit_price` is only used for new lines.
    ///
    /// # Errors
    ///
    /// - [`CartError::InvalidQuantity`]: `quantity` is zero.
    /// - [`CartError::CurrencyMismatch`]: a new line's price is in another currency.
    /// - [`CartError::QuantityOverflow`] or [`CartError::Pricing`]: the totals overflowed.
    pub fn add_item(
        &mut self,
        product: ProductUuid,
        quantity: u32,
        unit_price: Amount,
        now: Timestamp,
    ) -> Result<(), CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity);
        }

        let mut items = self.items.clone();

        if let Some(existing) = items.iter_mut().find(|item| item.product == product) {
            let quantity = existing
                .quantity
                .checked_add(quantity)
                .ok_or(CartError::QuantityOverflow(product))?;

            existing.total_price = line_total(existing.unit_price, quantity)?;
            existing.quantity = quantity;
        } else {
            self.ensure_currency(product, unit_price)?;

            items.push(CartItem {
                product,
                quantity,
                unit_price,
                total_price: line_total(unit_price, quantity)?,
                added_at: now,
                note: None,
            });
        }

        self.commit(items, self.coupon.clone(), self.totals.adjustments(), now)
    }

    /// Remove every line for a product.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Pricing`] if the totals cannot be recomputed.
    pub fn remove_item(&mut self, product: ProductUuid, now: Timestamp) -> Result<(), CartError> {
        let mut items = self.items.clone();

        items.retain(|item| item.product != product);

        self.commit(items, self.coupon.clone(), self.totals.adjustments(), now)
    }

    /// Set the quantity of a product's line, repricing it from its stored unit price.
    ///
    /// Returns `false` without touching the cart when the product has no line.
    ///
    /// # Errors
    ///
    /// - [`CartError::InvalidQuantity`]: `quantity` is zero.
    /// - [`CartError::Pricing`]: the totals overflowed.
    pub fn update_item_quantity(
        &mut self,
        product: ProductUuid,
        quantity: u32,
        now: Timestamp,
    ) -> Result<bool, CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity);
        }

        let mut items = self.items.clone();

        let Some(item) = items.iter_mut().find(|item| item.product == product) else {
            return Ok(false);
        };

        item.total_price = line_total(item.unit_price, quantity)?;
        item.quantity = quantity;

        self.commit(items, self.coupon.clone(), self.totals.adjustments(), now)?;

        Ok(true)
    }

    /// Attach a note to a product's line. Returns `false` when the product has no line.
    pub fn set_item_note(
        &mut self,
        product: ProductUuid,
        note: Option<String>,
        now: Timestamp,
    ) -> bool {
        let Some(item) = self.items.iter_mut().find(|item| item.product == product) else {
            return false;
        };

        item.note = note;
        self.last_updated = now;

        true
    }

    /// Empty the cart, zero every monetary field and drop the coupon.
    pub fn clear(&mut self, now: Timestamp) {
        self.items.clear();
        self.coupon = None;
        self.totals = Totals::zero(self.currency());
        self.last_updated = now;
    }

    /// Apply a coupon code, resolved through `coupons`.
    ///
    /// # Errors
    ///
    /// - [`CartError::MissingCouponCode`]: the code is blank.
    /// - [`CartError::InvalidCoupon`]: the code is not recognised; the cart is unchanged.
    /// - [`CartError::Pricing`]: the discount cannot be computed.
    pub fn apply_coupon<C>(
        &mut self,
        code: &str,
        coupons: &C,
        now: Timestamp,
    ) -> Result<(), CartError>
    where
        C: CouponLookup + ?Sized,
    {
        if code.trim().is_empty() {
            return Err(CartError::MissingCouponCode);
        }

        let rule = coupons
            .lookup(code)
            .ok_or_else(|| CartError::InvalidCoupon(code.to_string()))?;

        let coupon = AppliedCoupon::new(code.trim(), rule);

        self.commit(
            self.items.clone(),
            Some(coupon),
            self.totals.adjustments(),
            now,
        )
    }

    /// Drop the applied coupon and its discount.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Pricing`] if the totals cannot be recomputed.
    pub fn remove_coupon(&mut self, now: Timestamp) -> Result<(), CartError> {
        self.commit(self.items.clone(), None, self.totals.adjustments(), now)
    }

    /// Set tax, shipping and flat discount.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Pricing`] if an adjustment is in another currency.
    pub fn set_adjustments(
        &mut self,
        adjustments: Adjustments,
        now: Timestamp,
    ) -> Result<(), CartError> {
        self.commit(self.items.clone(), self.coupon.clone(), adjustments, now)
    }

    /// Recompute the totals from the items and adjustments and compare with the cached values.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::TotalsDrift`] if they disagree.
    pub fn verify_totals(&self) -> Result<(), CartError> {
        let recomputed = totals_for(
            &self.items,
            self.coupon.as_ref(),
            self.totals.adjustments(),
            self.currency(),
        )?;

        if recomputed == self.totals {
            Ok(())
        } else {
            Err(CartError::TotalsDrift {
                cached: self.totals.total.to_minor_units(),
                recomputed: recomputed.total.to_minor_units(),
            })
        }
    }

    fn ensure_currency(&self, product: ProductUuid, price: Amount) -> Result<(), CartError> {
        let currency = self.currency();

        if price.currency() == currency {
            Ok(())
        } else {
            Err(CartError::CurrencyMismatch {
                product,
                item: price.currency().iso_alpha_code,
                cart: currency.iso_alpha_code,
            })
        }
    }

    fn commit(
        &mut self,
        items: Vec<CartItem>,
        coupon: Option<AppliedCoupon>,
        adjustments: Adjustments,
        now: Timestamp,
    ) -> Result<(), CartError> {
        let totals = totals_for(&items, coupon.as_ref(), adjustments, self.currency())?;

        self.items = items;
        self.coupon = coupon;
        self.totals = totals;
        self.last_updated = now;

        Ok(())
    }
}

fn totals_for(
    items: &[CartItem],
    coupon: Option<&AppliedCoupon>,
    adjustments: Adjustments,
    currency: &'static Currency,
) -> Result<Totals, CartError> {
    let subtotal = sum(currency, items.iter().map(CartItem::total_price))?;

    let coupon_discount = match coupon {
        Some(coupon) => coupon.rule().discount_on(subtotal)?,
        None => zero(currency),
    };

    Ok(Totals::from_parts(subtotal, adjustments, coupon_discount)?)
}
