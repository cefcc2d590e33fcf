//! Pricing
//!
//! Money helpers shared by carts, orders and subscriptions. Amounts are held in minor units and
//! every operation that combines two amounts goes through `rusty_money`'s checked arithmetic, so a
//! currency mismatch surfaces as an error rather than a silently wrong total.

use decimal_percentage::Percentage;
use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

use crate::errors::ErrorKind;

/// An amount of money in a store currency.
pub type Amount = Money<'static, Currency>;

/// Errors that can occur while calculating prices and totals.
#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    /// Percentage calculation could not be safely converted.
    #[error("percentage conversion overflowed or was not finite")]
    PercentConversion,

    /// Quantity multiplied by unit price does not fit in minor units.
    #[error("line total overflowed for quantity {0}")]
    LineOverflow(u32),

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

impl PricingError {
    /// Classify the error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        ErrorKind::Computation
    }
}

/// A zero amount in the given currency.
#[must_use]
pub fn zero(currency: &'static Currency) -> Amount {
    Money::from_minor(0, currency)
}

/// Calculates `quantity × unit_price`.
///
/// # Errors
///
/// Returns [`PricingError::LineOverflow`] if the product does not fit in minor units.
pub fn line_total(unit_price: Amount, quantity: u32) -> Result<Amount, PricingError> {
    let minor = unit_price
        .to_minor_units()
        .checked_mul(i64::from(quantity))
        .ok_or(PricingError::LineOverflow(quantity))?;

    Ok(Money::from_minor(minor, unit_price.currency()))
}

/// Sums amounts, starting from zero in the given currency.
///
/// # Errors
///
/// Returns [`PricingError::Money`] if any amount is in a different currency.
pub fn sum(
    currency: &'static Currency,
    amounts: impl IntoIterator<Item = Amount>,
) -> Result<Amount, PricingError> {
    let total = amounts
        .into_iter()
        .try_fold(zero(currency), |acc, amount| acc.add(amount))?;

    Ok(total)
}

/// Calculates `percent` of `amount`, rounded half away from zero to the nearest minor unit.
///
/// # Errors
///
/// Returns [`PricingError::PercentConversion`] if the result cannot be represented.
pub fn percent_of(amount: Amount, percent: &Percentage) -> Result<Amount, PricingError> {
    let minor = percent_of_minor(percent, amount.to_minor_units())?;

    Ok(Money::from_minor(minor, amount.currency()))
}

/// Calculate the percentage of a minor unit amount.
///
/// # Errors
///
/// Returns [`PricingError::PercentConversion`] if the calculation overflows.
pub fn percent_of_minor(percent: &Percentage, minor: i64) -> Result<i64, PricingError> {
    let minor = Decimal::from_i64(minor).ok_or(PricingError::PercentConversion)?;

    ((*percent) * Decimal::ONE) // decimal_percentage doesn't expose the underlying Decimal
        .checked_mul(minor)
        .ok_or(PricingError::PercentConversion)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(PricingError::PercentConversion)
}

/// Non-coupon adjustments applied on top of a subtotal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Adjustments {
    /// Tax added to the subtotal.
    pub tax: Amount,

    /// Shipping added to the subtotal.
    pub shipping: Amount,

    /// Flat discount taken off the subtotal.
    pub discount: Amount,
}

impl Adjustments {
    /// No adjustments.
    #[must_use]
    pub fn none(currency: &'static Currency) -> Self {
        Self {
            tax: zero(currency),
            shipping: zero(currency),
            discount: zero(currency),
        }
    }
}

/// The derived monetary fields of a cart or order.
///
/// `total = subtotal + tax + shipping - discount - coupon_discount`, never clamped, so a total
/// can go negative when discounts exceed the subtotal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Totals {
    /// Sum of line totals.
    pub subtotal: Amount,

    /// Tax added to the subtotal.
    pub tax: Amount,

    /// Shipping added to the subtotal.
    pub shipping: Amount,

    /// Flat discount.
    pub discount: Amount,

    /// Discount from an applied coupon.
    pub coupon_discount: Amount,

    /// Grand total.
    pub total: Amount,
}

impl Totals {
    /// All fields zero.
    #[must_use]
    pub fn zero(currency: &'static Currency) -> Self {
        Self {
            subtotal: zero(currency),
            tax: zero(currency),
            shipping: zero(currency),
            discount: zero(currency),
            coupon_discount: zero(currency),
            total: zero(currency),
        }
    }

    /// Build totals from a subtotal, adjustments and coupon discount.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::Money`] on a currency mismatch.
    pub fn from_parts(
        subtotal: Amount,
        adjustments: Adjustments,
        coupon_discount: Amount,
    ) -> Result<Self, PricingError> {
        let mut totals = Self {
            subtotal,
            tax: adjustments.tax,
            shipping: adjustments.shipping,
            discount: adjustments.discount,
            coupon_discount,
            total: subtotal,
        };

        totals.total = totals.grand_total()?;

        Ok(totals)
    }

    /// The currency the totals are held in.
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.subtotal.currency()
    }

    /// The non-coupon adjustments.
    #[must_use]
    pub fn adjustments(&self) -> Adjustments {
        Adjustments {
            tax: self.tax,
            shipping: self.shipping,
            discount: self.discount,
        }
    }

    /// Recompute the grand total from the other fields.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::Money`] on a currency mismatch.
    pub fn grand_total(&self) -> Result<Amount, PricingError> {
        Ok(self
            .subtotal
            .add(self.tax)?
            .add(self.shipping)?
            .sub(self.discount)?
            .sub(self.coupon_discount)?)
    }
}
