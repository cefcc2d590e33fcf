//! Coupons
//!
//! A coupon is a code that resolves to a discount rule. The rule is stored on the cart, not the
//! computed amount, so the discount follows the subtotal as items change.

use decimal_percentage::Percentage;
use rustc_hash::FxHashMap;

use crate::pricing::{Amount, PricingError, percent_of};

/// Code recognised by the built-in coupon book.
pub const WELCOME_CODE: &str = "WELCOME10";

/// Discount rule a coupon code resolves to.
#[derive(Debug, Clone, Copy)]
pub enum CouponRule {
    /// Take a percentage off the subtotal.
    PercentageOff(Percentage),
}

impl CouponRule {
    /// Discount this rule gives on a subtotal.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if the percentage cannot be applied.
    pub fn discount_on(&self, subtotal: Amount) -> Result<Amount, PricingError> {
        match self {
            Self::PercentageOff(percent) => percent_of(subtotal, percent),
        }
    }
}

/// A coupon applied to a cart: the code as the customer entered it and the rule it resolved to.
#[derive(Debug, Clone)]
pub struct AppliedCoupon {
    code: String,
    rule: CouponRule,
}

impl AppliedCoupon {
    /// Pair a code with its resolved rule.
    pub fn new(code: impl Into<String>, rule: CouponRule) -> Self {
        Self {
            code: code.into(),
            rule,
        }
    }

    /// The code as entered.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// The resolved rule.
    pub fn rule(&self) -> &CouponRule {
        &self.rule
    }
}

/// Resolves coupon codes to discount rules.
pub trait CouponLookup {
    /// Look up a code, ignoring case. Returns `None` for unknown codes.
    fn lookup(&self, code: &str) -> Option<CouponRule>;
}

/// An in-memory set of coupon codes.
#[derive(Debug, Clone, Default)]
pub struct CouponBook {
    rules: FxHashMap<String, CouponRule>,
}

impl CouponBook {
    /// An empty book; every code is rejected.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The storefront's standing offer: `WELCOME10` for 10% off the subtotal.
    #[must_use]
    pub fn builtin() -> Self {
        Self::new().with(
            WELCOME_CODE,
            CouponRule::PercentageOff(Percentage::from(0.1)),
        )
    }

    /// Add or replace a code.
    #[must_use]
    pub fn with(mut self, code: &str, rule: CouponRule) -> Self {
        self.insert(code, rule);
        self
    }

    /// Add or replace a code.
    pub fn insert(&mut self, code: &str, rule: CouponRule) {
        self.rules.insert(code.to_ascii_uppercase(), rule);
    }

    /// Number of codes in the book.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the book has no codes.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl CouponLookup for CouponBook {
    fn lookup(&self, code: &str) -> Option<CouponRule> {
        self.rules.get(&code.trim().to_ascii_uppercase()).copied()
    }
}
