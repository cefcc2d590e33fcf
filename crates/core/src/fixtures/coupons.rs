//! Coupon Fixtures

use rustc_hash::FxHashMap;
use serde::Deserialize;

/// Wrapper for coupons in YAML
#[derive(Debug, Deserialize)]
pub struct CouponsFixture {
    /// Map of coupon code -> percentage off the subtotal (e.g., "10%")
    pub coupons: FxHashMap<String, String>,
}
