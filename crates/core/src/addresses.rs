//! Addresses

use serde::{Deserialize, Serialize};

/// Postal address, copied by value onto orders and subscriptions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// Recipient first name
    pub first_name: String,

    /// Recipient last name
    pub last_name: String,

    /// Street and number
    pub street_address: String,

    /// City
    pub city: String,

    /// State, county or region
    pub state: String,

    /// Postal code
    pub zip_code: String,

    /// Country
    pub country: String,

    /// Contact number for the courier
    #[serde(default)]
    pub phone: Option<String>,
}

impl Address {
    /// First and last name joined with a space.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
