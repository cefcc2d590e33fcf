//! Nutrishop Domain Services

pub mod carts;
pub mod orders;
pub mod products;
pub mod subscriptions;
