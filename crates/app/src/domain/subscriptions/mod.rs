//! Subscriptions

pub mod data;
pub mod errors;
pub mod service;

pub use errors::SubscriptionsServiceError;
pub use service::*;
