//! Orders

pub mod data;
pub mod errors;
pub mod numbers;
pub mod service;

pub use errors::OrdersServiceError;
pub use numbers::{MAX_ORDER_NUMBER_ATTEMPTS, MockOrderNumbers, OrderNumbers, RandomOrderNumbers};
pub use service::*;
