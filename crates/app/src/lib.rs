//! Nutrishop application services: in-memory document store, domain services, subscription sweep
//! and CLI configuration.

pub mod config;
pub mod context;
pub mod domain;
pub mod observability;
pub mod report;
pub mod store;

#[cfg(test)]
mod test;
