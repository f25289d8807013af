//! Derived statistics over the record store.

pub mod aggregator;

pub use aggregator::*;
