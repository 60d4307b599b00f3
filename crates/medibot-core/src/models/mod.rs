//! Domain types for the product catalog.

mod catalog;

pub use catalog::*;
