//! Small helpers shared across modules

pub mod filter;

pub use filter::{contains_any, filter_fields};
