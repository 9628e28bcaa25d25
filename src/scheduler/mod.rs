//! Assignment strategies mapping tasks onto resource instances.

pub mod strategy;
pub mod types;


pub use strategy::*;
pub use types::*;
