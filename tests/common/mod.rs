//! Common test utilities for imgur-dl end-to-end tests

#[allow(dead_code)]
pub mod assertions;
pub mod fixtures;

#[allow(unused_imports)]
pub use assertions::*;
pub use fixtures::*;
