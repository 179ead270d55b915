//! Integration tests for the transaction model, exercised through the public API only.

mod lifecycle;
#[cfg(feature = "serde")]
mod json;

const fn main() {}
