//! Core business logic for tweeter.

pub mod services;

pub use services::*;

#[cfg(test)]
mod test_support;
