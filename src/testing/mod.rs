//! Testing utilities.
//!
//! Provides an in-memory repository API for testing code built on bulk
//! updates without touching a real platform.

mod mock;

pub use mock::{MockCall, MockRepositoryApi, MockResponse};
