//! SessionGate Server Library
//!
//! Exposes the server wiring for the binary and for integration tests.

pub mod lifecycle;
pub mod logging;
pub mod middleware;
