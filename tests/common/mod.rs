//! Common test utilities shared across test types
//!
//! - `mocks.rs` - Fake port implementations
//! - `fixtures.rs` - Test data builders
//! - `server.rs` - Local HTTP stub for adapter and CLI tests

pub mod server;
