//! Adapter implementations for port traits
//!
//! This module contains concrete implementations that handle I/O:
//!
//! - `process/` - Child processes with a deadline
//! - `http/` - Blocking HTTP via reqwest
//! - `credentials/` - Token from the environment or the operator
//! - `clock/` - Real sleeps and timestamps

pub mod clock;
pub mod credentials;
pub mod http;
pub mod process;

pub use clock::SystemClock;
pub use credentials::EnvCredentials;
pub use http::ReqwestClient;
pub use process::ProcessRunner;
