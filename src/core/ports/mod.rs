//! Port traits (interfaces) for external dependencies
//!
//! These traits define the boundaries between the procedures in
//! `core::services` and the outside world (processes, network, operator
//! input, wall clock).
//!
//! Implementations live in the `adapters` module.
//!
//! ## Design Principle
//!
//! The core procedures depend only on these traits, never on concrete
//! implementations. Tests substitute fakes for every port, so the full
//! deploy and reconcile flows run without touching the network or spawning
//! processes.

mod clock;
mod command_runner;
mod credentials;
mod http_client;

pub use clock::Clock;
pub use command_runner::{CommandError, CommandOutput, CommandRunner};
pub use credentials::{CredentialError, CredentialProvider};
pub use http_client::{HttpClient, HttpError, HttpMethod, HttpRequest, HttpResponse};
