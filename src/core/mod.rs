//! Core domain logic for storefront-ops
//!
//! All external interactions are abstracted through port traits, so the
//! procedures here run unchanged against real processes and HTTP or
//! against test fakes.
//!
//! ## Architecture
//!
//! - `models/` - Domain types (DeployCommand, ScriptTagRecord, ProbeResult)
//! - `services/` - The deploy, reconcile and fix procedures
//! - `ports/` - Trait definitions for external dependencies

pub mod models;
pub mod ports;
pub mod services;
