//! storefront-ops - Deploy the popup edge function and reconcile storefront
//! script tags

// Deny all clippy warnings in this crate
#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_debug_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code,
    unused_import_braces
)]
// Allow some pedantic lints that are too noisy or not applicable
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::cargo_common_metadata
)]

use std::process::ExitCode;

mod cli;

/// Main entry point for the storefront-ops CLI
fn main() -> ExitCode {
    match cli::run() {
        Ok(code) => code,
        Err(e) => {
            log::error!("❌ Unexpected error: {e:#}");
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        },
    }
}
