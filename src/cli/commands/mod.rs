//! Command implementations

use std::process::ExitCode;

use storefront_ops::config::OpsConfig;
use storefront_ops::output::OutputMode;

mod config;
mod deploy;
mod fix;
mod reconcile;

pub use config::show_config;
pub use deploy::deploy;
pub use fix::fix;
pub use reconcile::reconcile;

/// Settings shared by every command
#[derive(Debug)]
pub struct Context {
    /// Effective configuration
    pub config: OpsConfig,
    /// How to print the final report
    pub mode: OutputMode,
    /// Map failures to non-zero exit codes
    pub strict: bool,
}

impl Context {
    /// Exit code for a run that failed in a non-fatal way
    #[must_use]
    pub const fn soft_failure(&self) -> ExitCode {
        if self.strict {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        }
    }
}
