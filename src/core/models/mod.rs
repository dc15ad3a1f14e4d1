//! Domain models for storefront-ops
//!
//! Pure data structures with no I/O dependencies.
//!
//! - [`DeployCommand`] - One fallback invocation of the platform CLI
//! - [`ScriptTagRecord`] - A script injected on every storefront page
//! - [`ProbeResult`] - What a health probe saw

mod deploy_command;
mod probe;
mod script_tag;

pub use deploy_command::{DeployCommand, default_deploy_commands};
pub use probe::ProbeResult;
pub use script_tag::{NewScriptTag, ScriptTagEnvelope, ScriptTagList, ScriptTagRecord};
