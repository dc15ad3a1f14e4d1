//! Business logic services
//!
//! The procedures themselves. Each one talks to the outside world only
//! through the port traits it is constructed with.
//!
//! - [`probe`] - Health probe of the public function URL
//! - [`deployer`] - Fallback deploy chain with pre- and post-deploy probes
//! - [`reconciler`] - Script tag cleanup and reinstall
//! - [`fix`] - Deploy the embed function, then reconcile

pub mod deployer;
pub mod fix;
pub mod probe;
pub mod reconciler;

pub use deployer::{
    AttemptOutcome, AttemptRecord, CommandEcho, DeployError, DeployOutcome, DeployReport,
    DeployState, DeploymentAttempt, attempt_in_order, manual_deploy_steps, successful_attempt,
};
pub use fix::{FixDriver, FixReport};
pub use probe::probe_function;
pub use reconciler::{
    DeletionResult, ReconcileError, ReconcileReport, ScriptTagReconciler, select_matching,
};
