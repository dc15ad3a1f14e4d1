//! Deploy-then-reconcile driver
//!
//! Pushes the latest embed function, then cleans up the storefront. The
//! storefront step runs even when the deploy step fails.

use super::deployer::{AttemptRecord, attempt_in_order, successful_attempt};
use super::reconciler::{ReconcileError, ReconcileReport, ScriptTagReconciler};
use crate::config::OpsConfig;
use crate::core::ports::{Clock, CommandRunner, CredentialProvider, HttpClient};

/// Result of a fix run
#[derive(Debug)]
pub struct FixReport {
    /// Deploy commands that were run
    pub deploy_attempts: Vec<AttemptRecord>,
    /// Whether one of them succeeded
    pub deployed: bool,
    /// Outcome of the storefront step
    pub reconcile: Result<ReconcileReport, ReconcileError>,
}

impl FixReport {
    /// The storefront step succeeded
    #[must_use]
    pub const fn succeeded(&self) -> bool {
        self.reconcile.is_ok()
    }
}

/// Runs the embed deploy and then the reconciler
#[derive(Debug)]
pub struct FixDriver<'a, R, H, P, C> {
    config: &'a OpsConfig,
    runner: &'a R,
    http: &'a H,
    credentials: &'a P,
    clock: &'a C,
}

impl<'a, R, H, P, C> FixDriver<'a, R, H, P, C>
where
    R: CommandRunner,
    H: HttpClient,
    P: CredentialProvider,
    C: Clock,
{
    /// Wire up the driver against the given ports
    #[must_use]
    pub const fn new(
        config: &'a OpsConfig,
        runner: &'a R,
        http: &'a H,
        credentials: &'a P,
        clock: &'a C,
    ) -> Self {
        Self {
            config,
            runner,
            http,
            credentials,
            clock,
        }
    }

    /// Run both steps
    #[must_use]
    pub fn run(&self) -> FixReport {
        log::info!("🚀 Deploying latest Supabase functions...");
        let work_dir = self.config.deploy.project_dir.join(&self.config.fix.working_dir);
        let deploy_attempts = attempt_in_order(
            self.runner,
            self.clock,
            &self.config.fix.commands,
            &work_dir,
            self.config.deploy.command_timeout(),
            self.config.deploy.retry_delay(),
        );
        let deployed = successful_attempt(&deploy_attempts).is_some();
        if deployed {
            log::info!("✅ Supabase function deployed successfully");
        } else {
            log::warn!("⚠️ Supabase deployment failed, but continuing with Shopify fix...");
        }

        log::info!("🚨 Reconciling storefront script tags...");
        let reconcile = ScriptTagReconciler::new(
            &self.config.storefront,
            self.http,
            self.credentials,
            self.clock,
        )
        .run();

        FixReport {
            deploy_attempts,
            deployed,
            reconcile,
        }
    }
}
