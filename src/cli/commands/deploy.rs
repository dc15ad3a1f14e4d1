//! Deploy the configured edge function

use std::process::ExitCode;

use storefront_ops::adapters::{ProcessRunner, ReqwestClient, SystemClock};
use storefront_ops::core::services::{DeployOutcome, DeploymentAttempt};
use storefront_ops::output::Render;

use super::Context;

/// Deploy, then print the report
pub fn deploy(ctx: &Context) -> anyhow::Result<ExitCode> {
    let config = &ctx.config.deploy;
    log::info!("🚀 Deployment starting...");

    let http = ReqwestClient::new(config.probe_timeout())?;
    let attempt = DeploymentAttempt::new(config, &ProcessRunner, &http, &SystemClock);

    let report = match attempt.run() {
        Ok(report) => report,
        Err(e) => {
            log::error!("❌ {e}");
            log::error!("❌ Required files missing. Cannot proceed.");
            return Ok(ExitCode::FAILURE);
        },
    };

    report.render(ctx.mode);

    Ok(match report.outcome {
        DeployOutcome::AlreadyDeployed { .. } | DeployOutcome::Verified { .. } => ExitCode::SUCCESS,
        DeployOutcome::Unverified { .. } if ctx.strict => ExitCode::from(2),
        DeployOutcome::Unverified { .. } => ExitCode::SUCCESS,
        DeployOutcome::AllFailed { .. } => ctx.soft_failure(),
    })
}
