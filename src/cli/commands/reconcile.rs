//! Reconcile storefront script tags

use std::process::ExitCode;

use storefront_ops::adapters::{EnvCredentials, ReqwestClient, SystemClock};
use storefront_ops::core::services::ScriptTagReconciler;
use storefront_ops::output::Render;

use super::Context;

/// Reconcile, then print the report
pub fn reconcile(ctx: &Context) -> anyhow::Result<ExitCode> {
    let config = &ctx.config.storefront;
    log::info!("🚨 Script tag reconciliation starting...");

    let http = ReqwestClient::new(config.request_timeout())?;
    let credentials = EnvCredentials::from_config(config, true);

    match ScriptTagReconciler::new(config, &http, &credentials, &SystemClock).run() {
        Ok(report) => {
            report.render(ctx.mode);
            Ok(ExitCode::SUCCESS)
        },
        Err(e) => {
            e.render(ctx.mode);
            Ok(ctx.soft_failure())
        },
    }
}
