//! Deploy the embed function, then reconcile

use std::process::ExitCode;

use storefront_ops::adapters::{EnvCredentials, ProcessRunner, ReqwestClient, SystemClock};
use storefront_ops::core::services::FixDriver;
use storefront_ops::output::Render;

use super::Context;

/// Run the fix driver, then print the report
pub fn fix(ctx: &Context) -> anyhow::Result<ExitCode> {
    log::info!("🔧 COMPREHENSIVE PROGRAMMATIC FIX");

    let http = ReqwestClient::new(ctx.config.storefront.request_timeout())?;
    let credentials = EnvCredentials::from_config(&ctx.config.storefront, true);
    let report =
        FixDriver::new(&ctx.config, &ProcessRunner, &http, &credentials, &SystemClock).run();

    report.render(ctx.mode);

    Ok(if report.succeeded() {
        ExitCode::SUCCESS
    } else {
        ctx.soft_failure()
    })
}
