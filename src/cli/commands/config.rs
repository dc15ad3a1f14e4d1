//! Print the effective configuration

use std::process::ExitCode;

use storefront_ops::output::OutputMode;

use super::Context;

/// Print the configuration in the selected output mode
pub fn show_config(ctx: &Context) -> anyhow::Result<ExitCode> {
    match ctx.mode {
        OutputMode::Human => print!("{}", ctx.config.to_toml()?),
        OutputMode::Json => println!("{}", serde_json::to_string_pretty(&ctx.config)?),
    }
    Ok(ExitCode::SUCCESS)
}
