//! Output formatting for human and JSON modes
//!
//! Procedures log progress as they go. Once one finishes, its report is
//! rendered here as a human summary or a single JSON document.

use std::fmt::Write as _;

use colored::Colorize;
use serde_json::json;

use crate::core::services::{
    DeployOutcome, DeployReport, FixReport, ReconcileError, ReconcileReport,
};

/// Output mode for the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Human-readable output (default)
    #[default]
    Human,
    /// JSON output (machine-readable)
    Json,
}

/// A report that can be shown to the operator
pub trait Render {
    /// Multi-line human summary
    fn human(&self) -> String;

    /// Machine-readable form
    fn json(&self) -> serde_json::Value;

    /// Print in the requested mode
    fn render(&self, mode: OutputMode) {
        match mode {
            OutputMode::Human => print!("{}", self.human()),
            OutputMode::Json => {
                println!("{}", serde_json::to_string_pretty(&self.json()).unwrap_or_default());
            },
        }
    }
}

impl Render for DeployReport {
    fn human(&self) -> String {
        let mut out = String::new();
        match &self.outcome {
            DeployOutcome::AlreadyDeployed { function_url } => {
                let _ = writeln!(
                    out,
                    "{} {} is already deployed",
                    "LIVE".green().bold(),
                    self.function_name
                );
                let _ = writeln!(out, "  URL: {function_url}");
            },
            DeployOutcome::Verified {
                command_index,
                function_url,
                test_url,
            } => {
                let _ = writeln!(
                    out,
                    "{} {} deployed to {} (variant {command_index})",
                    "VERIFIED".green().bold(),
                    self.function_name,
                    self.project_id
                );
                let _ = writeln!(out, "  Main: {function_url}");
                let _ = writeln!(out, "  Test: {test_url}");
            },
            DeployOutcome::Unverified {
                command_index,
                probe,
            } => {
                let _ = writeln!(
                    out,
                    "{} {} deployed (variant {command_index}) but the endpoint did not confirm it",
                    "UNVERIFIED".yellow().bold(),
                    self.function_name
                );
                match (probe.status, &probe.error) {
                    (_, Some(error)) => {
                        let _ = writeln!(out, "  Probe error: {error}");
                    },
                    (Some(status), None) => {
                        let _ = writeln!(out, "  Probe status: {status}");
                    },
                    (None, None) => {},
                }
                let _ = writeln!(
                    out,
                    "  The function may still be starting up; probe again in a few minutes."
                );
            },
            DeployOutcome::AllFailed { manual_steps } => {
                let _ = writeln!(
                    out,
                    "{} all {} deployment commands failed",
                    "FAILED".red().bold(),
                    self.attempts.len()
                );
                let _ = writeln!(out, "\nManual deployment required:");
                for (i, step) in manual_steps.iter().enumerate() {
                    let _ = writeln!(out, "  {}. {step}", i + 1);
                }
            },
        }
        out
    }

    fn json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

impl Render for ReconcileReport {
    fn human(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{} script tags reconciled on {}",
            "FIXED".green().bold(),
            self.shop_domain
        );
        let _ = writeln!(
            out,
            "  Removed {} of {} matching tag(s) ({} listed)",
            self.deleted_count(),
            self.matched.len(),
            self.listed
        );
        for failed in self.failed_deletions() {
            let reason = failed
                .status
                .map(|s| format!("HTTP {s}"))
                .or_else(|| failed.error.clone())
                .unwrap_or_default();
            let _ = writeln!(out, "  {} could not delete {}: {reason}", "!".yellow(), failed.id);
        }
        match &self.created {
            Some(tag) => {
                let _ = writeln!(out, "  New Script ID: {}", tag.id);
                let _ = writeln!(out, "  Script URL: {}", tag.src);
            },
            None => {
                let _ = writeln!(out, "  Script URL: {}", self.installed_src);
            },
        }
        let _ = writeln!(out, "\nNext steps:");
        let _ = writeln!(out, "  1. Clear browser cache completely");
        let _ = writeln!(out, "  2. Visit your store with hard refresh (Ctrl+Shift+R)");
        let _ = writeln!(out, "  3. Should see ONLY ONE popup");
        out
    }

    fn json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

impl Render for ReconcileError {
    fn human(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{} {self}", "FAILED".red().bold());
        if let Some(body) = self.body() {
            let _ = writeln!(out, "  Response: {body}");
        }
        if self.mutated_store() {
            let _ = writeln!(
                out,
                "  {} matching tag(s) were already removed; rerun to install the replacement.",
                self.deleted_before_failure()
            );
        }
        let _ = writeln!(out, "  Manual intervention may be required.");
        out
    }

    fn json(&self) -> serde_json::Value {
        json!({
            "success": false,
            "error": self.to_string(),
            "body": self.body(),
            "deleted": self.deleted_before_failure(),
        })
    }
}

impl Render for FixReport {
    fn human(&self) -> String {
        let mut out = String::new();
        if self.deployed {
            let _ = writeln!(out, "Embed function deployed");
        } else {
            let _ = writeln!(
                out,
                "{} embed function deploy failed after {} attempt(s)",
                "!".yellow(),
                self.deploy_attempts.len()
            );
        }
        match &self.reconcile {
            Ok(report) => out.push_str(&report.human()),
            Err(err) => out.push_str(&err.human()),
        }
        out
    }

    fn json(&self) -> serde_json::Value {
        let reconcile = match &self.reconcile {
            Ok(report) => report.json(),
            Err(err) => err.json(),
        };
        json!({
            "deployed": self.deployed,
            "deploy_attempts": self.deploy_attempts,
            "reconcile": reconcile,
            "success": self.succeeded(),
        })
    }
}
