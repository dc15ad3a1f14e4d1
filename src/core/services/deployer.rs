//! Deployment attempt service
//!
//! Drives the fallback chain:
//!
//! ```text
//! Idle → Probing → AlreadyDeployed
//!                → NeedsDeploy → Attempting(1) → ... → Attempting(N) → AllFailed
//!                                      └→ Succeeded → PostDeployVerify
//!                                                        → Verified | Unverified
//! ```
//!
//! Every command failure (non-zero exit, timeout, spawn error) is treated
//! the same way: back off and try the next one.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use super::probe::probe_function;
use crate::config::DeployConfig;
use crate::core::models::{DeployCommand, ProbeResult};
use crate::core::ports::{Clock, CommandError, CommandOutput, CommandRunner, HttpClient};

/// Fatal precondition failures
#[derive(Debug, Error)]
pub enum DeployError {
    /// A file the deploy needs is not on disk
    #[error("required file missing: {}", .0.display())]
    MissingFile(PathBuf),
}

/// Position in the deploy state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployState {
    /// Nothing done yet
    Idle,
    /// Pre-deploy probe in flight
    Probing,
    /// Pre-deploy probe succeeded (terminal)
    AlreadyDeployed,
    /// Pre-deploy probe failed
    NeedsDeploy,
    /// Running command `i` (1-based)
    Attempting(usize),
    /// Command `i` exited zero
    Succeeded(usize),
    /// Waiting for propagation, then probing again
    PostDeployVerify,
    /// Post-deploy probe succeeded (terminal)
    Verified,
    /// Post-deploy probe failed (terminal, degraded)
    Unverified,
    /// Every command failed (terminal)
    AllFailed,
}

impl DeployState {
    /// Whether no further transition can happen
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::AlreadyDeployed | Self::Verified | Self::Unverified | Self::AllFailed)
    }
}

impl std::fmt::Display for DeployState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Probing => write!(f, "probing"),
            Self::AlreadyDeployed => write!(f, "already-deployed"),
            Self::NeedsDeploy => write!(f, "needs-deploy"),
            Self::Attempting(i) => write!(f, "attempting({i})"),
            Self::Succeeded(i) => write!(f, "succeeded({i})"),
            Self::PostDeployVerify => write!(f, "post-deploy-verify"),
            Self::Verified => write!(f, "verified"),
            Self::Unverified => write!(f, "unverified"),
            Self::AllFailed => write!(f, "all-failed"),
        }
    }
}

/// How a single attempt ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum AttemptOutcome {
    /// Exit code zero
    Succeeded,
    /// Anything else
    Failed {
        /// Exit code, timeout or spawn error
        reason: String,
    },
}

/// Record of one command that was run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttemptRecord {
    /// 1-based position in the chain
    pub index: usize,
    /// Command description
    pub description: String,
    /// Full command line
    pub command_line: String,
    /// How it ended
    #[serde(flatten)]
    pub outcome: AttemptOutcome,
}

impl AttemptRecord {
    /// Whether this attempt succeeded
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.outcome == AttemptOutcome::Succeeded
    }
}

/// Terminal result of a deployment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DeployOutcome {
    /// The function was already live; nothing ran
    AlreadyDeployed {
        /// Public function URL
        function_url: String,
    },
    /// A command succeeded and the probe confirmed it
    Verified {
        /// 1-based index of the command that succeeded
        command_index: usize,
        /// Public function URL
        function_url: String,
        /// URL with the test shop parameter
        test_url: String,
    },
    /// A command succeeded but the probe did not confirm it
    Unverified {
        /// 1-based index of the command that succeeded
        command_index: usize,
        /// What the post-deploy probe saw
        probe: ProbeResult,
    },
    /// No command succeeded
    AllFailed {
        /// Steps for deploying by hand
        manual_steps: Vec<String>,
    },
}

impl DeployOutcome {
    /// The terminal state this outcome corresponds to
    #[must_use]
    pub const fn state(&self) -> DeployState {
        match self {
            Self::AlreadyDeployed { .. } => DeployState::AlreadyDeployed,
            Self::Verified { .. } => DeployState::Verified,
            Self::Unverified { .. } => DeployState::Unverified,
            Self::AllFailed { .. } => DeployState::AllFailed,
        }
    }
}

/// Full account of a deployment run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeployReport {
    /// Function that was deployed
    pub function_name: String,
    /// Project it was deployed to
    pub project_id: String,
    /// Result of the idempotence probe
    pub pre_check: ProbeResult,
    /// Commands that were run, in order
    pub attempts: Vec<AttemptRecord>,
    /// How it ended
    #[serde(flatten)]
    pub outcome: DeployOutcome,
}

/// Steps an operator can follow when every automated variant failed
#[must_use]
pub fn manual_deploy_steps(function: &str, project_id: &str) -> Vec<String> {
    vec![
        "npm install -g supabase".to_string(),
        "supabase login".to_string(),
        format!("supabase functions deploy {function} --project-ref {project_id} --no-verify-jwt"),
    ]
}

/// The parts of a command's output worth logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandEcho<'a> {
    /// Trimmed stdout, if non-empty
    pub stdout: Option<&'a str>,
    /// Trimmed stderr, if non-empty and not a warning
    pub stderr: Option<&'a str>,
}

impl<'a> CommandEcho<'a> {
    /// Select what to log from `output`
    ///
    /// Stderr mentioning "warning" in any case is dropped entirely.
    #[must_use]
    pub fn of(output: &'a CommandOutput) -> Self {
        let stdout = Some(output.stdout.trim()).filter(|s| !s.is_empty());
        let stderr = Some(output.stderr.trim())
            .filter(|s| !s.is_empty() && !s.to_lowercase().contains("warning"));
        Self { stdout, stderr }
    }
}

fn run_one<R: CommandRunner>(
    runner: &R,
    command: &DeployCommand,
    work_dir: &Path,
    timeout: Duration,
) -> AttemptOutcome {
    log::info!("🔄 {}", command.description);
    log::info!("   Command: {}", command.command_line());

    let output = match runner.run(command, work_dir, timeout) {
        Ok(output) => output,
        Err(e) => {
            if matches!(e, CommandError::Timeout(_)) {
                log::error!("❌ Command timed out");
            } else {
                log::error!("❌ Command failed: {e}");
            }
            return AttemptOutcome::Failed {
                reason: e.to_string(),
            };
        },
    };

    let echo = CommandEcho::of(&output);
    if let Some(stdout) = echo.stdout {
        log::info!("📤 Output: {stdout}");
    }
    if let Some(stderr) = echo.stderr {
        log::warn!("⚠️  Stderr: {stderr}");
    }

    if output.success() {
        log::info!("✅ Command completed successfully");
        AttemptOutcome::Succeeded
    } else {
        let code = output.exit_code.map_or_else(|| "signal".to_string(), |c| c.to_string());
        log::error!("❌ Command failed with code: {code}");
        AttemptOutcome::Failed {
            reason: format!("exit code {code}"),
        }
    }
}

/// Run `commands` in order until one succeeds
///
/// Sleeps `retry_delay` between failed attempts (not after the last one).
/// Commands after the first success are never run. The returned records
/// end with the successful attempt, if there was one.
#[must_use]
pub fn attempt_in_order<R: CommandRunner, C: Clock>(
    runner: &R,
    clock: &C,
    commands: &[DeployCommand],
    work_dir: &Path,
    timeout: Duration,
    retry_delay: Duration,
) -> Vec<AttemptRecord> {
    let mut records = Vec::with_capacity(commands.len());

    for (i, command) in commands.iter().enumerate() {
        if i > 0 {
            clock.sleep(retry_delay);
        }

        let index = i + 1;
        log::debug!("deploy state: {}", DeployState::Attempting(index));
        let outcome = run_one(runner, command, work_dir, timeout);
        let succeeded = outcome == AttemptOutcome::Succeeded;
        records.push(AttemptRecord {
            index,
            description: command.description.clone(),
            command_line: command.command_line(),
            outcome,
        });

        if succeeded {
            log::debug!("deploy state: {}", DeployState::Succeeded(index));
            break;
        }
    }

    records
}

/// Index of the successful attempt, if any
#[must_use]
pub fn successful_attempt(records: &[AttemptRecord]) -> Option<usize> {
    records.iter().find(|r| r.succeeded()).map(|r| r.index)
}

fn check_required_files(paths: &[PathBuf]) -> Result<(), DeployError> {
    log::info!("📋 Checking required files...");
    for path in paths {
        if path.exists() {
            log::info!("✅ Found {}", path.display());
        } else {
            log::error!("❌ Required file missing: {}", path.display());
            return Err(DeployError::MissingFile(path.clone()));
        }
    }
    Ok(())
}

/// Deploys one function through the configured fallback chain
#[derive(Debug)]
pub struct DeploymentAttempt<'a, R, H, C> {
    config: &'a DeployConfig,
    runner: &'a R,
    http: &'a H,
    clock: &'a C,
}

impl<'a, R, H, C> DeploymentAttempt<'a, R, H, C>
where
    R: CommandRunner,
    H: HttpClient,
    C: Clock,
{
    /// Wire up a deployment against the given ports
    #[must_use]
    pub const fn new(
        config: &'a DeployConfig,
        runner: &'a R,
        http: &'a H,
        clock: &'a C,
    ) -> Self {
        Self {
            config,
            runner,
            http,
            clock,
        }
    }

    fn enter(state: DeployState) {
        log::debug!("deploy state: {state}");
    }

    /// Run the whole procedure
    ///
    /// Only a missing required file is an error; every other failure is
    /// reported through [`DeployOutcome`].
    pub fn run(&self) -> Result<DeployReport, DeployError> {
        let config = self.config;
        Self::enter(DeployState::Idle);
        log::info!("📍 Project Directory: {}", config.project_dir.display());
        log::info!("📍 Project ID: {}", config.project_id);
        log::info!("📍 Function Name: {}", config.function_name);

        Self::enter(DeployState::Probing);
        let pre_check = probe_function(self.http, config);

        let report = |attempts: Vec<AttemptRecord>, outcome: DeployOutcome| DeployReport {
            function_name: config.function_name.clone(),
            project_id: config.project_id.clone(),
            pre_check: pre_check.clone(),
            attempts,
            outcome,
        };

        if pre_check.success {
            Self::enter(DeployState::AlreadyDeployed);
            log::info!("🎉 Function is already deployed and working!");
            log::info!("🔗 Function URL: {}", config.function_url());
            return Ok(report(
                Vec::new(),
                DeployOutcome::AlreadyDeployed {
                    function_url: config.function_url(),
                },
            ));
        }

        Self::enter(DeployState::NeedsDeploy);
        check_required_files(&config.required_paths())?;

        let commands = config.deploy_commands();
        let attempts = attempt_in_order(
            self.runner,
            self.clock,
            &commands,
            &config.project_dir,
            config.command_timeout(),
            config.retry_delay(),
        );

        let Some(command_index) = successful_attempt(&attempts) else {
            Self::enter(DeployState::AllFailed);
            let manual_steps = manual_deploy_steps(&config.function_name, &config.project_id);
            log::error!("❌ All deployment commands failed");
            log::info!("🔧 Manual deployment required:");
            for (i, step) in manual_steps.iter().enumerate() {
                log::info!("{}. {step}", i + 1);
            }
            return Ok(report(attempts, DeployOutcome::AllFailed { manual_steps }));
        };

        log::info!("🎉 Deployment command executed successfully!");
        Self::enter(DeployState::PostDeployVerify);
        log::info!("⏳ Waiting for deployment to propagate...");
        self.clock.sleep(config.propagation_delay());

        let verify = probe_function(self.http, config);
        let outcome = if verify.success {
            Self::enter(DeployState::Verified);
            log::info!("✅ DEPLOYMENT SUCCESSFUL AND VERIFIED!");
            log::info!("🔗 Function URLs:");
            log::info!("   Main: {}", config.function_url());
            log::info!("   Test: {}", config.probe_url());
            DeployOutcome::Verified {
                command_index,
                function_url: config.function_url(),
                test_url: config.probe_url(),
            }
        } else {
            Self::enter(DeployState::Unverified);
            log::warn!("⚠️  Deployment completed but verification failed");
            log::warn!("Function may still be starting up. Try testing again in a few minutes.");
            DeployOutcome::Unverified {
                command_index,
                probe: verify,
            }
        };

        Ok(report(attempts, outcome))
    }
}
