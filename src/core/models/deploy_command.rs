//! Deploy command definitions
//!
//! A deploy command is one fallback invocation of a platform CLI. Commands
//! are static configuration: they are built once and never mutated.

use serde::{Deserialize, Serialize};

/// One external deploy invocation with a human-readable description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployCommand {
    /// Program to execute (looked up on `PATH`)
    pub program: String,
    /// Arguments passed to the program, in order
    #[serde(default)]
    pub args: Vec<String>,
    /// What this variant does, used in logs
    pub description: String,
}

impl DeployCommand {
    /// Create a command from a program, its arguments and a description
    #[must_use]
    pub fn new<I, S>(program: impl Into<String>, args: I, description: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            description: description.into(),
        }
    }

    /// The full command line, space separated
    #[must_use]
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl std::fmt::Display for DeployCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.command_line())
    }
}

/// The fallback chain for deploying `function` to `project_ref`
///
/// Order matters: the first variant pins the project, the second relies on a
/// linked project, and the last two swap the package runner.
#[must_use]
pub fn default_deploy_commands(function: &str, project_ref: &str) -> Vec<DeployCommand> {
    let deploy = ["supabase", "functions", "deploy", function];
    let pinned = ["--project-ref", project_ref, "--no-verify-jwt"];

    vec![
        DeployCommand::new(
            "npx",
            deploy.iter().chain(pinned.iter()).copied(),
            "Deploying with npx supabase (with project ref)",
        ),
        DeployCommand::new(
            "npx",
            deploy.iter().copied().chain(["--no-verify-jwt"]),
            "Deploying with npx supabase (without project ref)",
        ),
        DeployCommand::new(
            "yarn",
            ["dlx"].into_iter().chain(deploy.iter().chain(pinned.iter()).copied()),
            "Deploying with yarn dlx supabase",
        ),
        DeployCommand::new(
            "bunx",
            deploy.iter().chain(pinned.iter()).copied(),
            "Deploying with bunx supabase",
        ),
    ]
}
