//! Tests for the deployment attempt procedure

use std::time::Duration;

use storefront_ops::core::ports::{CommandOutput, HttpMethod};
use storefront_ops::core::services::{
    AttemptOutcome, CommandEcho, DeployError, DeployOutcome, DeployState, DeploymentAttempt,
};

use crate::common::fixtures::{TestProject, commands, deploy_config};
use crate::common::mocks::{FakeClock, FakeHttp, FakeRunner, Scripted, probe_sequence};

const LIVE: (u16, &str) = (200, "<html>SmartPop installing...</html>");
const DOWN: (u16, &str) = (404, "Function not found");

// =============================================================================
// ORDERING
// =============================================================================

#[test]
fn test_first_success_stops_the_chain() {
    let project = TestProject::new("install-direct");
    let mut config = deploy_config(project.path());
    config.commands = commands(5);

    for k in 1..=5 {
        let runner = FakeRunner::succeed_at(k);
        let http = probe_sequence(vec![DOWN, LIVE]);
        let clock = FakeClock::default();

        let report = DeploymentAttempt::new(&config, &runner, &http, &clock).run().unwrap();

        let described: Vec<_> = runner.calls().into_iter().map(|c| c.description).collect();
        let expected: Vec<_> = (1..=k).map(|i| format!("variant {i}")).collect();
        assert_eq!(described, expected, "success at {k}");
        assert_eq!(report.attempts.len(), k);
        assert!(report.attempts[..k - 1].iter().all(|a| !a.succeeded()));
        assert!(report.attempts[k - 1].succeeded());
        assert!(matches!(
            report.outcome,
            DeployOutcome::Verified { command_index, .. } if command_index == k
        ));
    }
}

#[test]
fn test_timeout_and_spawn_failure_fall_through() {
    let project = TestProject::new("install-direct");
    let mut config = deploy_config(project.path());
    config.commands = commands(3);

    let runner = FakeRunner::new(vec![Scripted::Timeout, Scripted::NotFound, Scripted::Exit(0)]);
    let http = probe_sequence(vec![DOWN, LIVE]);
    let clock = FakeClock::default();

    let report = DeploymentAttempt::new(&config, &runner, &http, &clock).run().unwrap();

    assert_eq!(runner.call_count(), 3);
    assert!(matches!(
        &report.attempts[0].outcome,
        AttemptOutcome::Failed { reason } if reason.contains("timed out")
    ));
    assert!(matches!(
        &report.attempts[1].outcome,
        AttemptOutcome::Failed { reason } if reason.contains("spawn")
    ));
    assert_eq!(report.outcome.state(), DeployState::Verified);
}

#[test]
fn test_commands_run_in_project_dir_with_timeout() {
    let project = TestProject::new("install-direct");
    let mut config = deploy_config(project.path());
    config.commands = commands(1);
    config.command_timeout_secs = 42;

    let runner = FakeRunner::succeed_at(1);
    let http = probe_sequence(vec![DOWN, LIVE]);
    DeploymentAttempt::new(&config, &runner, &http, &FakeClock::default()).run().unwrap();

    let call = &runner.calls()[0];
    assert_eq!(call.work_dir, project.path());
    assert_eq!(call.timeout, Duration::from_secs(42));
}

// =============================================================================
// PRE-CHECK
// =============================================================================

#[test]
fn test_live_function_skips_deploy() {
    let project = TestProject::empty();
    let config = deploy_config(project.path());
    let runner = FakeRunner::succeed_at(1);
    let http = probe_sequence(vec![LIVE]);
    let clock = FakeClock::default();

    let report = DeploymentAttempt::new(&config, &runner, &http, &clock).run().unwrap();

    assert_eq!(runner.call_count(), 0);
    assert!(report.attempts.is_empty());
    assert!(clock.sleeps().is_empty());
    assert_eq!(http.count(HttpMethod::Get), 1);
    assert!(matches!(
        report.outcome,
        DeployOutcome::AlreadyDeployed { ref function_url }
            if function_url == "https://proj123.supabase.co/functions/v1/install-direct"
    ));
}

#[test]
fn test_200_without_marker_still_deploys() {
    let project = TestProject::new("install-direct");
    let mut config = deploy_config(project.path());
    config.commands = commands(2);
    let runner = FakeRunner::succeed_at(1);
    let http = probe_sequence(vec![(200, "maintenance page"), LIVE]);

    let report =
        DeploymentAttempt::new(&config, &runner, &http, &FakeClock::default()).run().unwrap();

    assert_eq!(runner.call_count(), 1);
    assert_eq!(report.pre_check.status, Some(200));
    assert!(!report.pre_check.success);
}

#[test]
fn test_probe_sends_shop_and_user_agent() {
    let project = TestProject::empty();
    let config = deploy_config(project.path());
    let http = probe_sequence(vec![LIVE]);

    DeploymentAttempt::new(&config, &FakeRunner::always_fail(), &http, &FakeClock::default())
        .run()
        .unwrap();

    let req = &http.requests()[0];
    assert_eq!(
        req.url,
        "https://proj123.supabase.co/functions/v1/install-direct?shop=testingstoresumeet.myshopify.com"
    );
    assert!(req.header_value("user-agent").unwrap().contains("SmartPop-Test"));
    assert_eq!(req.timeout, Some(Duration::from_secs(10)));
}

// =============================================================================
// FAILURE AND DEGRADED OUTCOMES
// =============================================================================

#[test]
fn test_all_failed_emits_manual_steps() {
    let project = TestProject::new("install-direct");
    let config = deploy_config(project.path());
    let runner = FakeRunner::always_fail();
    let http = probe_sequence(vec![DOWN]);
    let clock = FakeClock::default();

    let report = DeploymentAttempt::new(&config, &runner, &http, &clock).run().unwrap();

    // Built-in chain has four variants
    assert_eq!(runner.call_count(), 4);
    let DeployOutcome::AllFailed { manual_steps } = &report.outcome else {
        panic!("expected AllFailed, got {:?}", report.outcome);
    };
    let text = manual_steps.join("\n");
    assert!(text.contains("install-direct"));
    assert!(text.contains("proj123"));
    // No post-deploy probe
    assert_eq!(http.count(HttpMethod::Get), 1);
}

#[test]
fn test_failed_verification_is_unverified_not_failure() {
    let project = TestProject::new("install-direct");
    let mut config = deploy_config(project.path());
    config.commands = commands(2);
    let runner = FakeRunner::succeed_at(2);
    let http = probe_sequence(vec![DOWN, DOWN]);

    let report =
        DeploymentAttempt::new(&config, &runner, &http, &FakeClock::default()).run().unwrap();

    match report.outcome {
        DeployOutcome::Unverified {
            command_index,
            probe,
        } => {
            assert_eq!(command_index, 2);
            assert_eq!(probe.status, Some(404));
        },
        other => panic!("expected Unverified, got {other:?}"),
    }
}

#[test]
fn test_unreachable_endpoint_after_deploy_is_unverified() {
    let project = TestProject::new("install-direct");
    let mut config = deploy_config(project.path());
    config.commands = commands(1);
    let runner = FakeRunner::succeed_at(1);
    let http = FakeHttp::unreachable();

    let report =
        DeploymentAttempt::new(&config, &runner, &http, &FakeClock::default()).run().unwrap();

    assert!(report.pre_check.error.is_some());
    assert_eq!(report.outcome.state(), DeployState::Unverified);
}

#[test]
fn test_missing_required_file_is_fatal() {
    let project = TestProject::empty();
    let config = deploy_config(project.path());
    let runner = FakeRunner::succeed_at(1);
    let http = probe_sequence(vec![DOWN]);

    let err = DeploymentAttempt::new(&config, &runner, &http, &FakeClock::default())
        .run()
        .unwrap_err();

    assert!(matches!(err, DeployError::MissingFile(ref p) if p.ends_with("index.ts")));
    assert_eq!(runner.call_count(), 0);
}

#[test]
fn test_custom_required_files() {
    let project = TestProject::empty();
    std::fs::write(project.path().join("deno.json"), "{}").unwrap();
    let mut config = deploy_config(project.path());
    config.required_files = vec!["deno.json".into()];
    config.commands = commands(1);
    let runner = FakeRunner::succeed_at(1);

    let http = probe_sequence(vec![DOWN, LIVE]);
    let clock = FakeClock::default();
    let report = DeploymentAttempt::new(&config, &runner, &http, &clock).run().unwrap();
    assert_eq!(report.outcome.state(), DeployState::Verified);
}

// =============================================================================
// TIMING
// =============================================================================

#[test]
fn test_backoff_between_attempts_and_propagation_wait() {
    let project = TestProject::new("install-direct");
    let mut config = deploy_config(project.path());
    config.commands = commands(3);
    let runner = FakeRunner::succeed_at(3);
    let http = probe_sequence(vec![DOWN, LIVE]);
    let clock = FakeClock::default();

    DeploymentAttempt::new(&config, &runner, &http, &clock).run().unwrap();

    assert_eq!(
        clock.sleeps(),
        vec![Duration::from_secs(2), Duration::from_secs(2), Duration::from_secs(5)]
    );
}

#[test]
fn test_no_trailing_backoff_when_all_fail() {
    let project = TestProject::new("install-direct");
    let mut config = deploy_config(project.path());
    config.commands = commands(3);
    let clock = FakeClock::default();

    DeploymentAttempt::new(&config, &FakeRunner::always_fail(), &probe_sequence(vec![DOWN]), &clock)
        .run()
        .unwrap();

    assert_eq!(clock.sleeps(), vec![Duration::from_secs(2); 2]);
}

#[test]
fn test_terminal_states() {
    assert!(DeployState::Verified.is_terminal());
    assert!(DeployState::Unverified.is_terminal());
    assert!(DeployState::AllFailed.is_terminal());
    assert!(DeployState::AlreadyDeployed.is_terminal());
    assert!(!DeployState::Attempting(1).is_terminal());
    assert_eq!(DeployState::Attempting(3).to_string(), "attempting(3)");
}

// =============================================================================
// COMMAND OUTPUT
// =============================================================================

fn output(stdout: &str, stderr: &str) -> CommandOutput {
    CommandOutput {
        exit_code: Some(0),
        stdout: stdout.to_string(),
        stderr: stderr.to_string(),
    }
}

#[test]
fn test_warning_stderr_is_not_echoed() {
    let out = output("", "WARNING: x");
    assert_eq!(CommandEcho::of(&out).stderr, None);

    let out = output("", "npm Warning: deprecated package");
    assert_eq!(CommandEcho::of(&out).stderr, None);
}

#[test]
fn test_real_stderr_is_echoed_trimmed() {
    let out = output("", "  boom\n");
    assert_eq!(CommandEcho::of(&out).stderr, Some("boom"));
}

#[test]
fn test_blank_stdout_is_skipped() {
    let out = output(" \n\t ", "");
    let echo = CommandEcho::of(&out);
    assert_eq!(echo.stdout, None);
    assert_eq!(echo.stderr, None);

    let out = output("Deployed Function install-direct\n", "");
    assert_eq!(CommandEcho::of(&out).stdout, Some("Deployed Function install-direct"));
}

#[test]
fn test_noisy_output_does_not_change_the_outcome() {
    let project = TestProject::new("install-direct");
    let mut config = deploy_config(project.path());
    config.commands = commands(2);

    let runner = FakeRunner::succeed_at(2).with_output("Bundling...", "WARNING: outdated cli");
    let http = probe_sequence(vec![DOWN, LIVE]);
    let clock = FakeClock::default();

    let report = DeploymentAttempt::new(&config, &runner, &http, &clock).run().unwrap();
    assert_eq!(runner.call_count(), 2);
    assert!(matches!(report.outcome, DeployOutcome::Verified { command_index: 2, .. }));
}
