//! Tests for the deploy-then-reconcile driver

use storefront_ops::config::OpsConfig;
use storefront_ops::core::ports::{HttpMethod, HttpResponse};
use storefront_ops::core::services::FixDriver;

use crate::common::fixtures::{commands, created_body, list_body, storefront_config, tag};
use crate::common::mocks::{FakeClock, FakeHttp, FakeRunner, StaticCredentials};

fn admin_api() -> FakeHttp {
    let listing = list_body(&[tag(1, "https://x/popup.js"), tag(2, "https://x/popup-2.js")]);
    FakeHttp::new(move |req| {
        Ok(match req.method {
            HttpMethod::Get => HttpResponse::new(200, listing.clone()),
            HttpMethod::Delete => HttpResponse::new(204, ""),
            HttpMethod::Post => {
                HttpResponse::new(201, created_body(77, "https://fn.example.com/x"))
            },
        })
    })
}

fn config() -> OpsConfig {
    let mut config = OpsConfig::default();
    config.deploy.project_dir = "/srv/app".into();
    config.storefront = storefront_config();
    config
}

#[test]
fn test_deploy_runs_in_working_dir_before_reconcile() {
    let config = config();
    let runner = FakeRunner::succeed_at(1);
    let http = admin_api();

    let report = FixDriver::new(
        &config,
        &runner,
        &http,
        &StaticCredentials::token("t"),
        &FakeClock::default(),
    )
    .run();

    assert!(report.deployed);
    assert!(report.succeeded());
    let calls = runner.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].work_dir, std::path::Path::new("/srv/app/supabase"));
    assert_eq!(
        calls[0].command_line,
        "npx supabase functions deploy popup-embed-public --no-verify-jwt"
    );
    assert_eq!(report.reconcile.unwrap().deleted_count(), 2);
}

#[test]
fn test_deploy_failure_still_reconciles() {
    let mut config = config();
    config.fix.commands = commands(2);
    let runner = FakeRunner::always_fail();
    let http = admin_api();
    let clock = FakeClock::default();

    let report =
        FixDriver::new(&config, &runner, &http, &StaticCredentials::token("t"), &clock).run();

    assert!(!report.deployed);
    assert_eq!(report.deploy_attempts.len(), 2);
    assert_eq!(runner.call_count(), 2);
    assert_eq!(http.count(HttpMethod::Post), 1);
    assert!(report.succeeded());
}

#[test]
fn test_reconcile_failure_is_reported() {
    let config = config();
    let http = FakeHttp::fixed(403, "forbidden");

    let report = FixDriver::new(
        &config,
        &FakeRunner::succeed_at(1),
        &http,
        &StaticCredentials::token("t"),
        &FakeClock::default(),
    )
    .run();

    assert!(report.deployed);
    assert!(!report.succeeded());
    assert_eq!(http.requests().len(), 1);
}
