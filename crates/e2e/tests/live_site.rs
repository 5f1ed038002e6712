//! Scenarios against the live booking site
//!
//! Every test here is ignored: they need geckodriver, Firefox and network
//! access. Run with: cargo test --package booker-e2e --test live_site -- --ignored

use std::path::PathBuf;

use booker_common::SuiteConfig;
use booker_e2e::{RunnerConfig, Scenario, SessionConfig, TestRunner, TestSuiteResult};

fn live_runner() -> TestRunner {
    let suite = SuiteConfig::load_with_env(&PathBuf::from("config.toml")).unwrap();
    TestRunner::with_config(RunnerConfig {
        suite,
        session: SessionConfig {
            headless: true,
            ..Default::default()
        },
        webdriver_url: std::env::var("WEBDRIVER_URL").ok(),
        ..Default::default()
    })
}

fn assert_all_passed(suite: &TestSuiteResult) {
    for result in &suite.results {
        assert!(result.success, "{} failed: {:?}", result.name, result.error);
    }
}

/// Contact form against the live site.
///
/// Marked ignored because it needs geckodriver, Firefox and network access.
#[tokio::test]
#[ignore]
async fn live_contact_form_chapter() {
    let mut runner = live_runner();
    let suite = runner.run_tagged("ch1").await.unwrap();
    assert_eq!(suite.total, 2);
    assert_all_passed(&suite);
}

/// Two nights from today show up in the confirmation and in the API.
///
/// Marked ignored because it creates a real booking on the site.
#[tokio::test]
#[ignore]
async fn live_book_two_nights() {
    let mut runner = live_runner();
    let suite = runner.run_test("book_successful").await.unwrap();
    assert_all_passed(&suite);
}

/// Seeded random walks over every model.
///
/// Marked ignored because a walk takes minutes in a real browser.
#[tokio::test]
#[ignore]
async fn live_model_walks() {
    let mut runner = live_runner();
    let scenarios = Scenario::tagged("model");
    let suite = runner.run_scenarios(&scenarios).await.unwrap();
    assert_eq!(suite.total, scenarios.len());
    assert_all_passed(&suite);
}
