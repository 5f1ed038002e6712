//! Test runner: WebDriver process, one browser session per scenario, results

use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use booker_common::{ContactFaker, SuiteConfig};

use crate::driver::{DriverConfig, DriverHandle};
use crate::error::E2eResult;
use crate::model::{GraphWalkerFile, ModelGraph};
use crate::scenario::{Outcome, Scenario, ScenarioContext};
use crate::webdriver::{Session, SessionConfig};

/// Result of running a single scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    pub name: String,
    pub tags: Vec<String>,
    pub success: bool,
    pub skipped: bool,
    pub duration_ms: u64,
    pub screenshot: Option<String>,
    pub error: Option<String>,
}

/// Result of running a set of scenarios
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestSuiteResult {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub duration_ms: u64,
    pub seed: u64,
    pub results: Vec<TestResult>,
}

impl TestSuiteResult {
    pub fn from_results(seed: u64, duration_ms: u64, results: Vec<TestResult>) -> Self {
        let skipped = results.iter().filter(|r| r.skipped).count();
        let passed = results.iter().filter(|r| r.success && !r.skipped).count();
        let failed = results.iter().filter(|r| !r.success).count();
        Self {
            total: results.len(),
            passed,
            failed,
            skipped,
            duration_ms,
            seed,
            results,
        }
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }
}

/// Configuration for the test runner
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    pub suite: SuiteConfig,
    pub driver: DriverConfig,
    pub session: SessionConfig,

    /// Use an already running WebDriver instead of spawning one
    pub webdriver_url: Option<String>,

    /// GraphWalker model files replacing the built-in graphs
    pub models_dir: Option<PathBuf>,

    pub screenshot_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            suite: SuiteConfig::default(),
            driver: DriverConfig::default(),
            session: SessionConfig::default(),
            webdriver_url: None,
            models_dir: None,
            screenshot_dir: PathBuf::from("screenshots"),
            output_dir: PathBuf::from("test-results"),
        }
    }
}

/// Main E2E test runner
pub struct TestRunner {
    config: RunnerConfig,

    /// Spawned WebDriver process (if any)
    driver: Option<DriverHandle>,

    faker: ContactFaker,
    models: Vec<ModelGraph>,
    walk_seed: u64,
}

impl TestRunner {
    pub fn new() -> Self {
        Self::with_config(RunnerConfig::default())
    }

    pub fn with_config(config: RunnerConfig) -> Self {
        let seed = config.suite.other.seed;
        info!("seed: {}", seed);
        Self {
            faker: ContactFaker::new(seed),
            driver: None,
            models: Vec::new(),
            walk_seed: seed,
            config,
        }
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Load the model files, if a models directory is configured.
    ///
    /// A `seed` in a model file takes over as the walk seed and reseeds the
    /// data generator, so a walk and the data it types replay together.
    pub fn load_models(&mut self) -> E2eResult<()> {
        let Some(dir) = &self.config.models_dir else {
            return Ok(());
        };

        for file in GraphWalkerFile::load_all(dir)? {
            if let Some(seed) = file.seed {
                debug!("Model file seeds walks and data with {}", seed);
                self.walk_seed = seed;
                self.faker = ContactFaker::new(seed);
            }
            self.models.extend(file.graphs()?);
        }
        info!("Loaded {} model(s) from {}", self.models.len(), dir.display());
        Ok(())
    }

    /// Spawn the WebDriver unless an external one is configured
    pub async fn start_driver(&mut self) -> E2eResult<()> {
        if self.driver.is_some() || self.config.webdriver_url.is_some() {
            return Ok(());
        }

        let driver = DriverHandle::spawn(self.config.driver.clone()).await?;
        self.driver = Some(driver);
        Ok(())
    }

    pub fn stop_driver(&mut self) -> E2eResult<()> {
        if let Some(mut driver) = self.driver.take() {
            driver.stop()?;
        }
        Ok(())
    }

    fn webdriver_url(&self) -> Option<String> {
        match (&self.config.webdriver_url, &self.driver) {
            (Some(url), _) => Some(url.clone()),
            (None, Some(driver)) => Some(driver.url().to_string()),
            (None, None) => None,
        }
    }

    pub async fn run_all(&mut self) -> E2eResult<TestSuiteResult> {
        self.run_scenarios(&Scenario::catalog()).await
    }

    pub async fn run_tagged(&mut self, tag: &str) -> E2eResult<TestSuiteResult> {
        self.run_scenarios(&Scenario::tagged(tag)).await
    }

    /// Run a specific scenario by name
    pub async fn run_test(&mut self, name: &str) -> E2eResult<TestSuiteResult> {
        let scenario = Scenario::named(name)?;
        self.run_scenarios(std::slice::from_ref(&scenario)).await
    }

    /// Run scenarios one after another; a failure never stops the rest
    pub async fn run_scenarios(&mut self, scenarios: &[Scenario]) -> E2eResult<TestSuiteResult> {
        let start = Instant::now();
        let mut results = Vec::with_capacity(scenarios.len());

        self.start_driver().await?;

        info!("Running {} test(s)...", scenarios.len());

        for scenario in scenarios {
            let result = self.run_scenario(scenario).await;
            if result.skipped {
                warn!("- {} skipped: {}", result.name, result.error.as_deref().unwrap_or(""));
            } else if result.success {
                info!("✓ {} ({} ms)", result.name, result.duration_ms);
            } else {
                error!("✗ {} - {}", result.name, result.error.as_deref().unwrap_or("unknown error"));
            }
            results.push(result);
        }

        let duration_ms = start.elapsed().as_millis() as u64;
        let suite = TestSuiteResult::from_results(self.config.suite.other.seed, duration_ms, results);

        info!("");
        info!(
            "Test Results: {} passed, {} failed, {} skipped ({} ms)",
            suite.passed, suite.failed, suite.skipped, duration_ms
        );

        Ok(suite)
    }

    /// Set up a session, run `scenario`, and tear down even if it failed
    pub async fn run_scenario(&mut self, scenario: &Scenario) -> TestResult {
        let start = Instant::now();
        let mut result = TestResult {
            name: scenario.name.clone(),
            tags: scenario.tags.clone(),
            success: false,
            skipped: false,
            duration_ms: 0,
            screenshot: None,
            error: None,
        };

        let Some(url) = self.webdriver_url() else {
            result.error = Some("no WebDriver is running".to_string());
            return result;
        };

        let session = match Session::start(&url, &self.config.session).await {
            Ok(session) => session,
            Err(e) => {
                result.error = Some(format!("set-up failed: {}", e));
                result.duration_ms = start.elapsed().as_millis() as u64;
                return result;
            }
        };

        let outcome = {
            let mut ctx = ScenarioContext {
                session: &session,
                config: &self.config.suite,
                faker: &mut self.faker,
                models: &self.models,
                walk_seed: self.walk_seed,
            };
            scenario.run(&mut ctx).await
        };

        match outcome {
            Ok(Outcome::Passed) => result.success = true,
            Ok(Outcome::Skipped(reason)) => {
                result.success = true;
                result.skipped = true;
                result.error = Some(reason);
            }
            Err(e) => result.error = Some(e.to_string()),
        }

        result.screenshot = tear_down(session, &self.config.screenshot_dir).await;
        result.duration_ms = start.elapsed().as_millis() as u64;
        result
    }

    /// Write test results to JSON file
    pub fn write_results(&self, results: &TestSuiteResult) -> E2eResult<PathBuf> {
        write_results(&self.config.output_dir, results)
    }
}

impl Default for TestRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TestRunner {
    fn drop(&mut self) {
        let _ = self.stop_driver();
    }
}

/// Screenshot the final page, then close the session. Errors are logged only.
async fn tear_down(session: Session, screenshot_dir: &Path) -> Option<String> {
    let path = screenshot_path(screenshot_dir, &Local::now().format("%Y%m%d-%H%M%S").to_string());

    let saved = match std::fs::create_dir_all(screenshot_dir) {
        Ok(()) => match session.save_screenshot(&path).await {
            Ok(()) => {
                debug!("Screenshot saved to {}", path.display());
                Some(path.to_string_lossy().to_string())
            }
            Err(e) => {
                warn!("Screenshot failed: {}", e);
                None
            }
        },
        Err(e) => {
            warn!("Cannot create {}: {}", screenshot_dir.display(), e);
            None
        }
    };

    if let Err(e) = session.quit().await {
        warn!("Failed to close the browser session: {}", e);
    }
    saved
}

/// `{dir}/result_{timestamp}.png`
pub fn screenshot_path(dir: &Path, timestamp: &str) -> PathBuf {
    dir.join(format!("result_{}.png", timestamp))
}

/// Write `results` to `{output_dir}/test-results.json`
pub fn write_results(output_dir: &Path, results: &TestSuiteResult) -> E2eResult<PathBuf> {
    std::fs::create_dir_all(output_dir)?;

    let path = output_dir.join("test-results.json");
    let json = serde_json::to_string_pretty(results)?;
    std::fs::write(&path, json)?;

    info!("Results written to: {}", path.display());
    Ok(path)
}
