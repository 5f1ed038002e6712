//! E2E test harness entry point
//!
//! This file is the test binary that drives the booking site in a browser.
//! Run with: cargo test --package booker-e2e --test e2e -- --run
//!
//! Without `--run` (or `BOOKER_E2E_RUN=1`) it only lists the selected
//! scenarios, so a plain `cargo test` does not need a browser.

use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use booker_common::SuiteConfig;
use booker_e2e::driver::DriverConfig;
use booker_e2e::{Browser, E2eResult, RunnerConfig, Scenario, SessionConfig, TestRunner};

#[derive(Parser, Debug)]
#[command(name = "booker-e2e")]
#[command(about = "E2E test runner for the hotel booking site")]
struct Args {
    /// Suite configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Run only scenarios with this tag (ch1, ch1n, ch2, ch3, model)
    #[arg(short, long)]
    tag: Option<String>,

    /// Run only a specific scenario by name
    #[arg(short, long)]
    name: Option<String>,

    /// List the selected scenarios and exit
    #[arg(long)]
    list: bool,

    /// Actually run the scenarios
    #[arg(long, env = "BOOKER_E2E_RUN")]
    run: bool,

    /// Use a running WebDriver instead of spawning geckodriver
    #[arg(long, env = "WEBDRIVER_URL")]
    webdriver_url: Option<String>,

    /// Path to the geckodriver binary
    #[arg(long, default_value = "geckodriver")]
    geckodriver: PathBuf,

    /// Browser to use (firefox, chromium)
    #[arg(long, default_value = "firefox")]
    browser: Browser,

    /// Run the browser headless
    #[arg(long)]
    headless: bool,

    /// GraphWalker model files to walk instead of the built-in models
    #[arg(long)]
    models: Option<PathBuf>,

    /// Directory for tear-down screenshots
    #[arg(long, default_value = "screenshots")]
    screenshots: PathBuf,

    /// Output directory for results
    #[arg(short, long, default_value = "test-results")]
    output: PathBuf,

    /// Log as JSON lines
    #[arg(long)]
    log_json: bool,

    /// Accepted for `cargo test -- --nocapture`; output is never captured
    #[arg(long, hide = true)]
    nocapture: bool,
}

fn main() {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if args.log_json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    // Run async main
    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: failed to create tokio runtime: {}", e);
            std::process::exit(2);
        }
    };
    let result = rt.block_on(async_main(args));

    match result {
        Ok(true) => std::process::exit(0),
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    }
}

fn select(args: &Args) -> E2eResult<Vec<Scenario>> {
    Ok(match (&args.name, &args.tag) {
        (Some(name), _) => vec![Scenario::named(name)?],
        (None, Some(tag)) => Scenario::tagged(tag),
        (None, None) => Scenario::catalog(),
    })
}

async fn async_main(args: Args) -> E2eResult<bool> {
    let scenarios = select(&args)?;

    if args.list || !args.run {
        for scenario in &scenarios {
            println!("{}", scenario);
        }
        if !args.run && !args.list {
            println!("\n{} scenario(s) selected; pass --run to execute them", scenarios.len());
        }
        return Ok(true);
    }

    let suite = SuiteConfig::load_with_env(&args.config)?;
    info!("Testing {}", suite.base_url());

    let config = RunnerConfig {
        suite,
        driver: DriverConfig {
            binary_path: args.geckodriver,
            ..Default::default()
        },
        session: SessionConfig {
            browser: args.browser,
            headless: args.headless,
            ..Default::default()
        },
        webdriver_url: args.webdriver_url,
        models_dir: args.models,
        screenshot_dir: args.screenshots,
        output_dir: args.output,
    };

    let mut runner = TestRunner::with_config(config);
    runner.load_models()?;

    let results = runner.run_scenarios(&scenarios).await?;
    runner.write_results(&results)?;
    runner.stop_driver()?;

    Ok(results.all_passed())
}
