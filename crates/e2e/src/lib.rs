//! Booker E2E Test Framework
//!
//! This crate drives a real browser against the hotel booking demo site:
//! - Spawns geckodriver as a subprocess and speaks W3C WebDriver to it
//! - Wraps each view of the site in a page object
//! - Cross-checks the UI against the booking API
//! - Walks model graphs of the site, built in or loaded from GraphWalker files
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    E2E Test Runner (Rust)                   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  TestRunner                                                  │
//! │    ├── start_driver() -> DriverHandle                       │
//! │    ├── per scenario: Session::start() ... tear_down()       │
//! │    └── write_results() -> test-results.json                 │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Scenario (ch1, ch1n, ch2, ch3, model)                      │
//! │    ├── pages: FrontPage { ContactForm, Rooms }              │
//! │    │          AdminPage { Inbox, AdminRooms }               │
//! │    ├── api: BookerApi (GET /room, GET /booking)             │
//! │    └── model: ModelGraph + ModelHarness (v_* / e_*)         │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod driver;
pub mod error;
pub mod model;
pub mod pages;
pub mod runner;
pub mod scenario;
pub mod webdriver;

pub use api::BookerApi;
pub use error::{E2eError, E2eResult};
pub use model::{ModelGraph, ModelHarness, ModelKind};
pub use runner::{RunnerConfig, TestResult, TestRunner, TestSuiteResult};
pub use scenario::{Scenario, ScenarioKind};
pub use webdriver::{Browser, Session, SessionConfig};
