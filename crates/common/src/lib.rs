//! Booker Common Library
//!
//! Shared configuration, error types and constrained test data for the
//! booker end-to-end suite.

pub mod config;
pub mod error;
pub mod faker;
pub mod rules;
pub mod stay;

// Re-export commonly used types
pub use config::{AppConfig, OtherConfig, SuiteConfig};
pub use error::{Error, Result};
pub use faker::{BookingContact, ContactData, ContactFaker};
pub use rules::ContactField;
pub use stay::StayDates;

/// Suite version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
