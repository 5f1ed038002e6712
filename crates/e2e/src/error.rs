//! Error types for E2E testing

use thiserror::Error;

#[derive(Error, Debug)]
pub enum E2eError {
    #[error("WebDriver failed to start: {0}")]
    DriverStartup(String),

    #[error("WebDriver status check failed after {0} attempts")]
    DriverStatusCheck(usize),

    #[error("WebDriver error '{error}': {message}")]
    WebDriver { error: String, message: String },

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Unexpected WebDriver response: {0}")]
    Protocol(String),

    #[error("Assertion failed: {0}")]
    AssertionFailed(String),

    #[error("Unknown model element: {0}")]
    UnknownModelElement(String),

    #[error("Invalid model: {0}")]
    InvalidModel(String),

    #[error("Transition '{transition}' is not possible from '{state}'")]
    InvalidTransition { state: String, transition: String },

    #[error("Scenario not found: {0}")]
    ScenarioNotFound(String),

    #[error("Booking API returned no {0}")]
    EmptyApiResponse(&'static str),

    #[error("Timeout waiting for: {0}")]
    Timeout(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Screenshot decode error: {0}")]
    Screenshot(#[from] base64::DecodeError),

    #[error(transparent)]
    Common(#[from] booker_common::Error),
}

pub type E2eResult<T> = Result<T, E2eError>;

/// Fail with [`E2eError::AssertionFailed`] unless `actual == expected`
pub fn assert_text(actual: &str, expected: &str, what: &str) -> E2eResult<()> {
    if actual == expected {
        Ok(())
    } else {
        Err(E2eError::AssertionFailed(format!(
            "{}: expected {:?}, got {:?}",
            what, expected, actual
        )))
    }
}

/// Fail with [`E2eError::AssertionFailed`] unless `condition` holds
pub fn assert_that(condition: bool, message: &str) -> E2eResult<()> {
    if condition {
        Ok(())
    } else {
        Err(E2eError::AssertionFailed(message.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assert_text() {
        assert!(assert_text("a", "a", "x").is_ok());
        let err = assert_text("a", "b", "feedback").unwrap_err();
        assert_eq!(err.to_string(), "Assertion failed: feedback: expected \"b\", got \"a\"");
    }

    #[test]
    fn test_assert_that() {
        assert!(assert_that(true, "never").is_ok());
        assert!(matches!(assert_that(false, "form missing"), Err(E2eError::AssertionFailed(m)) if m == "form missing"));
    }
}
