use crate::workflow::SessionState;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Browser error: {0}")]
    Browser(String),

    #[error("CDP error: {0}")]
    Cdp(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Timed out after {waited:?} waiting for {locator} to become visible")]
    Timeout { locator: String, waited: Duration },

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Workflow failed while {state}, at step '{step}': {source}")]
    StepFailed {
        state: SessionState,
        step: String,
        #[source]
        source: Box<Error>,
    },

    #[error("Cannot {action} while {state}")]
    InvalidTransition {
        state: SessionState,
        action: &'static str,
    },

    #[error("Browser session cancelled")]
    Cancelled,
}

impl From<chromiumoxide::error::CdpError> for Error {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        Error::Cdp(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
