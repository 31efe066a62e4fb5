use std::time::Duration;

use thiserror::Error;

use crate::channel::{Action, Route};

/// Malformed or missing intent parameters. Never reaches a channel.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("invalid NACA code '{0}'")]
    NacaCode(String),
    #[error("chord must be greater than 0 mm, got {0}")]
    Chord(f64),
    #[error("AUW and duration must both be greater than 0 (auw_g={auw_g}, duration_min={duration_min})")]
    Propulsion { auw_g: f64, duration_min: f64 },
    #[error("missing part_id")]
    MissingPartId,
    #[error("parameter '{name}' is not a number")]
    NotANumber { name: &'static str },
}

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("native {action} failed: {detail}")]
    Native { action: Action, detail: String },
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered {status}: {detail}")]
    Status {
        url: String,
        status: u16,
        detail: String,
    },
    #[error("malformed response from {url}: {detail}")]
    Decode { url: String, detail: String },
    #[error("{route} {action} did not finish within {after:?}")]
    Timeout {
        route: Route,
        action: Action,
        after: Duration,
    },
    #[error("{0}")]
    Other(String),
}

impl ChannelError {
    pub fn native(action: Action, detail: impl Into<String>) -> Self {
        Self::Native {
            action,
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("classifier unreachable: {0}")]
    Unavailable(String),
    #[error("classifier answered with an unreadable envelope: {0}")]
    Malformed(String),
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// Every channel that was tried failed; carries the last failure.
    #[error("{action} failed: {last}")]
    Terminal { action: Action, last: ChannelError },
    #[error(transparent)]
    ClassifierUnavailable(#[from] ClassifierError),
}
