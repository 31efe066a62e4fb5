//! Intent-to-action dispatch: validation, native-first channel selection with a
//! single remote fallback, and normalization into an [`Outcome`].

pub mod channel;
pub mod classifier;
pub mod config;
mod dispatcher;
pub mod error;
pub mod remote;
pub mod validation;

pub use channel::{Action, NativeCapability, NativeChannel, RemoteChannel, Route, Served};
pub use classifier::Classifier;
pub use config::{load_settings, DispatcherSettings};
pub use dispatcher::{Dispatcher, Turn, GENERIC_REPLY, UNREACHABLE_MESSAGE};
pub use error::{ChannelError, ClassifierError, DispatchError, ValidationError};
pub use remote::HttpRemoteChannel;
pub use shared::domain::Outcome;

#[cfg(test)]
#[path = "tests/remote_tests.rs"]
mod remote_tests;
