//! Native and remote execution of named CAD actions.

use std::{fmt, future::Future, sync::Arc, time::Duration};

use async_trait::async_trait;
use futures::future::BoxFuture;
use shared::{
    domain::{AirfoilPoint, CgResult, DrcResult, PropulsionOption},
    geometry::NacaCode,
};
use tracing::{debug, warn};

use crate::error::ChannelError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    GenerateAirfoil,
    InsertComponent,
    GetCg,
    CheckDrc,
    ListPropulsion,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::GenerateAirfoil => "generate_airfoil",
            Self::InsertComponent => "insert_component",
            Self::GetCg => "get_cg",
            Self::CheckDrc => "check_drc",
            Self::ListPropulsion => "list_propulsion",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Native,
    Remote,
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Native => "native",
            Self::Remote => "remote",
        })
    }
}

/// In-process automation surface of the CAD host.
#[async_trait]
pub trait NativeChannel: Send + Sync {
    /// Sketches the section in the active document.
    async fn generate_airfoil(&self, code: &NacaCode, chord_mm: f64) -> Result<(), ChannelError>;
    async fn insert_component(&self, asset_ref: &str) -> Result<(), ChannelError>;
    async fn get_cg(&self) -> Result<CgResult, ChannelError>;
    async fn check_drc(&self, part_id: &str) -> Result<DrcResult, ChannelError>;
}

/// Network computation service. Always configured, may still fail per call.
#[async_trait]
pub trait RemoteChannel: Send + Sync {
    async fn generate_airfoil(
        &self,
        code: &NacaCode,
        chord_mm: f64,
    ) -> Result<Vec<AirfoilPoint>, ChannelError>;
    async fn list_propulsion(
        &self,
        auw_g: f64,
        duration_min: f64,
    ) -> Result<Vec<PropulsionOption>, ChannelError>;
    async fn get_cg(&self) -> Result<CgResult, ChannelError>;
    async fn check_drc(&self, part_id: &str) -> Result<DrcResult, ChannelError>;
}

/// Whether the host exposes a native surface. Probing it has no side effects.
#[derive(Clone, Default)]
pub struct NativeCapability(Option<Arc<dyn NativeChannel>>);

impl NativeCapability {
    pub fn absent() -> Self {
        Self(None)
    }

    pub fn present(channel: Arc<dyn NativeChannel>) -> Self {
        Self(Some(channel))
    }

    pub fn is_present(&self) -> bool {
        self.0.is_some()
    }

    pub fn channel(&self) -> Option<&Arc<dyn NativeChannel>> {
        self.0.as_ref()
    }
}

impl fmt::Debug for NativeCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NativeCapability")
            .field(&if self.is_present() { "present" } else { "absent" })
            .finish()
    }
}

/// Which channel produced a result. Native and remote payloads may differ.
#[derive(Debug, Clone, PartialEq)]
pub enum Served<N, R> {
    Native(N),
    Remote(R),
}

pub(crate) async fn bounded<T, F>(
    route: Route,
    action: Action,
    deadline: Option<Duration>,
    call: F,
) -> Result<T, ChannelError>
where
    F: Future<Output = Result<T, ChannelError>>,
{
    match deadline {
        Some(after) => tokio::time::timeout(after, call)
            .await
            .unwrap_or_else(|_| {
                Err(ChannelError::Timeout {
                    route,
                    action,
                    after,
                })
            }),
        None => call.await,
    }
}

/// Native first, then the remote exactly once if native is absent or fails.
///
/// Both futures are lazy; the remote one is only polled after the native path
/// has been skipped or has failed.
pub(crate) async fn with_fallback<'a, N, R>(
    action: Action,
    deadline: Option<Duration>,
    native: Option<BoxFuture<'a, Result<N, ChannelError>>>,
    remote: BoxFuture<'a, Result<R, ChannelError>>,
) -> Result<Served<N, R>, ChannelError> {
    if let Some(native) = native {
        match bounded(Route::Native, action, deadline, native).await {
            Ok(value) => {
                debug!(%action, "native channel served action");
                return Ok(Served::Native(value));
            }
            Err(error) => {
                warn!(%action, %error, "native channel failed; falling back to remote");
            }
        }
    }

    let value = bounded(Route::Remote, action, deadline, remote).await?;
    debug!(%action, "remote channel served action");
    Ok(Served::Remote(value))
}
