//! HTTP client for the computation service.

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use shared::{
    domain::{AirfoilPoint, CgResult, DrcResult, IntentEnvelope, PropulsionOption},
    error::ApiError,
    geometry::NacaCode,
    protocol::{
        AirfoilRequest, AirfoilResponse, CgRequest, CgResponse, ClassifyRequest,
        ClassifyResponse, DrcRequest, DrcResponse, LogEntry, LogResponse, PropulsionRequest,
        PropulsionResponse, Sender, AIRFOIL_ROUTE, CG_ROUTE, CLASSIFY_ROUTE, DRC_ROUTE,
        LOG_ROUTE, PROPULSION_ROUTE,
    },
};
use tracing::debug;
use url::Url;

use crate::{
    channel::RemoteChannel,
    classifier::Classifier,
    error::{ChannelError, ClassifierError},
};

#[derive(Clone)]
pub struct HttpRemoteChannel {
    http: Client,
    base: Url,
}

impl HttpRemoteChannel {
    pub fn new(base_url: &str) -> Result<Self, url::ParseError> {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: &str) -> Result<Self, url::ParseError> {
        let mut base = Url::parse(base_url.trim())?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self { http, base })
    }

    pub fn base_url(&self) -> &str {
        self.base.as_str()
    }

    fn endpoint(&self, route: &str) -> Result<Url, ChannelError> {
        self.base
            .join(route.trim_start_matches('/'))
            .map_err(|e| ChannelError::Other(format!("bad route {route}: {e}")))
    }

    async fn post_json<Req, Resp>(&self, route: &str, body: &Req) -> Result<Resp, ChannelError>
    where
        Req: Serialize + Sync,
        Resp: DeserializeOwned,
    {
        let url = self.endpoint(route)?;
        debug!(%url, "posting to computation service");
        let response = self
            .http
            .post(url.clone())
            .json(body)
            .send()
            .await
            .map_err(|source| ChannelError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let raw = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ApiError>(&raw)
                .map(|e| e.message)
                .unwrap_or_else(|_| {
                    if raw.trim().is_empty() {
                        status.canonical_reason().unwrap_or("error").to_string()
                    } else {
                        raw
                    }
                });
            return Err(ChannelError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                detail,
            });
        }

        response.json().await.map_err(|e| ChannelError::Decode {
            url: url.to_string(),
            detail: e.to_string(),
        })
    }

    /// Records one conversation line on the service.
    pub async fn log_turn(&self, sender: Sender, text: &str) -> Result<(), ChannelError> {
        let _: LogResponse = self
            .post_json(
                LOG_ROUTE,
                &LogEntry {
                    sender,
                    text: text.to_string(),
                },
            )
            .await?;
        Ok(())
    }
}

#[async_trait]
impl RemoteChannel for HttpRemoteChannel {
    async fn generate_airfoil(
        &self,
        code: &NacaCode,
        chord_mm: f64,
    ) -> Result<Vec<AirfoilPoint>, ChannelError> {
        let response: AirfoilResponse = self
            .post_json(
                AIRFOIL_ROUTE,
                &AirfoilRequest {
                    naca: code.to_string(),
                    chord: Some(chord_mm),
                },
            )
            .await?;
        Ok(response.coords)
    }

    async fn list_propulsion(
        &self,
        auw_g: f64,
        duration_min: f64,
    ) -> Result<Vec<PropulsionOption>, ChannelError> {
        let response: PropulsionResponse = self
            .post_json(
                PROPULSION_ROUTE,
                &PropulsionRequest {
                    auw: auw_g,
                    duration_min,
                },
            )
            .await?;
        Ok(response
            .options
            .into_iter()
            .map(PropulsionOption::from)
            .collect())
    }

    async fn get_cg(&self) -> Result<CgResult, ChannelError> {
        let response: CgResponse = self.post_json(CG_ROUTE, &CgRequest::default()).await?;
        // the verdict string on the wire is advisory; bands are re-derived locally
        Ok(CgResult::from_delta(response.delta_mm))
    }

    async fn check_drc(&self, part_id: &str) -> Result<DrcResult, ChannelError> {
        let response: DrcResponse = self
            .post_json(
                DRC_ROUTE,
                &DrcRequest {
                    part_id: part_id.to_string(),
                },
            )
            .await?;
        Ok(response.into())
    }
}

#[async_trait]
impl Classifier for HttpRemoteChannel {
    async fn classify(&self, text: &str) -> Result<IntentEnvelope, ClassifierError> {
        let response: ClassifyResponse = self
            .post_json(
                CLASSIFY_ROUTE,
                &ClassifyRequest {
                    text: text.to_string(),
                },
            )
            .await
            .map_err(|e| match e {
                ChannelError::Decode { detail, .. } => ClassifierError::Malformed(detail),
                other => ClassifierError::Unavailable(other.to_string()),
            })?;
        Ok(response.into())
    }
}
