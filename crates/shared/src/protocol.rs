//! JSON bodies exchanged with the computation service.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    AirfoilPoint, CgResult, DrcResult, IntentEnvelope, IntentKind, PropulsionOption, Violation,
};

pub const AIRFOIL_ROUTE: &str = "/airfoil";
pub const PROPULSION_ROUTE: &str = "/propulsion";
pub const CG_ROUTE: &str = "/cg";
pub const DRC_ROUTE: &str = "/drc";
pub const CLASSIFY_ROUTE: &str = "/classify";
pub const LOG_ROUTE: &str = "/log";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AirfoilRequest {
    pub naca: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chord: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AirfoilParams {
    pub naca: String,
    pub chord: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AirfoilResponse {
    #[serde(default)]
    pub family: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<AirfoilParams>,
    pub coords: Vec<AirfoilPoint>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropulsionRequest {
    pub auw: f64,
    pub duration_min: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropulsionOptionWire {
    pub name: String,
    pub thrust_g: f64,
    pub mass_g: f64,
    pub step_file: String,
}

impl From<PropulsionOptionWire> for PropulsionOption {
    fn from(value: PropulsionOptionWire) -> Self {
        Self {
            name: value.name,
            thrust_g: value.thrust_g,
            mass_g: value.mass_g,
            asset_ref: value.step_file,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropulsionResponse {
    pub options: Vec<PropulsionOptionWire>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CgRequest {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parts: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CgResponse {
    pub cg_ok: bool,
    pub delta_mm: f64,
    pub verdict: String,
}

impl From<CgResult> for CgResponse {
    fn from(value: CgResult) -> Self {
        Self {
            cg_ok: value.ok,
            delta_mm: value.delta_mm,
            verdict: value.verdict.label().to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DrcRequest {
    #[serde(default)]
    pub part_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrcViolationWire {
    pub face_id: String,
    pub rule: String,
    pub value: f64,
}

impl From<DrcViolationWire> for Violation {
    fn from(value: DrcViolationWire) -> Self {
        Self {
            face_id: value.face_id,
            rule: value.rule,
            value_mm: value.value,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrcResponse {
    pub violations: Vec<DrcViolationWire>,
}

impl From<DrcResponse> for DrcResult {
    fn from(value: DrcResponse) -> Self {
        Self {
            violations: value.violations.into_iter().map(Violation::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifyRequest {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifyResponse {
    pub intent: IntentKind,
    #[serde(default)]
    pub params: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub agent_response: String,
}

impl From<ClassifyResponse> for IntentEnvelope {
    fn from(value: ClassifyResponse) -> Self {
        Self {
            kind: value.intent,
            params: value.params,
            summary: value.agent_response,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Agent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub sender: Sender,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogResponse {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logged_at: Option<DateTime<Utc>>,
}
