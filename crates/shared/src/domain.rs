use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentKind {
    Airfoil,
    Propulsion,
    Cg,
    Drc,
    Help,
    Chat,
    Error,
    #[serde(other)]
    Unknown,
}

impl IntentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Airfoil => "airfoil",
            Self::Propulsion => "propulsion",
            Self::Cg => "cg",
            Self::Drc => "drc",
            Self::Help => "help",
            Self::Chat => "chat",
            Self::Error => "error",
            Self::Unknown => "unknown",
        }
    }
}

/// Classified operator request. Built once by the classifier and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentEnvelope {
    pub kind: IntentKind,
    #[serde(default)]
    pub params: BTreeMap<String, serde_json::Value>,
    /// Text shown to the operator before the action runs.
    #[serde(default)]
    pub summary: String,
}

impl IntentEnvelope {
    pub fn new(kind: IntentKind, summary: impl Into<String>) -> Self {
        Self {
            kind,
            params: BTreeMap::new(),
            summary: summary.into(),
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// First present value among `keys`, so wire aliases (`naca`/`code`) resolve alike.
    pub fn param(&self, keys: &[&str]) -> Option<&serde_json::Value> {
        keys.iter()
            .find_map(|key| self.params.get(*key))
            .filter(|value| !value.is_null())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    #[default]
    None,
    Green,
    Yellow,
    Red,
}

impl Verdict {
    pub fn label(self) -> &'static str {
        match self {
            Self::None => "",
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Red => "red",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Number(f64),
    Text(String),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamRow {
    pub label: String,
    pub value: ParamValue,
}

impl ParamRow {
    pub fn new(label: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AirfoilPoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropulsionOption {
    pub name: String,
    pub thrust_g: f64,
    pub mass_g: f64,
    /// Opaque handle of the component the native host inserts.
    pub asset_ref: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CgResult {
    pub ok: bool,
    pub delta_mm: f64,
    pub verdict: Verdict,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub face_id: String,
    pub rule: String,
    pub value_mm: f64,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} on {} ({}mm)", self.rule, self.face_id, self.value_mm)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DrcResult {
    pub violations: Vec<Violation>,
}

/// Normalized result of one turn. Consumers replace their displayed state with it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub status_text: String,
    pub verdict: Verdict,
    pub params: Vec<ParamRow>,
    pub propulsion_options: Vec<PropulsionOption>,
    pub message: String,
}

impl Outcome {
    pub fn new(status_text: impl Into<String>, verdict: Verdict, message: impl Into<String>) -> Self {
        Self {
            status_text: status_text.into(),
            verdict,
            params: Vec::new(),
            propulsion_options: Vec::new(),
            message: message.into(),
        }
    }

    pub fn with_params(mut self, params: Vec<ParamRow>) -> Self {
        self.params = params;
        self
    }

    pub fn with_propulsion_options(mut self, options: Vec<PropulsionOption>) -> Self {
        self.propulsion_options = options;
        self
    }
}
