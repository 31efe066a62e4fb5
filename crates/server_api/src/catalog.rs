//! Static data served by the computation service: the propulsion catalog and
//! the per-part design-rule violations.

use std::{collections::HashMap, fs, io::ErrorKind, path::Path};

use anyhow::Context;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use shared::protocol::{DrcViolationWire, PropulsionOptionWire};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropulsionCatalog {
    #[serde(default)]
    pub options: Vec<PropulsionOptionWire>,
}

impl Default for PropulsionCatalog {
    fn default() -> Self {
        Self {
            options: vec![
                PropulsionOptionWire {
                    name: "T-Motor 2820".into(),
                    thrust_g: 900.0,
                    mass_g: 85.0,
                    step_file: "t-motor-2820.step".into(),
                },
                PropulsionOptionWire {
                    name: "Emax 2216".into(),
                    thrust_g: 700.0,
                    mass_g: 65.0,
                    step_file: "emax-2216.step".into(),
                },
            ],
        }
    }
}

impl PropulsionCatalog {
    /// Built-in catalog when `path` does not exist; a present but unreadable
    /// file is an error.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        load_json_or_default(path, "propulsion catalog")
    }
}

/// Violations keyed by part id. Parts without an entry are clean.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DrcRules(HashMap<String, Vec<DrcViolationWire>>);

impl Default for DrcRules {
    fn default() -> Self {
        let mut rules = HashMap::new();
        rules.insert(
            "demo".to_string(),
            vec![
                DrcViolationWire {
                    face_id: "F123".into(),
                    rule: "min-wall".into(),
                    value: 1.0,
                },
                DrcViolationWire {
                    face_id: "F456".into(),
                    rule: "hole-edge".into(),
                    value: 3.0,
                },
            ],
        );
        Self(rules)
    }
}

impl DrcRules {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        load_json_or_default(path, "DRC rules")
    }

    pub fn violations_for(&self, part_id: &str) -> Vec<DrcViolationWire> {
        self.0.get(part_id).cloned().unwrap_or_default()
    }

    pub fn parts(&self) -> usize {
        self.0.len()
    }
}

fn load_json_or_default<T>(path: &Path, what: &str) -> anyhow::Result<T>
where
    T: DeserializeOwned + Default,
{
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            info!(path = %path.display(), "no {what} file; using built-in defaults");
            return Ok(T::default());
        }
        Err(e) => {
            return Err(e).with_context(|| format!("failed to read {what} '{}'", path.display()))
        }
    };
    serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse {what} '{}'", path.display()))
}
