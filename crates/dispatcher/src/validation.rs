//! Typed parameters pulled out of an [`IntentEnvelope`].

use serde_json::Value;
use shared::{domain::IntentEnvelope, geometry::NacaCode};

use crate::error::ValidationError;

const CODE_KEYS: &[&str] = &["code", "naca"];
const CHORD_KEYS: &[&str] = &["chord_mm", "chord"];
const AUW_KEYS: &[&str] = &["auw_g", "auw"];
const DURATION_KEYS: &[&str] = &["duration_min"];
const PART_KEYS: &[&str] = &["part_id"];

#[derive(Debug, Clone, PartialEq)]
pub struct AirfoilParams {
    pub code: NacaCode,
    pub chord_mm: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PropulsionParams {
    pub auw_g: f64,
    pub duration_min: f64,
}

/// A missing chord falls back to `default_chord_mm`; a present one must be positive.
pub fn airfoil(
    envelope: &IntentEnvelope,
    default_chord_mm: f64,
) -> Result<AirfoilParams, ValidationError> {
    let raw = text(envelope, CODE_KEYS).unwrap_or_default();
    let code = NacaCode::parse(&raw).map_err(|_| ValidationError::NacaCode(raw))?;

    let chord_mm = number(envelope, CHORD_KEYS, "chord_mm")?.unwrap_or(default_chord_mm);
    if !positive_finite(chord_mm) {
        return Err(ValidationError::Chord(chord_mm));
    }

    Ok(AirfoilParams { code, chord_mm })
}

pub fn propulsion(envelope: &IntentEnvelope) -> Result<PropulsionParams, ValidationError> {
    let auw_g = number(envelope, AUW_KEYS, "auw_g")?.unwrap_or(0.0);
    let duration_min = number(envelope, DURATION_KEYS, "duration_min")?.unwrap_or(0.0);
    if positive_finite(auw_g) && positive_finite(duration_min) {
        Ok(PropulsionParams {
            auw_g,
            duration_min,
        })
    } else {
        Err(ValidationError::Propulsion {
            auw_g,
            duration_min,
        })
    }
}

pub fn drc_part(envelope: &IntentEnvelope) -> Result<String, ValidationError> {
    text(envelope, PART_KEYS)
        .map(|part| part.trim().to_string())
        .filter(|part| !part.is_empty())
        .ok_or(ValidationError::MissingPartId)
}

fn positive_finite(value: f64) -> bool {
    value > 0.0 && value.is_finite()
}

fn text(envelope: &IntentEnvelope, keys: &[&str]) -> Option<String> {
    match envelope.param(keys)? {
        Value::String(value) => Some(value.clone()),
        Value::Number(value) => Some(value.to_string()),
        _ => None,
    }
}

fn number(
    envelope: &IntentEnvelope,
    keys: &[&str],
    name: &'static str,
) -> Result<Option<f64>, ValidationError> {
    let Some(value) = envelope.param(keys) else {
        return Ok(None);
    };
    let parsed = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(raw) => raw.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed
        .map(Some)
        .ok_or(ValidationError::NotANumber { name })
}
