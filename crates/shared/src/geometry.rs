//! Symmetric NACA 4-digit section coordinates.
//!
//! Only the thickness distribution is used: camber digits are accepted as part of
//! the code but do not bend the mean line. Both the in-process host and the
//! computation service call [`generate`], so either channel produces the same
//! points for the same request.

use std::fmt;

use thiserror::Error;

use crate::domain::AirfoilPoint;

/// Sampling density used by the sketcher and the computation service.
pub const DEFAULT_SAMPLES: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid NACA code '{0}': expected exactly 4 digits")]
pub struct InvalidNacaCode(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NacaCode(String);

impl NacaCode {
    /// Exactly four ASCII digits; surrounding whitespace is rejected.
    pub fn parse(raw: &str) -> Result<Self, InvalidNacaCode> {
        if raw.len() == 4 && raw.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(raw.to_string()))
        } else {
            Err(InvalidNacaCode(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Maximum thickness as a fraction of chord (last two digits / 100).
    pub fn thickness_ratio(&self) -> f64 {
        let digits = self.0.as_bytes();
        let tens = f64::from(digits[2] - b'0');
        let ones = f64::from(digits[3] - b'0');
        (tens * 10.0 + ones) / 100.0
    }
}

impl fmt::Display for NacaCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn half_thickness(t: f64, chord_mm: f64, x: f64) -> f64 {
    let xc = x / chord_mm;
    5.0 * t
        * chord_mm
        * (0.2969 * xc.sqrt() - 0.1260 * xc - 0.3516 * xc.powi(2) + 0.2843 * xc.powi(3)
            - 0.1015 * xc.powi(4))
}

/// Closed polyline: upper surface leading to trailing edge, then lower surface back.
///
/// Returns `2 * (samples + 1)` points. `samples == 0` is treated as 1. The caller
/// rejects `chord_mm <= 0` before calling.
pub fn generate(code: &NacaCode, chord_mm: f64, samples: usize) -> Vec<AirfoilPoint> {
    let samples = samples.max(1);
    let t = code.thickness_ratio();

    let upper: Vec<AirfoilPoint> = (0..=samples)
        .map(|i| {
            let x = chord_mm * i as f64 / samples as f64;
            AirfoilPoint {
                x,
                y: half_thickness(t, chord_mm, x),
            }
        })
        .collect();

    let lower = upper
        .iter()
        .rev()
        .map(|p| AirfoilPoint { x: p.x, y: -p.y });

    let mut points = Vec::with_capacity(2 * (samples + 1));
    points.extend(upper.iter().copied());
    points.extend(lower);
    points
}
