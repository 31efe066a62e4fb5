pub mod catalog;
pub mod classifier;

pub use catalog::{DrcRules, PropulsionCatalog};
pub use classifier::{classify, HELP_TEXT};

use shared::{
    domain::CgResult,
    error::ApiError,
    geometry::{self, NacaCode, DEFAULT_SAMPLES},
    protocol::{
        AirfoilParams, AirfoilRequest, AirfoilResponse, CgRequest, CgResponse, DrcRequest,
        DrcResponse, PropulsionRequest, PropulsionResponse,
    },
};
use tracing::debug;

pub const AIRFOIL_FAMILY: &str = "NACA 4-digit";

#[derive(Debug, Clone)]
pub struct ApiContext {
    pub catalog: PropulsionCatalog,
    pub drc_rules: DrcRules,
    pub airfoil_samples: usize,
}

impl Default for ApiContext {
    fn default() -> Self {
        Self {
            catalog: PropulsionCatalog::default(),
            drc_rules: DrcRules::default(),
            airfoil_samples: DEFAULT_SAMPLES,
        }
    }
}

pub fn generate_airfoil(
    ctx: &ApiContext,
    req: &AirfoilRequest,
) -> Result<AirfoilResponse, ApiError> {
    let code = NacaCode::parse(&req.naca)
        .map_err(|_| ApiError::validation(format!("Invalid NACA code: {}", req.naca)))?;
    let chord = req.chord.unwrap_or(classifier::DEFAULT_CHORD_MM);
    if !(chord > 0.0 && chord.is_finite()) {
        return Err(ApiError::validation(format!(
            "chord must be greater than 0 mm, got {chord}"
        )));
    }

    let coords = geometry::generate(&code, chord, ctx.airfoil_samples);
    debug!(naca = %code, chord, points = coords.len(), "airfoil generated");
    Ok(AirfoilResponse {
        family: AIRFOIL_FAMILY.to_string(),
        params: Some(AirfoilParams {
            naca: code.to_string(),
            chord,
        }),
        coords,
    })
}

/// The whole catalog is offered; sizing against AUW is left to the operator.
pub fn list_propulsion(
    ctx: &ApiContext,
    req: &PropulsionRequest,
) -> Result<PropulsionResponse, ApiError> {
    if !(req.auw > 0.0 && req.duration_min > 0.0) {
        return Err(ApiError::validation(
            "auw and duration_min must both be greater than 0",
        ));
    }
    Ok(PropulsionResponse {
        options: ctx.catalog.options.clone(),
    })
}

/// No mass model is held server-side, so the assembly is reported as balanced.
pub fn check_cg(_ctx: &ApiContext, req: &CgRequest) -> CgResponse {
    debug!(parts = req.parts.len(), "cg requested");
    CgResult::from_delta(0.0).into()
}

pub fn check_drc(ctx: &ApiContext, req: &DrcRequest) -> DrcResponse {
    DrcResponse {
        violations: ctx.drc_rules.violations_for(req.part_id.trim()),
    }
}
