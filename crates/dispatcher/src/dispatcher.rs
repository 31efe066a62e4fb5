use std::sync::Arc;

use shared::{
    domain::{
        CgResult, IntentEnvelope, IntentKind, Outcome, ParamRow, PropulsionOption, Verdict,
    },
    verdict::drc_verdict,
};
use tracing::{info, warn};

use crate::{
    channel::{bounded, with_fallback, Action, NativeCapability, RemoteChannel, Route, Served},
    classifier::Classifier,
    config::DispatcherSettings,
    error::{DispatchError, ValidationError},
    validation,
};

pub const UNREACHABLE_MESSAGE: &str = "Backend not reachable";
pub const GENERIC_REPLY: &str =
    "I can generate NACA airfoils, suggest propulsion sets, check CG and run design-rule checks.";

/// Result of a full text turn: the envelope the classifier produced, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    pub envelope: Option<IntentEnvelope>,
    pub outcome: Outcome,
}

/// Executes classified intents and normalizes every result into an [`Outcome`].
///
/// Holds no per-turn state; callers run one turn at a time.
pub struct Dispatcher {
    remote: Arc<dyn RemoteChannel>,
    native: NativeCapability,
    settings: DispatcherSettings,
}

impl Dispatcher {
    pub fn new(
        remote: Arc<dyn RemoteChannel>,
        native: NativeCapability,
        settings: DispatcherSettings,
    ) -> Self {
        Self {
            remote,
            native,
            settings,
        }
    }

    pub fn native_available(&self) -> bool {
        self.native.is_present()
    }

    pub fn settings(&self) -> &DispatcherSettings {
        &self.settings
    }

    /// Classifies `text` and dispatches it. An unreachable classifier yields the
    /// conversational fallback instead of an error.
    pub async fn converse(&self, classifier: &dyn Classifier, text: &str) -> Turn {
        match classifier.classify(text).await {
            Ok(envelope) => {
                let outcome = self.dispatch(&envelope).await;
                Turn {
                    envelope: Some(envelope),
                    outcome,
                }
            }
            Err(error) => {
                let error = DispatchError::from(error);
                warn!(%error, "classifier unavailable; answering conversationally");
                Turn {
                    envelope: None,
                    outcome: failure_outcome(IntentKind::Error, &error),
                }
            }
        }
    }

    pub async fn dispatch(&self, envelope: &IntentEnvelope) -> Outcome {
        let kind = envelope.kind;
        info!(intent = kind.as_str(), native = self.native_available(), "dispatching intent");

        let result = match kind {
            IntentKind::Airfoil => self.airfoil(envelope).await,
            IntentKind::Propulsion => self.propulsion(envelope).await,
            IntentKind::Cg => self.cg().await,
            IntentKind::Drc => self.drc(envelope).await,
            IntentKind::Help | IntentKind::Chat => {
                Ok(Outcome::new("", Verdict::None, envelope.summary.clone()))
            }
            IntentKind::Error | IntentKind::Unknown => Ok(generic_reply(envelope)),
        };

        result.unwrap_or_else(|error| {
            warn!(intent = kind.as_str(), %error, "intent failed");
            failure_outcome(kind, &error)
        })
    }

    /// Records the operator's propulsion choice. Inserting the component is
    /// best effort: a failed or impossible insertion is logged and the reported
    /// outcome stays green.
    pub async fn select_propulsion(&self, option: &PropulsionOption) -> Outcome {
        match self.native.channel() {
            Some(native) => {
                let inserted = bounded(
                    Route::Native,
                    Action::InsertComponent,
                    self.settings.channel_deadline,
                    native.insert_component(&option.asset_ref),
                )
                .await;
                if let Err(error) = inserted {
                    warn!(asset_ref = %option.asset_ref, %error, "component insertion failed");
                }
            }
            None => {
                warn!(asset_ref = %option.asset_ref, "no native host; component not inserted");
            }
        }

        Outcome::new(
            format!("Inserted {}.", option.name),
            Verdict::Green,
            format!("Inserted {} into design.", option.name),
        )
        .with_params(vec![
            ParamRow::new("name", option.name.as_str()),
            ParamRow::new("thrust_g", option.thrust_g),
            ParamRow::new("mass_g", option.mass_g),
        ])
    }

    async fn airfoil(&self, envelope: &IntentEnvelope) -> Result<Outcome, DispatchError> {
        let params = validation::airfoil(envelope, self.settings.default_chord_mm)?;
        let action = Action::GenerateAirfoil;

        let native = self
            .native
            .channel()
            .map(|native| native.generate_airfoil(&params.code, params.chord_mm));
        let remote = self.remote.generate_airfoil(&params.code, params.chord_mm);
        let served = with_fallback(action, self.settings.channel_deadline, native, remote)
            .await
            .map_err(|last| DispatchError::Terminal { action, last })?;

        let (status, message) = match served {
            Served::Native(()) => (
                "Airfoil sketch generated.",
                format!("Airfoil sketch for NACA {} sent to the CAD host.", params.code),
            ),
            Served::Remote(points) => (
                "Airfoil data fetched.",
                format!("Fetched {} points for NACA {}.", points.len(), params.code),
            ),
        };

        Ok(Outcome::new(status, Verdict::Green, message).with_params(vec![
            ParamRow::new("code", params.code.as_str()),
            ParamRow::new("chord_mm", params.chord_mm),
        ]))
    }

    async fn propulsion(&self, envelope: &IntentEnvelope) -> Result<Outcome, DispatchError> {
        let params = validation::propulsion(envelope)?;
        let action = Action::ListPropulsion;

        let options = bounded(
            Route::Remote,
            action,
            self.settings.channel_deadline,
            self.remote.list_propulsion(params.auw_g, params.duration_min),
        )
        .await
        .map_err(|last| DispatchError::Terminal { action, last })?;

        let message = if options.is_empty() {
            format!(
                "No propulsion options for AUW {} g and {} min.",
                params.auw_g, params.duration_min
            )
        } else {
            "Here are propulsion options.".to_string()
        };

        Ok(Outcome::new("Select a propulsion option.", Verdict::None, message)
            .with_propulsion_options(options))
    }

    async fn cg(&self) -> Result<Outcome, DispatchError> {
        let action = Action::GetCg;
        let native = self.native.channel().map(|native| native.get_cg());
        let served = with_fallback(
            action,
            self.settings.channel_deadline,
            native,
            self.remote.get_cg(),
        )
        .await
        .map_err(|last| DispatchError::Terminal { action, last })?;

        // bands are re-derived from the offset whichever channel reported it
        let (Served::Native(raw) | Served::Remote(raw)) = served;
        let result = CgResult::from_delta(raw.delta_mm);

        Ok(Outcome::new(
            "CG check complete.",
            result.verdict,
            format!(
                "CG offset is {:.2} mm ({}).",
                result.delta_mm,
                result.verdict.label()
            ),
        )
        .with_params(vec![ParamRow::new("cg_delta_mm", result.delta_mm)]))
    }

    async fn drc(&self, envelope: &IntentEnvelope) -> Result<Outcome, DispatchError> {
        let part_id = validation::drc_part(envelope)?;
        let action = Action::CheckDrc;

        let native = self
            .native
            .channel()
            .map(|native| native.check_drc(&part_id));
        let served = with_fallback(
            action,
            self.settings.channel_deadline,
            native,
            self.remote.check_drc(&part_id),
        )
        .await
        .map_err(|last| DispatchError::Terminal { action, last })?;

        let (Served::Native(result) | Served::Remote(result)) = served;
        let message = if result.violations.is_empty() {
            format!("No violations on {part_id}.")
        } else {
            let listed: Vec<String> = result.violations.iter().map(ToString::to_string).collect();
            format!("Violations: {}", listed.join(", "))
        };

        Ok(Outcome::new("DRC check complete.", drc_verdict(&result), message))
    }
}

fn generic_reply(envelope: &IntentEnvelope) -> Outcome {
    let message = if envelope.summary.trim().is_empty() {
        GENERIC_REPLY.to_string()
    } else {
        envelope.summary.clone()
    };
    Outcome::new("", Verdict::None, message)
}

fn failure_outcome(kind: IntentKind, error: &DispatchError) -> Outcome {
    match error {
        DispatchError::Validation(invalid) => {
            let (status, message) = match invalid {
                ValidationError::NacaCode(_) => (
                    "Invalid NACA code.",
                    "Please provide a valid 4-digit NACA code (e.g. 2412).".to_string(),
                ),
                ValidationError::Chord(_) => (
                    "Invalid chord.",
                    "Please provide a chord length greater than 0 mm.".to_string(),
                ),
                ValidationError::Propulsion { .. } => (
                    "Missing propulsion parameters.",
                    "Please specify valid AUW (g) and duration_min (min).".to_string(),
                ),
                ValidationError::MissingPartId => (
                    "Missing part_id.",
                    "Please specify a part_id for DRC, e.g. 'Run DRC on part_id wing_spar'."
                        .to_string(),
                ),
                ValidationError::NotANumber { .. } => ("Invalid parameters.", invalid.to_string()),
            };
            Outcome::new(status, Verdict::Red, message)
        }
        DispatchError::Terminal { last, .. } => {
            let status = match kind {
                IntentKind::Airfoil => "Error generating airfoil.",
                IntentKind::Propulsion => "Error listing propulsion options.",
                IntentKind::Cg => "Error checking CG.",
                IntentKind::Drc => "Error running DRC.",
                _ => "Error.",
            };
            Outcome::new(status, Verdict::Red, format!("Error: {last}"))
        }
        DispatchError::ClassifierUnavailable(_) => {
            Outcome::new("", Verdict::None, UNREACHABLE_MESSAGE)
        }
    }
}

#[cfg(test)]
#[path = "tests/dispatcher_tests.rs"]
mod tests;
