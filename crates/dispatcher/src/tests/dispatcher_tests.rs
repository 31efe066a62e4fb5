use super::*;

use std::{
    sync::atomic::{AtomicUsize, Ordering},
    time::Duration,
};

use async_trait::async_trait;
use shared::{
    domain::{AirfoilPoint, DrcResult, ParamValue, Violation},
    geometry::{self, NacaCode},
};

use crate::{channel::NativeChannel, error::ChannelError, ClassifierError};

#[derive(Default)]
struct Calls {
    airfoil: AtomicUsize,
    insert: AtomicUsize,
    cg: AtomicUsize,
    drc: AtomicUsize,
    propulsion: AtomicUsize,
}

impl Calls {
    fn total(&self) -> usize {
        self.airfoil.load(Ordering::SeqCst)
            + self.insert.load(Ordering::SeqCst)
            + self.cg.load(Ordering::SeqCst)
            + self.drc.load(Ordering::SeqCst)
            + self.propulsion.load(Ordering::SeqCst)
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Mode {
    Ok,
    Fail,
    Hang,
}

struct TestNative {
    calls: Arc<Calls>,
    mode: Mode,
    cg_delta_mm: f64,
    violations: Vec<Violation>,
}

impl TestNative {
    fn new(mode: Mode) -> Self {
        Self {
            calls: Arc::new(Calls::default()),
            mode,
            cg_delta_mm: 0.2,
            violations: Vec::new(),
        }
    }

    async fn outcome<T>(&self, action: Action, value: T) -> Result<T, ChannelError> {
        match self.mode {
            Mode::Ok => Ok(value),
            Mode::Fail => Err(ChannelError::native(action, "no active document")),
            Mode::Hang => {
                std::future::pending::<()>().await;
                Ok(value)
            }
        }
    }
}

#[async_trait]
impl NativeChannel for TestNative {
    async fn generate_airfoil(&self, _code: &NacaCode, _chord_mm: f64) -> Result<(), ChannelError> {
        self.calls.airfoil.fetch_add(1, Ordering::SeqCst);
        self.outcome(Action::GenerateAirfoil, ()).await
    }

    async fn insert_component(&self, _asset_ref: &str) -> Result<(), ChannelError> {
        self.calls.insert.fetch_add(1, Ordering::SeqCst);
        self.outcome(Action::InsertComponent, ()).await
    }

    async fn get_cg(&self) -> Result<CgResult, ChannelError> {
        self.calls.cg.fetch_add(1, Ordering::SeqCst);
        self.outcome(Action::GetCg, CgResult::from_delta(self.cg_delta_mm))
            .await
    }

    async fn check_drc(&self, _part_id: &str) -> Result<DrcResult, ChannelError> {
        self.calls.drc.fetch_add(1, Ordering::SeqCst);
        let result = DrcResult {
            violations: self.violations.clone(),
        };
        self.outcome(Action::CheckDrc, result).await
    }
}

struct TestRemote {
    calls: Arc<Calls>,
    fail: bool,
    cg_delta_mm: f64,
    violations: Vec<Violation>,
    options: Vec<PropulsionOption>,
}

impl TestRemote {
    fn ok() -> Self {
        Self {
            calls: Arc::new(Calls::default()),
            fail: false,
            cg_delta_mm: 0.99,
            violations: Vec::new(),
            options: vec![motor("T-Motor 2820", 900.0, 85.0), motor("Emax 2216", 700.0, 65.0)],
        }
    }

    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::ok()
        }
    }

    fn check(&self) -> Result<(), ChannelError> {
        if self.fail {
            Err(ChannelError::Status {
                url: "http://remote.test/".into(),
                status: 503,
                detail: "service down".into(),
            })
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl RemoteChannel for TestRemote {
    async fn generate_airfoil(
        &self,
        code: &NacaCode,
        chord_mm: f64,
    ) -> Result<Vec<AirfoilPoint>, ChannelError> {
        self.calls.airfoil.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(geometry::generate(code, chord_mm, geometry::DEFAULT_SAMPLES))
    }

    async fn list_propulsion(
        &self,
        _auw_g: f64,
        _duration_min: f64,
    ) -> Result<Vec<PropulsionOption>, ChannelError> {
        self.calls.propulsion.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self.options.clone())
    }

    async fn get_cg(&self) -> Result<CgResult, ChannelError> {
        self.calls.cg.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(CgResult::from_delta(self.cg_delta_mm))
    }

    async fn check_drc(&self, _part_id: &str) -> Result<DrcResult, ChannelError> {
        self.calls.drc.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(DrcResult {
            violations: self.violations.clone(),
        })
    }
}

struct Harness {
    dispatcher: Dispatcher,
    native: Option<Arc<Calls>>,
    remote: Arc<Calls>,
}

fn harness(native: Option<TestNative>, remote: TestRemote) -> Harness {
    harness_with(native, remote, DispatcherSettings::default())
}

fn harness_with(
    native: Option<TestNative>,
    remote: TestRemote,
    settings: DispatcherSettings,
) -> Harness {
    let native_calls = native.as_ref().map(|n| n.calls.clone());
    let remote_calls = remote.calls.clone();
    let capability = match native {
        Some(native) => NativeCapability::present(Arc::new(native)),
        None => NativeCapability::absent(),
    };
    Harness {
        dispatcher: Dispatcher::new(Arc::new(remote), capability, settings),
        native: native_calls,
        remote: remote_calls,
    }
}

fn motor(name: &str, thrust_g: f64, mass_g: f64) -> PropulsionOption {
    PropulsionOption {
        name: name.to_string(),
        thrust_g,
        mass_g,
        asset_ref: format!("{}.step", name.to_ascii_lowercase().replace(' ', "-")),
    }
}

fn violation(face_id: &str, rule: &str, value_mm: f64) -> Violation {
    Violation {
        face_id: face_id.into(),
        rule: rule.into(),
        value_mm,
    }
}

fn airfoil_intent(code: &str, chord_mm: f64) -> IntentEnvelope {
    IntentEnvelope::new(IntentKind::Airfoil, format!("Generating NACA {code}."))
        .with_param("code", code)
        .with_param("chord_mm", chord_mm)
}

#[tokio::test]
async fn invalid_naca_code_never_reaches_a_channel() {
    let h = harness(Some(TestNative::new(Mode::Ok)), TestRemote::ok());

    let outcome = h.dispatcher.dispatch(&airfoil_intent("24", 200.0)).await;

    assert_eq!(outcome.verdict, Verdict::Red);
    assert_eq!(outcome.status_text, "Invalid NACA code.");
    assert!(outcome.params.is_empty());
    assert!(outcome.propulsion_options.is_empty());
    assert_eq!(h.native.expect("native").total(), 0);
    assert_eq!(h.remote.total(), 0);
}

#[tokio::test]
async fn padded_naca_code_never_reaches_a_channel() {
    let h = harness(None, TestRemote::ok());

    let outcome = h.dispatcher.dispatch(&airfoil_intent(" 2412\n", 200.0)).await;

    assert_eq!(outcome.verdict, Verdict::Red);
    assert_eq!(outcome.status_text, "Invalid NACA code.");
    assert_eq!(h.remote.total(), 0);
}

#[tokio::test]
async fn non_positive_chord_is_rejected_before_channels() {
    let h = harness(None, TestRemote::ok());

    let outcome = h.dispatcher.dispatch(&airfoil_intent("2412", -5.0)).await;

    assert_eq!(outcome.verdict, Verdict::Red);
    assert_eq!(outcome.status_text, "Invalid chord.");
    assert_eq!(h.remote.total(), 0);
}

#[tokio::test]
async fn native_airfoil_success_skips_remote() {
    let h = harness(Some(TestNative::new(Mode::Ok)), TestRemote::ok());

    let outcome = h.dispatcher.dispatch(&airfoil_intent("2412", 150.0)).await;

    assert_eq!(outcome.verdict, Verdict::Green);
    assert_eq!(outcome.status_text, "Airfoil sketch generated.");
    assert!(outcome.message.contains("NACA 2412"));
    assert_eq!(
        outcome.params,
        vec![
            ParamRow::new("code", "2412"),
            ParamRow::new("chord_mm", 150.0)
        ]
    );
    assert!(outcome.propulsion_options.is_empty());
    let native = h.native.expect("native");
    assert_eq!(native.airfoil.load(Ordering::SeqCst), 1);
    assert_eq!(h.remote.total(), 0);
}

#[tokio::test]
async fn failing_native_falls_back_to_remote_exactly_once() {
    let h = harness(Some(TestNative::new(Mode::Fail)), TestRemote::ok());

    let outcome = h.dispatcher.dispatch(&airfoil_intent("2412", 200.0)).await;

    assert_eq!(outcome.verdict, Verdict::Green);
    assert_eq!(outcome.status_text, "Airfoil data fetched.");
    assert_eq!(outcome.message, "Fetched 102 points for NACA 2412.");
    assert_eq!(h.native.expect("native").airfoil.load(Ordering::SeqCst), 1);
    assert_eq!(h.remote.airfoil.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn absent_native_goes_straight_to_remote() {
    let h = harness(None, TestRemote::ok());
    assert!(!h.dispatcher.native_available());

    let outcome = h.dispatcher.dispatch(&airfoil_intent("0012", 100.0)).await;

    assert_eq!(outcome.verdict, Verdict::Green);
    assert_eq!(h.remote.airfoil.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn both_channels_failing_is_terminal() {
    let h = harness(Some(TestNative::new(Mode::Fail)), TestRemote::failing());

    let outcome = h.dispatcher.dispatch(&airfoil_intent("2412", 200.0)).await;

    assert_eq!(outcome.verdict, Verdict::Red);
    assert_eq!(outcome.status_text, "Error generating airfoil.");
    assert!(outcome.params.is_empty());
    assert!(outcome.propulsion_options.is_empty());
    // the remote was the last channel tried, so its failure is reported
    assert!(outcome.message.contains("service down"), "{}", outcome.message);
    assert_eq!(h.native.expect("native").airfoil.load(Ordering::SeqCst), 1);
    assert_eq!(h.remote.airfoil.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn hung_native_call_hits_deadline_and_falls_back() {
    let settings = DispatcherSettings {
        channel_deadline: Some(Duration::from_millis(20)),
        ..DispatcherSettings::default()
    };
    let h = harness_with(Some(TestNative::new(Mode::Hang)), TestRemote::ok(), settings);

    let outcome = h.dispatcher.dispatch(&airfoil_intent("2412", 200.0)).await;

    assert_eq!(outcome.status_text, "Airfoil data fetched.");
    assert_eq!(h.remote.airfoil.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn cg_verdict_comes_from_the_offset_band() {
    let mut native = TestNative::new(Mode::Ok);
    native.cg_delta_mm = 2.5;
    let h = harness(Some(native), TestRemote::ok());

    let outcome = h
        .dispatcher
        .dispatch(&IntentEnvelope::new(IntentKind::Cg, "Checking CG."))
        .await;

    assert_eq!(outcome.verdict, Verdict::Yellow);
    assert_eq!(outcome.status_text, "CG check complete.");
    assert_eq!(outcome.params, vec![ParamRow::new("cg_delta_mm", 2.5)]);
    assert!(outcome.propulsion_options.is_empty());
    assert_eq!(h.remote.total(), 0);
}

#[tokio::test]
async fn cg_through_remote_uses_same_bands() {
    let h = harness(None, TestRemote::ok());

    let outcome = h
        .dispatcher
        .dispatch(&IntentEnvelope::new(IntentKind::Cg, ""))
        .await;

    assert_eq!(outcome.verdict, Verdict::Green);
    assert_eq!(outcome.params[0].value, ParamValue::Number(0.99));
    assert_eq!(h.remote.cg.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn drc_lists_every_violation_and_warns() {
    let mut native = TestNative::new(Mode::Ok);
    native.violations = vec![
        violation("F123", "min-wall", 1.0),
        violation("F456", "hole-edge", 3.0),
    ];
    let h = harness(Some(native), TestRemote::ok());
    let intent =
        IntentEnvelope::new(IntentKind::Drc, "Running DRC.").with_param("part_id", "tail_spar");

    let outcome = h.dispatcher.dispatch(&intent).await;

    assert_eq!(outcome.verdict, Verdict::Yellow);
    assert_eq!(
        outcome.message,
        "Violations: min-wall on F123 (1mm), hole-edge on F456 (3mm)"
    );
    assert!(outcome.params.is_empty());
}

#[tokio::test]
async fn clean_drc_is_green() {
    let h = harness(None, TestRemote::ok());
    let intent = IntentEnvelope::new(IntentKind::Drc, "").with_param("part_id", "wing");

    let outcome = h.dispatcher.dispatch(&intent).await;

    assert_eq!(outcome.verdict, Verdict::Green);
    assert_eq!(outcome.message, "No violations on wing.");
}

#[tokio::test]
async fn drc_without_part_is_a_validation_error() {
    let h = harness(Some(TestNative::new(Mode::Ok)), TestRemote::ok());

    let outcome = h
        .dispatcher
        .dispatch(&IntentEnvelope::new(IntentKind::Drc, ""))
        .await;

    assert_eq!(outcome.verdict, Verdict::Red);
    assert_eq!(outcome.status_text, "Missing part_id.");
    assert_eq!(h.native.expect("native").total(), 0);
    assert_eq!(h.remote.total(), 0);
}

#[tokio::test]
async fn propulsion_lists_remote_options_and_clears_params() {
    let h = harness(Some(TestNative::new(Mode::Ok)), TestRemote::ok());
    let intent = IntentEnvelope::new(IntentKind::Propulsion, "Selecting propulsion.")
        .with_param("auw", 350)
        .with_param("duration_min", 20);

    let outcome = h.dispatcher.dispatch(&intent).await;

    assert_eq!(outcome.verdict, Verdict::None);
    assert_eq!(outcome.status_text, "Select a propulsion option.");
    assert!(outcome.params.is_empty());
    assert_eq!(outcome.propulsion_options.len(), 2);
    assert_eq!(outcome.propulsion_options[0].asset_ref, "t-motor-2820.step");
    assert_eq!(h.native.expect("native").total(), 0);
    assert_eq!(h.remote.propulsion.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn propulsion_requires_positive_inputs() {
    let h = harness(None, TestRemote::ok());
    let intent = IntentEnvelope::new(IntentKind::Propulsion, "")
        .with_param("auw", 0)
        .with_param("duration_min", 20);

    let outcome = h.dispatcher.dispatch(&intent).await;

    assert_eq!(outcome.verdict, Verdict::Red);
    assert_eq!(outcome.status_text, "Missing propulsion parameters.");
    assert_eq!(h.remote.total(), 0);
}

#[tokio::test]
async fn infinite_propulsion_inputs_stay_local() {
    let h = harness(None, TestRemote::ok());
    let intent = IntentEnvelope::new(IntentKind::Propulsion, "")
        .with_param("auw", "inf")
        .with_param("duration_min", "1e400");

    let outcome = h.dispatcher.dispatch(&intent).await;

    assert_eq!(outcome.verdict, Verdict::Red);
    assert_eq!(outcome.status_text, "Missing propulsion parameters.");
    assert!(outcome.propulsion_options.is_empty());
    assert_eq!(h.remote.total(), 0);
}

#[tokio::test]
async fn propulsion_remote_failure_is_terminal() {
    let h = harness(None, TestRemote::failing());
    let intent = IntentEnvelope::new(IntentKind::Propulsion, "")
        .with_param("auw_g", 350)
        .with_param("duration_min", 10);

    let outcome = h.dispatcher.dispatch(&intent).await;

    assert_eq!(outcome.verdict, Verdict::Red);
    assert!(outcome.propulsion_options.is_empty());
    assert!(outcome.message.starts_with("Error: "));
}

#[tokio::test]
async fn help_and_chat_pass_the_summary_through() {
    let h = harness(Some(TestNative::new(Mode::Ok)), TestRemote::ok());

    for kind in [IntentKind::Help, IntentKind::Chat] {
        let outcome = h
            .dispatcher
            .dispatch(&IntentEnvelope::new(kind, "Usage: /airfoil NACA_CODE"))
            .await;
        assert_eq!(outcome.verdict, Verdict::None);
        assert_eq!(outcome.message, "Usage: /airfoil NACA_CODE");
        assert!(outcome.params.is_empty());
        assert!(outcome.propulsion_options.is_empty());
    }
    assert_eq!(h.native.expect("native").total(), 0);
    assert_eq!(h.remote.total(), 0);
}

#[tokio::test]
async fn unrecognized_intent_gets_generic_reply() {
    let h = harness(None, TestRemote::ok());

    let outcome = h
        .dispatcher
        .dispatch(&IntentEnvelope::new(IntentKind::Unknown, ""))
        .await;

    assert_eq!(outcome.verdict, Verdict::None);
    assert_eq!(outcome.message, GENERIC_REPLY);
}

#[tokio::test]
async fn selecting_propulsion_is_green_even_when_insertion_fails() {
    let h = harness(Some(TestNative::new(Mode::Fail)), TestRemote::ok());
    let option = motor("Emax 2216", 700.0, 65.0);

    let outcome = h.dispatcher.select_propulsion(&option).await;

    assert_eq!(outcome.verdict, Verdict::Green);
    assert_eq!(outcome.status_text, "Inserted Emax 2216.");
    assert_eq!(
        outcome.params,
        vec![
            ParamRow::new("name", "Emax 2216"),
            ParamRow::new("thrust_g", 700.0),
            ParamRow::new("mass_g", 65.0),
        ]
    );
    assert!(outcome.propulsion_options.is_empty());
    assert_eq!(h.native.expect("native").insert.load(Ordering::SeqCst), 1);
    assert_eq!(h.remote.total(), 0);
}

#[tokio::test]
async fn selecting_propulsion_without_native_host_still_reports() {
    let h = harness(None, TestRemote::ok());

    let outcome = h
        .dispatcher
        .select_propulsion(&motor("T-Motor 2820", 900.0, 85.0))
        .await;

    assert_eq!(outcome.verdict, Verdict::Green);
    assert_eq!(outcome.params.len(), 3);
}

#[tokio::test]
async fn identical_input_gives_identical_outcomes() {
    let h = harness(None, TestRemote::ok());
    let intent = airfoil_intent("4415", 180.0);

    let first = h.dispatcher.dispatch(&intent).await;
    let second = h.dispatcher.dispatch(&intent).await;

    assert_eq!(first, second);
}

struct DownClassifier;

#[async_trait]
impl Classifier for DownClassifier {
    async fn classify(&self, _text: &str) -> Result<IntentEnvelope, ClassifierError> {
        Err(ClassifierError::Unavailable("connection refused".into()))
    }
}

struct FixedClassifier(IntentEnvelope);

#[async_trait]
impl Classifier for FixedClassifier {
    async fn classify(&self, _text: &str) -> Result<IntentEnvelope, ClassifierError> {
        Ok(self.0.clone())
    }
}

#[tokio::test]
async fn unreachable_classifier_answers_conversationally() {
    let h = harness(Some(TestNative::new(Mode::Ok)), TestRemote::ok());

    let turn = h.dispatcher.converse(&DownClassifier, "make a wing").await;

    assert!(turn.envelope.is_none());
    assert_eq!(turn.outcome.verdict, Verdict::None);
    assert_eq!(turn.outcome.message, UNREACHABLE_MESSAGE);
    assert_eq!(h.remote.total(), 0);
}

#[tokio::test]
async fn converse_dispatches_the_classified_envelope() {
    let h = harness(None, TestRemote::ok());
    let classifier = FixedClassifier(airfoil_intent("2412", 200.0));

    let turn = h.dispatcher.converse(&classifier, "NACA 2412 please").await;

    assert_eq!(turn.envelope.map(|e| e.kind), Some(IntentKind::Airfoil));
    assert_eq!(turn.outcome.verdict, Verdict::Green);
}
