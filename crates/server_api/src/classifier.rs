//! Keyword classifier behind `POST /classify`.
//!
//! Matches on keywords in a fixed priority order (airfoil, propulsion, cg, drc)
//! and pulls parameters out with regexes. Text that matches no action gets the
//! usage text when it asks for help and an echo otherwise.

use std::{collections::BTreeMap, sync::LazyLock};

use regex::Regex;
use serde_json::{json, Value};
use shared::{domain::IntentKind, protocol::ClassifyResponse};

pub const HELP_TEXT: &str = "Usage:\n/airfoil NACA_CODE [--chord MM]\n/propulsion --auw G --duration MIN\n/cg --parts part1,part2\n/drc --part_id ID";

pub const DEFAULT_CHORD_MM: f64 = 200.0;
pub const DEFAULT_AUW_G: f64 = 350.0;
pub const DEFAULT_DURATION_MIN: f64 = 10.0;
pub const DEFAULT_PART_ID: &str = "demo";

static AIRFOIL_WORDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)naca|airfoil|aerofoil").expect("Invalid regex"));
static PROPULSION_WORDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)propulsion|motor").expect("Invalid regex"));
static CG_WORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bcg\b|center of gravity|centre of gravity").expect("Invalid regex")
});
static DRC_WORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bdrc\b|design[\s-]rule").expect("Invalid regex")
});
static HELP_WORDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bhelp\b|\busage\b|^\s*\?\s*$").expect("Invalid regex"));

static NACA_AFTER_KEYWORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:naca|airfoil|aerofoil)\D*?(\d{4,})").expect("Invalid regex")
});
static NACA_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{4,})").expect("Invalid regex"));
static CHORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)chord\D*?(\d+(?:\.\d+)?)").expect("Invalid regex")
});
static CHORD_TRAILING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*mm\s+chord").expect("Invalid regex")
});
static AUW_FLAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)auw\W*(\d+(?:\.\d+)?)").expect("Invalid regex"));
static AUW_GRAMS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*g(?:rams?)?\b").expect("Invalid regex")
});
static DURATION_FLAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)duration\W*(\d+(?:\.\d+)?)").expect("Invalid regex"));
static DURATION_MINUTES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*min(?:utes?|s)?\b").expect("Invalid regex")
});
static CG_PARTS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:\bfor|--parts)\s+(.+)").expect("Invalid regex"));
static PART_SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i),|\s+and\s+|\s*&\s*").expect("Invalid regex"));
static PART_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\bpart(?:_?id)?\W+['"]?(\w+)"#).expect("Invalid regex")
});

pub fn classify(text: &str) -> ClassifyResponse {
    if AIRFOIL_WORDS.is_match(text) {
        airfoil(text)
    } else if PROPULSION_WORDS.is_match(text) {
        propulsion(text)
    } else if CG_WORDS.is_match(text) {
        cg(text)
    } else if DRC_WORDS.is_match(text) {
        drc(text)
    } else if HELP_WORDS.is_match(text) {
        response(IntentKind::Help, BTreeMap::new(), HELP_TEXT.to_string())
    } else {
        response(IntentKind::Chat, BTreeMap::new(), format!("Echo: {text}"))
    }
}

fn airfoil(text: &str) -> ClassifyResponse {
    // digits after the keyword win over a stray number earlier in the text
    let code = [&NACA_AFTER_KEYWORD, &NACA_DIGITS]
        .iter()
        .find_map(|pattern| pattern.captures(text).and_then(|caps| caps.get(1)))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();
    let chord = first_number(&[&CHORD, &CHORD_TRAILING], text).unwrap_or(DEFAULT_CHORD_MM);

    let summary = format!("Parsed NACA code: {code}, chord: {chord} mm");
    let mut params = BTreeMap::new();
    params.insert("naca".to_string(), json!(code));
    params.insert("chord".to_string(), json!(chord));
    response(IntentKind::Airfoil, params, summary)
}

fn propulsion(text: &str) -> ClassifyResponse {
    let auw = first_number(&[&AUW_FLAG, &AUW_GRAMS], text).unwrap_or(DEFAULT_AUW_G);
    let duration =
        first_number(&[&DURATION_FLAG, &DURATION_MINUTES], text).unwrap_or(DEFAULT_DURATION_MIN);

    let summary = format!("Selecting propulsion for AUW={auw} g, duration={duration} min");
    let mut params = BTreeMap::new();
    params.insert("auw".to_string(), json!(auw));
    params.insert("duration_min".to_string(), json!(duration));
    response(IntentKind::Propulsion, params, summary)
}

fn cg(text: &str) -> ClassifyResponse {
    let parts: Vec<String> = CG_PARTS
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|list| {
            PART_SEPARATORS
                .split(list.as_str())
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let summary = if parts.is_empty() {
        "Checking CG.".to_string()
    } else {
        format!("Checking CG for parts: {}", parts.join(", "))
    };
    let mut params = BTreeMap::new();
    params.insert("parts".to_string(), json!(parts));
    response(IntentKind::Cg, params, summary)
}

fn drc(text: &str) -> ClassifyResponse {
    let part_id = PART_ID
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| DEFAULT_PART_ID.to_string());

    let summary = format!("Running DRC on part: {part_id}");
    let mut params = BTreeMap::new();
    params.insert("part_id".to_string(), json!(part_id));
    response(IntentKind::Drc, params, summary)
}

fn first_number(patterns: &[&Regex], text: &str) -> Option<f64> {
    patterns.iter().find_map(|pattern| {
        pattern
            .captures(text)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<f64>().ok())
    })
}

fn response(
    intent: IntentKind,
    params: BTreeMap<String, Value>,
    agent_response: String,
) -> ClassifyResponse {
    ClassifyResponse {
        intent,
        params,
        agent_response,
    }
}
