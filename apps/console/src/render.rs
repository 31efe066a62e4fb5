use std::fmt::Write as _;

use shared::domain::{Outcome, Verdict};

/// Full text of the panel for `outcome`. Nothing from an earlier turn survives.
pub fn render(outcome: &Outcome) -> String {
    let mut out = String::new();

    match (outcome.verdict, outcome.status_text.is_empty()) {
        (Verdict::None, true) => {}
        (Verdict::None, false) => {
            let _ = writeln!(out, "{}", outcome.status_text);
        }
        (verdict, _) => {
            let _ = writeln!(
                out,
                "[{}] {}",
                verdict.label().to_uppercase(),
                outcome.status_text
            );
        }
    }

    for row in &outcome.params {
        let _ = writeln!(out, "  {}: {}", row.label, row.value);
    }

    if !outcome.message.is_empty() {
        let _ = writeln!(out, "{}", outcome.message);
    }

    if !outcome.propulsion_options.is_empty() {
        for (i, option) in outcome.propulsion_options.iter().enumerate() {
            let _ = writeln!(
                out,
                "  {}. {}  thrust {} g  mass {} g",
                i + 1,
                option.name,
                option.thrust_g,
                option.mass_g
            );
        }
        out.push_str("Type `select N` to insert one.\n");
    }

    out
}
