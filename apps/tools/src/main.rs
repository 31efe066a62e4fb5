use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use server_api::DrcRules;
use shared::{
    domain::{CgResult, DrcResult, Violation},
    geometry::{self, NacaCode, DEFAULT_SAMPLES},
    verdict::{drc_verdict, mass_center_delta_mm},
};

#[derive(Parser, Debug)]
#[command(about = "Offline geometry and check utilities")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Csv,
    Json,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print NACA 4-digit section coordinates.
    Airfoil {
        code: String,
        #[arg(long, default_value_t = 200.0)]
        chord: f64,
        #[arg(long, default_value_t = DEFAULT_SAMPLES)]
        samples: usize,
        #[arg(long, value_enum, default_value_t = Format::Csv)]
        format: Format,
    },
    /// Grade a CG offset in millimetres.
    Cg { delta_mm: f64 },
    /// Grade a mass centre given in metres.
    MassCenter { x: f64, y: f64, z: f64 },
    /// Look up design-rule violations for a part.
    Drc {
        part_id: String,
        #[arg(long, default_value = "data/drc_rules.json")]
        rules: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Airfoil {
            code,
            chord,
            samples,
            format,
        } => {
            let code = NacaCode::parse(&code)?;
            anyhow::ensure!(
                chord > 0.0 && chord.is_finite(),
                "chord must be greater than 0 mm"
            );
            let points = geometry::generate(&code, chord, samples);
            match format {
                Format::Csv => {
                    println!("x,y");
                    for p in &points {
                        println!("{:.4},{:.4}", p.x, p.y);
                    }
                }
                Format::Json => println!("{}", serde_json::to_string_pretty(&points)?),
            }
        }
        Command::Cg { delta_mm } => print_cg(CgResult::from_delta(delta_mm)),
        Command::MassCenter { x, y, z } => {
            print_cg(CgResult::from_delta(mass_center_delta_mm([x, y, z])))
        }
        Command::Drc { part_id, rules } => {
            let rules = DrcRules::load(&rules)
                .with_context(|| format!("loading rules for part {part_id}"))?;
            let result = DrcResult {
                violations: rules
                    .violations_for(part_id.trim())
                    .into_iter()
                    .map(Violation::from)
                    .collect(),
            };
            for violation in &result.violations {
                println!("{violation}");
            }
            println!("verdict={}", drc_verdict(&result).label());
        }
    }

    Ok(())
}

fn print_cg(result: CgResult) {
    println!(
        "delta_mm={:.2} ok={} verdict={}",
        result.delta_mm,
        result.ok,
        result.verdict.label()
    );
}
