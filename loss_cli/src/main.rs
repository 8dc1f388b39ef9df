//! # Prestress Loss CLI
//!
//! Runs a girder-line scenario through the time-step loss engine and prints
//! strand and tendon losses at every analysis point.
//!
//! ```text
//! loss_cli [scenario.json] [--settings settings.json] [--interval N] [--json]
//! ```
//!
//! Without a scenario file the built-in demo girder is analyzed. Log output
//! goes to stderr and is controlled with `RUST_LOG` (default `info`).

use std::process::ExitCode;

use loss_core::collaborators::{BridgeTopology, PrestressSteel};
use loss_core::details::{LossRecord, PrestressStep};
use loss_core::intervals::IntervalIndex;
use loss_core::keys::GirderKey;
use loss_core::poi::AnalysisPoint;
use loss_core::reference::ReferenceModel;
use loss_core::{LossError, LossResult, LossSettings, TimeStepLossEngine};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default)]
struct Options {
    scenario: Option<String>,
    settings: Option<String>,
    interval: Option<IntervalIndex>,
    json: bool,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> LossResult<Options> {
    let mut options = Options::default();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--json" => options.json = true,
            "--interval" => {
                let value = args.next().unwrap_or_default();
                let interval = value
                    .parse()
                    .map_err(|_| LossError::invalid_input("--interval", value.clone(), "Expected an interval index"))?;
                options.interval = Some(interval);
            }
            "--settings" => {
                options.settings = Some(
                    args.next()
                        .ok_or_else(|| LossError::invalid_input("--settings", "", "Expected a file path"))?,
                );
            }
            flag if flag.starts_with("--") => {
                return Err(LossError::invalid_input("arguments", flag, "Unknown option"));
            }
            _ => options.scenario = Some(arg),
        }
    }
    Ok(options)
}

fn steel_label(step: &PrestressStep) -> String {
    match step.steel {
        PrestressSteel::Strand(_, strand_type) if step.row > 0 => format!("{strand_type} row {}", step.row + 1),
        PrestressSteel::Strand(_, strand_type) => strand_type.to_string(),
        PrestressSteel::Tendon(duct) => format!("Duct {}", duct.duct + 1),
    }
}

fn print_table(title: &str, records: &[LossRecord], steps: impl Fn(&LossRecord) -> &[PrestressStep]) {
    let Some(first) = records.iter().find(|r| !steps(r).is_empty()) else {
        return;
    };

    println!("═══════════════════════════════════════");
    println!("  {title}");
    println!("═══════════════════════════════════════");
    let header: Vec<String> = steps(first).iter().map(|s| format!("{:>24}", steel_label(s))).collect();
    println!("{:>8} {:>10} {}", "Group", "x (in)", header.join(""));
    println!("{:>8} {:>10} {}", "", "", "        fpe / loss (ksi)".repeat(header.len()));

    for record in records {
        let cells: Vec<String> = steps(record)
            .iter()
            .map(|s| {
                if s.stressed {
                    format!("{:>13.2} /{:>8.2}", s.fpe, s.loss.cumulative)
                } else {
                    format!("{:>24}", "-")
                }
            })
            .collect();
        println!(
            "{:>8} {:>10.1} {}",
            record.source.segment.group + 1,
            record.source.distance_from_girder_start,
            cells.join("")
        );
    }
    println!();
}

fn run(options: &Options) -> LossResult<()> {
    let mut model = match &options.scenario {
        Some(path) => ReferenceModel::load(path)?,
        None => ReferenceModel::demo(),
    };
    let settings = match &options.settings {
        Some(path) => LossSettings::load(path)?,
        None => LossSettings::default(),
    };

    let last = model.model().timeline.len().saturating_sub(1);
    let interval = options.interval.unwrap_or(last);

    let mut points: Vec<AnalysisPoint> = Vec::new();
    for group in 0..model.bridge.group_count() {
        let mut girder_points = model.bridge.analysis_points(GirderKey::new(group, 0))?;
        girder_points.sort_by(|a, b| a.distance_from_girder_start.total_cmp(&b.distance_from_girder_start));
        points.extend(girder_points);
    }

    info!(scenario = %model.model().name, points = points.len(), interval, "running scenario");
    let mut engine = TimeStepLossEngine::new(settings)?;
    let records = {
        let mut cx = model.collaborators();
        points
            .iter()
            .map(|point| engine.get_losses(&mut cx, point, interval))
            .collect::<LossResult<Vec<_>>>()?
    };

    if options.json {
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else {
        let description = model
            .model()
            .timeline
            .intervals
            .get(interval)
            .map(|i| i.description.as_str())
            .unwrap_or_default();
        println!("{}", model.model().name);
        println!("Losses at the end of interval {interval}: {description}");
        println!();
        print_table("PRETENSIONED STRANDS", &records, |r| r.detail.strands.as_slice());
        print_table("POST-TENSIONING TENDONS", &records, |r| r.detail.tendons.as_slice());
    }

    for item in engine.take_status_items() {
        eprintln!("[{:?}] {:?}: {}", item.severity, item.category, item.message);
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let result = parse_args(std::env::args().skip(1)).and_then(|options| run(&options));
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            if let Ok(json) = serde_json::to_string_pretty(&e) {
                eprintln!();
                eprintln!("Error JSON:");
                eprintln!("{}", json);
            }
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> impl Iterator<Item = String> {
        list.iter().map(|s| s.to_string()).collect::<Vec<_>>().into_iter()
    }

    #[test]
    fn test_parse_args() {
        let options = parse_args(args(&["bridge.json", "--interval", "4", "--json"])).unwrap();
        assert_eq!(options.scenario.as_deref(), Some("bridge.json"));
        assert_eq!(options.interval, Some(4));
        assert!(options.json);
    }

    #[test]
    fn test_bad_arguments() {
        assert!(parse_args(args(&["--interval", "soon"])).is_err());
        assert!(parse_args(args(&["--settings"])).is_err());
        assert!(parse_args(args(&["--verbose"])).is_err());
    }

    #[test]
    fn test_demo_runs() {
        let options = Options {
            interval: Some(3),
            ..Options::default()
        };
        assert!(run(&options).is_ok());
    }
}
