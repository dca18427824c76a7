use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tp_flow::{RegimeMap, Segment, SweepDefinition, SweepSpacing};
use tp_project::Setup;
use tracing_subscriber::EnvFilter;

mod error;
mod session;

use error::{AppError, AppResult};
use session::build_session;

#[derive(Parser)]
#[command(name = "tp-cli")]
#[command(about = "Two-phase pipe flow CLI - flow pattern maps for upward gas-liquid flow", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate setup file syntax and values
    Validate {
        /// Path to the setup file (.yaml, .yml or .json)
        setup_path: PathBuf,
    },
    /// Classify the flow pattern of every operating point
    Classify {
        /// Path to the setup file (.yaml, .yml or .json)
        setup_path: PathBuf,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Compute the clipped transition lines of the flow-pattern map
    Map {
        /// Path to the setup file (.yaml, .yml or .json)
        setup_path: PathBuf,
        #[command(flatten)]
        sweep: SweepArgs,
        /// Print JSON instead of a summary
        #[arg(long)]
        json: bool,
    },
    /// Elongated-bubble velocities of every operating point, all models
    Closures {
        /// Path to the setup file (.yaml, .yml or .json)
        setup_path: PathBuf,
    },
}

/// Gas velocity sweep; flags override the setup file.
#[derive(clap::Args)]
struct SweepArgs {
    /// First gas superficial velocity [m/s]
    #[arg(long)]
    from: Option<f64>,
    /// Last gas superficial velocity [m/s]
    #[arg(long)]
    to: Option<f64>,
    /// Number of samples
    #[arg(long)]
    points: Option<usize>,
    /// Logarithmic spacing
    #[arg(long)]
    log: bool,
}

impl SweepArgs {
    fn resolve(&self, setup: &Setup) -> AppResult<SweepDefinition> {
        let base = setup.sweep.map(|s| s.to_sweep()).unwrap_or(SweepDefinition {
            start: 0.01,
            end: 20.0,
            num_points: 200,
            spacing: SweepSpacing::Logarithmic,
        });
        let sweep = SweepDefinition {
            start: self.from.unwrap_or(base.start),
            end: self.to.unwrap_or(base.end),
            num_points: self.points.unwrap_or(base.num_points),
            spacing: if self.log {
                SweepSpacing::Logarithmic
            } else {
                base.spacing
            },
        };
        sweep.validate()?;
        Ok(sweep)
    }
}

fn main() -> AppResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { setup_path } => cmd_validate(&setup_path),
        Commands::Classify { setup_path, json } => cmd_classify(&setup_path, json),
        Commands::Map {
            setup_path,
            sweep,
            json,
        } => cmd_map(&setup_path, &sweep, json),
        Commands::Closures { setup_path } => cmd_closures(&setup_path),
    }
}

fn load_setup(path: &Path) -> AppResult<Setup> {
    let setup = tp_project::load(path)?;
    tracing::info!(path = %path.display(), name = %setup.name, "loaded setup");
    Ok(setup)
}

fn require_points(setup: &Setup) -> AppResult<()> {
    if setup.operating_points.is_empty() {
        return Err(AppError::InvalidInput(format!(
            "setup '{}' has no operating points",
            setup.name
        )));
    }
    Ok(())
}

fn cmd_validate(setup_path: &Path) -> AppResult<()> {
    println!("Validating setup: {}", setup_path.display());
    let setup = load_setup(setup_path)?;
    println!("✓ Setup is valid");
    println!(
        "  {} / {} in a {} m pipe, {} operating points",
        setup.fluids.liquid,
        setup.fluids.gas,
        setup.pipe.diameter_m,
        setup.operating_points.len()
    );
    Ok(())
}

#[derive(serde::Serialize)]
struct PointRow<'a> {
    index: usize,
    label: Option<&'a str>,
    v_sl: f64,
    v_sg: f64,
    regime: Option<&'static str>,
    code: Option<u8>,
    error: Option<String>,
}

fn cmd_classify(setup_path: &Path, json: bool) -> AppResult<()> {
    let setup = load_setup(setup_path)?;
    require_points(&setup)?;
    let mut tp = build_session(&setup)?;
    let result = tp.classify()?;

    let rows: Vec<PointRow> = setup
        .operating_points
        .iter()
        .enumerate()
        .map(|(index, p)| PointRow {
            index,
            label: p.label.as_deref(),
            v_sl: p.v_sl,
            v_sg: p.v_sg,
            regime: result.labels[index].map(|l| l.as_str()),
            code: result.labels[index].map(|l| l.code()),
            error: result
                .failures
                .iter()
                .find(|f| f.index == index)
                .map(|f| f.error.to_string()),
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    println!(
        "{:>4}  {:<12} {:>10} {:>10}  regime",
        "#", "label", "v_sl", "v_sg"
    );
    for row in &rows {
        let regime = match (&row.regime, &row.error) {
            (Some(r), _) => r.to_string(),
            (None, Some(e)) => format!("error: {e}"),
            (None, None) => "-".to_string(),
        };
        println!(
            "{:>4}  {:<12} {:>10.4} {:>10.4}  {}",
            row.index,
            row.label.unwrap_or("-"),
            row.v_sl,
            row.v_sg,
            regime
        );
    }
    if !result.is_complete() {
        println!(
            "{} of {} points could not be classified",
            result.num_failed(),
            result.len()
        );
    }
    Ok(())
}

fn cmd_map(setup_path: &Path, args: &SweepArgs, json: bool) -> AppResult<()> {
    let setup = load_setup(setup_path)?;
    require_points(&setup)?;
    let sweep = args.resolve(&setup)?;
    let mut tp = build_session(&setup)?;
    let lines = tp.transition_lines(&sweep)?;
    if !lines.failures.is_empty() {
        tracing::warn!(
            failed = lines.failures.len(),
            "some F line samples did not converge"
        );
    }
    let map = lines.cut()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&map)?);
        return Ok(());
    }
    print_map_summary(&sweep, &map);
    Ok(())
}

fn print_map_summary(sweep: &SweepDefinition, map: &RegimeMap) {
    println!("{sweep}");
    let cuts = &map.intersections;
    println!("Intersections (v_sg, v_sl) [m/s]:");
    println!("  F-G  ({:.4}, {:.4})", cuts.fg.x, cuts.fg.y);
    println!("  E-F  ({:.4}, {:.4})", cuts.ef.x, cuts.ef.y);
    match cuts.fh {
        Some(fh) => println!("  F-H  ({:.4}, {:.4})", fh.x, fh.y),
        None => println!("  F-H  not found"),
    }
    println!("  E-H  ({:.4}, {:.4})", cuts.eh.x, cuts.eh.y);
    println!("Annular onset (J): v_sg = {:.4} m/s", map.annular_onset);
    println!("Segments:");
    for (name, seg) in [("E", &map.e), ("F", &map.f), ("G", &map.g), ("H", &map.h)] {
        println!("  {name}: {}", describe(seg));
    }
}

fn describe(seg: &Segment) -> String {
    match (seg.first(), seg.last()) {
        (Some(a), Some(b)) => format!(
            "{} points, ({:.4}, {:.4}) .. ({:.4}, {:.4})",
            seg.len(),
            a.0,
            a.1,
            b.0,
            b.1
        ),
        _ => "empty".to_string(),
    }
}

fn cmd_closures(setup_path: &Path) -> AppResult<()> {
    let setup = load_setup(setup_path)?;
    require_points(&setup)?;
    let mut tp = build_session(&setup)?;

    print!("{:>4}", "#");
    for model in tp_flow::EbModel::ALL {
        print!("  {:>24}", model.author());
    }
    println!();

    let mut columns = Vec::new();
    for model in tp_flow::EbModel::ALL {
        columns.push(tp.eb_velocity(model).map(|s| s.values()));
    }
    for index in 0..setup.operating_points.len() {
        print!("{index:>4}");
        for column in &columns {
            match column {
                Ok(v) => match v.get(index).or(v.first()) {
                    Some(u) => print!("  {u:>24.4}"),
                    None => print!("  {:>24}", "-"),
                },
                Err(_) => print!("  {:>24}", "error"),
            }
        }
        println!();
    }
    for (model, column) in tp_flow::EbModel::ALL.iter().zip(&columns) {
        if let Err(e) = column {
            tracing::warn!(model = %model, error = %e, "bubble velocity model failed");
        }
    }
    Ok(())
}
