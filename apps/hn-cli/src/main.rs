use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use hn_config::{BuildWarning, build_engine, load};
use hn_graph::HasMeta;
use hn_sim::{RunOptions, SimError, run};
use tracing::warn;

#[derive(Parser)]
#[command(name = "hn-cli")]
#[command(about = "HydroNet CLI - Hydraulic process network simulation tool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a network definition file
    Validate {
        /// Path to the network YAML/JSON file
        network_path: PathBuf,
    },
    /// List components in a network
    Components {
        /// Path to the network YAML/JSON file
        network_path: PathBuf,
    },
    /// Run a fixed-step simulation
    Run {
        /// Path to the network YAML/JSON file
        network_path: PathBuf,
        /// End time in seconds
        #[arg(long)]
        t_end: f64,
        /// Time step in seconds (defaults to the file's settings)
        #[arg(long)]
        dt: Option<f64>,
        /// Record a frame every N steps
        #[arg(long, default_value_t = 20)]
        record_every: usize,
        /// Restrict CSV output to one component id
        #[arg(long)]
        component: Option<String>,
        /// Output CSV file path (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error("Config error: {0}")]
    Config(#[from] hn_config::ConfigError),

    #[error("Simulation error: {0}")]
    Sim(#[from] SimError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

type CliResult<T> = Result<T, CliError>;

fn main() -> CliResult<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { network_path } => cmd_validate(&network_path),
        Commands::Components { network_path } => cmd_components(&network_path),
        Commands::Run {
            network_path,
            t_end,
            dt,
            record_every,
            component,
            output,
        } => cmd_run(
            &network_path,
            t_end,
            dt,
            record_every,
            component.as_deref(),
            output.as_deref(),
        ),
    }
}

fn report_warning(warning: &BuildWarning) {
    match warning {
        BuildWarning::DuplicateId { id } => {
            warn!(id = %id, "duplicate id, first entry kept");
        }
        BuildWarning::DanglingReference {
            component,
            reference,
            ..
        } => {
            warn!(component = %component, reference = %reference, "reference to unknown component");
        }
        BuildWarning::UnknownPumpKind { id, kind } => {
            warn!(pump = %id, kind = %kind, "unknown pump kind, assuming fixed-speed");
        }
        BuildWarning::InvalidComponent { id, reason } => {
            warn!(id = %id, reason = %reason, "component skipped");
        }
    }
}

fn cmd_validate(network_path: &Path) -> CliResult<()> {
    println!("Validating network: {}", network_path.display());
    let def = load(network_path)?;
    let report = build_engine(&def);

    if report.warnings.is_empty() {
        println!("✓ Network is valid");
    } else {
        println!("Network loaded with {} warning(s):", report.warnings.len());
        for warning in &report.warnings {
            report_warning(warning);
        }
    }
    Ok(())
}

fn cmd_components(network_path: &Path) -> CliResult<()> {
    let def = load(network_path)?;
    let report = build_engine(&def);

    println!("Components in network:");
    for category in hn_sim::EVALUATION_ORDER {
        let mut any = false;
        for component in report.engine.components_by_category(category) {
            if !any {
                println!("  {category}:");
                any = true;
            }
            let meta = component.meta();
            println!(
                "    {} (in: [{}], out: [{}])",
                meta.id,
                meta.inputs.join(", "),
                meta.outputs.join(", ")
            );
        }
    }
    Ok(())
}

fn cmd_run(
    network_path: &Path,
    t_end: f64,
    dt: Option<f64>,
    record_every: usize,
    component: Option<&str>,
    output: Option<&Path>,
) -> CliResult<()> {
    let def = load(network_path)?;
    let report = build_engine(&def);
    for warning in &report.warnings {
        report_warning(warning);
    }
    let mut engine = report.engine;

    let dt = dt.unwrap_or(engine.settings().time_step_s);
    eprintln!("Running simulation: dt = {dt:.3} s, t_end = {t_end:.3} s");

    let options = RunOptions::new(dt, t_end)?.with_record_every(record_every);
    let records = run(&mut engine, &options)?;

    let mut out: Box<dyn Write> = match output {
        Some(path) => Box::new(std::fs::File::create(path)?),
        None => Box::new(io::stdout()),
    };

    // Wide CSV: one row per frame, one column per component/key pair.
    let mut columns: Vec<(String, String)> = Vec::new();
    if let Some(first) = records.first() {
        for (id, snap) in &first.snapshots {
            if component.is_some_and(|only| only != id) {
                continue;
            }
            for key in snap.keys() {
                columns.push((id.clone(), key.clone()));
            }
        }
    }
    write!(out, "t_s")?;
    for (id, key) in &columns {
        write!(out, ",{id}.{key}")?;
    }
    writeln!(out)?;
    for record in &records {
        write!(out, "{:.4}", record.t_s)?;
        for (id, key) in &columns {
            let value = record
                .snapshots
                .iter()
                .find(|(sid, _)| sid == id)
                .and_then(|(_, snap)| snap.get(key));
            match value {
                Some(v) => write!(out, ",{v}")?,
                None => write!(out, ",")?,
            }
        }
        writeln!(out)?;
    }

    eprintln!(
        "✓ Simulation completed: {} frame(s), t = {:.3} s",
        records.len(),
        engine.time_s()
    );
    Ok(())
}
