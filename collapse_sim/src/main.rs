//! Collapse Simulator CLI
//!
//! Runs seeded scenarios against the collapse engine and reports the outcome.

use clap::Parser;
use collapse_core::CorrelationPolicy;
use collapse_sim::scenarios::ScenarioId;
use collapse_sim::{ScenarioResult, ScenarioRunner, SimConfig, SimExport, SimError};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Collapse scenario simulator
#[derive(Parser, Debug)]
#[command(name = "collapse-sim")]
#[command(about = "Run seeded probabilistic-collapse scenarios", long_about = None)]
struct Args {
    /// Master seed for determinism (0 = random from time)
    #[arg(short, long, default_value = "42")]
    seed: u64,

    /// Scenario to run (planting, disjoint, independent, vacuum, all)
    #[arg(short = 'S', long, default_value = "all")]
    scenario: String,

    /// Number of consecutive seeds to run
    #[arg(long, default_value = "1")]
    seeds: usize,

    /// Grid width in cells
    #[arg(long, default_value = "10")]
    width: i32,

    /// Grid height in cells
    #[arg(long, default_value = "10")]
    height: i32,

    /// Repeated Observer1/Tree interactions in the planting scenario
    #[arg(long, default_value = "3")]
    observations: usize,

    /// Correlate resolved objects through their stored distribution
    #[arg(long)]
    stored_correlation: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// JSON output for CI parsing
    #[arg(long)]
    json: bool,

    /// Export final object states of a single scenario to a JSON file
    #[arg(long)]
    export: Option<String>,
}

impl Args {
    fn config(&self) -> SimConfig {
        SimConfig {
            seed: self.seed,
            width: self.width,
            height: self.height,
            observations: self.observations,
            policy: if self.stored_correlation {
                CorrelationPolicy::StoredDistribution
            } else {
                CorrelationPolicy::PointMass
            },
        }
    }

    fn scenarios(&self) -> Result<Vec<ScenarioId>, SimError> {
        if self.scenario == "all" {
            Ok(ScenarioId::all())
        } else {
            Ok(vec![self.scenario.parse()?])
        }
    }
}

fn main() {
    let args = Args::parse();

    // Initialize logging; RUST_LOG overrides the verbosity flag
    let level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    // Exit with proper code for CI
    match run(&args) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    }
}

/// Runs the requested scenarios; `Ok(false)` if any run failed its checks.
fn run(args: &Args) -> Result<bool, SimError> {
    if !args.json {
        info!("Collapse Simulator v{}", env!("CARGO_PKG_VERSION"));
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    }

    let scenarios = args.scenarios().map_err(|e| {
        error!("Available scenarios: planting, disjoint, independent, vacuum, all");
        e
    })?;

    // Determine base seed
    let base_seed = if args.seed == 0 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(1)
    } else {
        args.seed
    };

    // Handle --export mode
    if let Some(export_path) = &args.export {
        if scenarios.len() > 1 {
            return Err(SimError::InvalidArguments(
                "--export only supports a single scenario, not 'all'".to_string(),
            ));
        }

        let runner = ScenarioRunner::new(args.config().with_seed(base_seed));
        let result = runner.run(scenarios[0])?;
        SimExport::new(&result, runner.config()).write_to_file(export_path)?;
        info!("Exported {} objects to {}", result.objects.len(), export_path);

        report(&result);
        return Ok(result.passed);
    }

    // Run simulations
    let base_config = args.config();
    let mut all_results: Vec<ScenarioResult> = Vec::new();
    for seed_offset in 0..args.seeds {
        let seed = base_seed.wrapping_add(seed_offset as u64);
        let runner = ScenarioRunner::new(base_config.with_seed(seed));

        for scenario in &scenarios {
            let result = runner.run(*scenario)?;
            if !args.json {
                report(&result);
            }
            all_results.push(result);
        }
    }

    let total = all_results.len();
    let failed_count = all_results.iter().filter(|r| !r.passed).count();

    if args.json {
        let summary = serde_json::json!({
            "total": total,
            "passed": total - failed_count,
            "failed": failed_count,
            "results": all_results.iter().map(|r| {
                serde_json::json!({
                    "scenario": r.scenario.name(),
                    "seed": r.seed,
                    "passed": r.passed,
                    "interactions": r.interactions,
                    "correlated": r.correlated,
                    "resolved": r.resolved,
                    "objects": r.objects,
                    "failure_reason": r.failure_reason,
                })
            }).collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        info!("");
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

        if failed_count == 0 {
            info!("✅ All {} scenario runs passed!", total);
        } else {
            error!("❌ {}/{} scenario runs failed!", failed_count, total);
            for result in all_results.iter().filter(|r| !r.passed) {
                error!(
                    "  - {} seed={}: {}",
                    result.scenario.name(),
                    result.seed,
                    result.failure_reason.as_deref().unwrap_or("unknown")
                );
            }
        }
    }

    Ok(failed_count == 0)
}

fn report(result: &ScenarioResult) {
    if result.passed {
        info!("✓ {} (seed={}) PASSED", result.scenario.name(), result.seed);
    } else {
        error!(
            "✗ {} (seed={}) FAILED: {}",
            result.scenario.name(),
            result.seed,
            result.failure_reason.as_deref().unwrap_or("unknown")
        );
    }
    for object in &result.objects {
        info!("  {}", object.description);
    }
}
