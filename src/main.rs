use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use consistency::config::{ColGenConfig, PricerKind};
use consistency::model::ColGenModel;
use consistency::utils::ProblemInstance;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PricerArg {
    Mip,
    Enumeration,
}

/// Assign every driver one route per day so that each scheduled route is driven and the
/// drivers see as few distinct clients as possible.
#[derive(Debug, Parser)]
#[command(version)]
struct Cli {
    /// Instance file: { "clients": n, "schedule": [[[client, ...], ...], ...] }
    #[arg(default_value = "./data/two_days.json")]
    instance: PathBuf,

    /// Column generation settings as JSON; command line flags take precedence
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, value_enum)]
    pricer: Option<PricerArg>,

    #[arg(long)]
    max_iterations: Option<usize>,

    #[arg(long)]
    tolerance: Option<f64>,

    /// Show Gurobi's console output
    #[arg(long)]
    solver_output: bool,

    /// Print the solution as JSON
    #[arg(long)]
    json: bool,

    /// Log every iteration's duals and columns
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn colgen_config(&self) -> anyhow::Result<ColGenConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let file = std::fs::read_to_string(path)
                    .with_context(|| format!("reading config {}", path.display()))?;
                serde_json::from_str(&file).with_context(|| format!("parsing config {}", path.display()))?
            }
            None => ColGenConfig::default(),
        };

        if let Some(pricer) = self.pricer {
            config.pricer = match pricer {
                PricerArg::Mip => PricerKind::Mip,
                PricerArg::Enumeration => PricerKind::Enumeration,
            };
        }
        if let Some(max_iterations) = self.max_iterations {
            config.max_iterations = max_iterations;
        }
        if let Some(tolerance) = self.tolerance {
            config.tolerance = tolerance;
        }
        config.solver_output |= self.solver_output;

        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let data = ProblemInstance::from_file(&cli.instance)
        .with_context(|| format!("loading instance {}", cli.instance.display()))?;
    let config = cli.colgen_config()?;

    let time = Instant::now();

    let mut model = ColGenModel::from_driver_schedules(&data, config)?;
    let solution = model.solve()?;

    log::info!("Time elapsed: {:?}", time.elapsed());

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&solution)?);
    } else {
        for path in solution.selected.iter() {
            println!("{}", path);
        }
        println!("objective = {}", solution.objective);
    }

    Ok(())
}
