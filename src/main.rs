use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use gridplan::{display, plan, Grid, PlanningConfig, Result};

/// Command line argument parser.
#[derive(Parser, Debug)]
#[command(about = "Plan an optimal policy for a grid world by value iteration", long_about = None)]
pub struct Args {
    /// Path to a grid description JSON file.
    grid_path: PathBuf,

    /// Path to a planning configuration TOML file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Discount rate, overrides the configuration file.
    #[arg(short, long)]
    gamma: Option<f64>,

    /// Convergence threshold, overrides the configuration file.
    #[arg(short, long)]
    threshold: Option<f64>,

    /// Maximum number of sweeps, overrides the configuration file.
    #[arg(short, long)]
    max_iterations: Option<usize>,

    /// Log every sweep.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the grid.
    Map,
    /// Print the value of every free cell.
    Values {
        #[arg(long)]
        csv: bool,
    },
    /// Print the optimal action for every free cell.
    Policy {
        #[arg(long)]
        csv: bool,
    },
    /// Print the grid, values and policy.
    Solve,
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "gridplan=debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn planning_config(args: &Args) -> Result<PlanningConfig> {
    let mut config = match &args.config {
        Some(path) => {
            info!("Reading config file: {}", path.display());
            PlanningConfig::load(path)?
        }
        None => PlanningConfig::default(),
    };
    if let Some(gamma) = args.gamma {
        config.gamma = gamma;
    }
    if let Some(threshold) = args.threshold {
        config.threshold = threshold;
    }
    if let Some(max_iterations) = args.max_iterations {
        config.max_iterations = max_iterations;
    }
    config.validate()
}

fn run(args: &Args) -> Result<()> {
    info!("Reading grid file: {}", args.grid_path.display());
    let grid = Grid::load(&args.grid_path)?;
    let config = planning_config(args)?;

    match &args.command {
        Commands::Map => {
            print!("{}", display::render_map(&grid));
        }
        Commands::Values { csv } => {
            let (solution, _) = plan(&grid, &config)?;
            if *csv {
                display::write_values_csv(&grid, &solution.values, io::stdout().lock())?;
            } else {
                print!("{}", display::render_values(&grid, &solution.values));
            }
        }
        Commands::Policy { csv } => {
            let (_, policy) = plan(&grid, &config)?;
            if *csv {
                display::write_policy_csv(&policy, io::stdout().lock())?;
            } else {
                print!("{}", display::render_policy(&grid, &policy));
            }
        }
        Commands::Solve => {
            let (solution, policy) = plan(&grid, &config)?;
            println!("Map");
            print!("{}", display::render_map(&grid));
            println!("\nValues Map");
            print!("{}", display::render_values(&grid, &solution.values));
            println!("\nPolicy Map");
            print!("{}", display::render_policy(&grid, &policy));
        }
    }
    Ok(())
}
