//! QCore command-line interface.
//!
//! Terminal counterpart of the circuit-building exercise page: browse
//! exercises, preview circuits on the simulation backend and submit them
//! for grading.

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use console::style;
use tracing_subscriber::EnvFilter;

use qcore_circuit::PlacementPolicy;

mod commands;

use commands::common::Overrides;
use commands::{exercise, exercises, gates, health, simulate, submit, version};

/// QCore - build quantum circuits and check them against exercises
#[derive(Parser)]
#[command(name = "qcore")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Configuration file (defaults to ~/.qcore/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Simulation backend URL
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Shots for simulations
    #[arg(long, global = true)]
    shots: Option<u32>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the simulation backend is up
    Health,

    /// List the gates the backend accepts
    Gates {
        /// Show the built-in catalog without contacting the backend
        #[arg(long)]
        offline: bool,
    },

    /// List available exercises
    Exercises,

    /// Show one exercise
    Exercise {
        /// Exercise ID
        id: String,

        /// Number of hints to reveal
        #[arg(long, default_value = "0")]
        hints: usize,
    },

    /// Simulate a circuit file
    Simulate {
        /// Circuit file (JSON or YAML)
        #[arg(short, long)]
        input: PathBuf,

        /// Register size (overrides the file)
        #[arg(short, long)]
        qubits: Option<u32>,

        /// Placement rule for control qubits
        #[arg(long, value_enum)]
        policy: Option<PolicyArg>,
    },

    /// Submit a circuit file as the answer to an exercise
    Submit {
        /// Exercise ID
        exercise: String,

        /// Circuit file (JSON or YAML)
        #[arg(short, long)]
        input: PathBuf,

        /// Placement rule for control qubits
        #[arg(long, value_enum)]
        policy: Option<PolicyArg>,

        /// Preview the circuit before submitting
        #[arg(long)]
        preview: bool,
    },

    /// Show version information
    Version,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PolicyArg {
    /// Only cell exclusivity is enforced
    Relaxed,
    /// At most one two-qubit control per time step
    OneControlPerStep,
}

impl From<PolicyArg> for PlacementPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Relaxed => PlacementPolicy::Relaxed,
            PolicyArg::OneControlPerStep => PlacementPolicy::OneControlPerStep,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();

    let overrides = Overrides {
        config: cli.config,
        api_url: cli.api_url,
        shots: cli.shots,
    };

    let result = match cli.command {
        Commands::Health => health::execute(&overrides).await,

        Commands::Gates { offline } => gates::execute(&overrides, offline).await,

        Commands::Exercises => exercises::execute(&overrides).await,

        Commands::Exercise { id, hints } => exercise::execute(&overrides, &id, hints).await,

        Commands::Simulate {
            input,
            qubits,
            policy,
        } => simulate::execute(&overrides, &input, qubits, policy.map(Into::into)).await,

        Commands::Submit {
            exercise,
            input,
            policy,
            preview,
        } => {
            submit::execute(
                &overrides,
                &exercise,
                &input,
                policy.map(Into::into),
                preview,
            )
            .await
        }

        Commands::Version => {
            version::execute();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
