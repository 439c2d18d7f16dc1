//! grandsim CLI - run, batch and validate turn simulations.

// Allow print in the CLI binary
#![allow(clippy::print_stdout, clippy::print_stderr)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod cli;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

/// grandsim - a deterministic grand-strategy turn simulation
#[derive(Parser, Debug)]
#[command(name = "grandsim")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run one simulation for a number of turns
    Run {
        #[command(flatten)]
        world: cli::WorldArgs,

        /// Random seed (default: random)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Number of turns (default: 50)
        #[arg(short, long, default_value = "50")]
        turns: u32,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,

        /// Save the final state to a scenario file
        #[arg(long)]
        save: Option<PathBuf>,

        /// Suppress turn-by-turn output
        #[arg(short, long)]
        quiet: bool,
    },

    /// Run many seeds in parallel and aggregate statistics
    Batch {
        #[command(flatten)]
        world: cli::WorldArgs,

        /// Number of simulations (default: 100)
        #[arg(short, long, default_value = "100")]
        games: u64,

        /// Starting seed (increments for each simulation)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Parallel threads (default: CPU count)
        #[arg(short = 'j', long)]
        threads: Option<usize>,

        /// Turns per simulation (default: 50)
        #[arg(short, long, default_value = "50")]
        turns: u32,

        /// Output format: text, json, or csv
        #[arg(short, long, default_value = "text")]
        format: cli::BatchFormat,

        /// Show progress bar
        #[arg(short, long)]
        progress: bool,
    },

    /// Check a scenario file for structural and invariant errors
    Validate {
        /// Scenario file to validate
        #[arg(required = true)]
        scenario: PathBuf,
    },

    /// Write a grid-world scenario file
    Init {
        #[command(flatten)]
        world: cli::WorldArgs,

        /// Output file
        #[arg(required = true)]
        output: PathBuf,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let result = match args.command {
        Commands::Run {
            world,
            seed,
            turns,
            format,
            save,
            quiet,
        } => cli::run::execute(&world, seed, turns, format, save, quiet),

        Commands::Batch {
            world,
            games,
            seed,
            threads,
            turns,
            format,
            progress,
        } => cli::batch::execute(&world, games, seed, threads, turns, format, progress),

        Commands::Validate { scenario } => cli::validate::execute(&scenario),

        Commands::Init { world, output } => cli::init::execute(&world, &output),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
