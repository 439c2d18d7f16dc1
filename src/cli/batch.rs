//! Batch command implementation.

use super::output::{BatchStats, EventCounts, JsonBatchResult, format_batch_csv, format_batch_text};
use super::{BatchFormat, CliError, WorldArgs, seed_or_clock};
use grandsim::{ChaChaSyncRand, SimulationContext};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::time::Instant;

/// Execute the batch command.
///
/// Every simulation starts from the same world; only the seed differs.
///
/// # Errors
///
/// Returns an error if the world cannot be loaded.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn execute(
    world: &WorldArgs,
    games: u64,
    seed: Option<u64>,
    threads: Option<usize>,
    turns: u32,
    format: BatchFormat,
    progress: bool,
) -> Result<(), CliError> {
    let initial = world.load()?;
    let names: Vec<String> = initial.factions.iter().map(|f| f.name.clone()).collect();

    // Set thread pool size if specified
    if let Some(num_threads) = threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
            .ok(); // Ignore error if already initialized
    }

    let base_seed = seed_or_clock(seed);

    let pb = if progress {
        let pb = ProgressBar::new(games);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} simulations ({per_sec})")
            .map_err(|e| CliError::new(format!("progress template: {e}")))?
            .progress_chars("=>-");
        pb.set_style(style);
        Some(pb)
    } else {
        None
    };

    let start = Instant::now();
    let stats = run_batch(&initial, games, base_seed, turns, pb.as_ref());
    if let Some(pb) = pb {
        pb.finish_with_message("done");
    }

    let duration = start.elapsed();
    let games_per_sec = if duration.as_secs_f64() > 0.0 {
        stats.games_played as f64 / duration.as_secs_f64()
    } else {
        0.0
    };

    match format {
        BatchFormat::Text => {
            println!();
            print!("{}", format_batch_text(&stats, &names));
            println!();
            println!(
                "Duration: {:.2}s ({games_per_sec:.0} simulations/sec)",
                duration.as_secs_f64()
            );
        }
        BatchFormat::Json => {
            let result = JsonBatchResult::from_stats(&stats, &names);
            let json = serde_json::to_string_pretty(&result)
                .map_err(|e| CliError::new(format!("JSON serialization failed: {e}")))?;
            println!("{json}");
        }
        BatchFormat::Csv => {
            print!("{}", format_batch_csv(&stats, &names));
        }
    }

    Ok(())
}

/// Run `games` simulations from `initial` in parallel, seeds counting up
/// from `base_seed`. The progress bar ticks once per finished simulation.
fn run_batch(
    initial: &SimulationContext,
    games: u64,
    base_seed: u64,
    turns: u32,
    pb: Option<&ProgressBar>,
) -> BatchStats {
    let num_factions = initial.factions.len();

    // Each thread accumulates into its own BatchStats, merged at the end
    (0..games)
        .into_par_iter()
        .fold(
            || BatchStats::new(num_factions),
            |mut local_stats, i| {
                let mut ctx = initial.clone();
                let mut rng = ChaChaSyncRand::new(base_seed.wrapping_add(i));
                let mut events = EventCounts::default();
                let mut violations = 0;
                for _ in 0..turns {
                    let report = ctx.do_turn(&mut rng);
                    events.add_report(&report);
                    violations += report.invariant_violations;
                }
                local_stats.add_result(&ctx, &events, violations);
                if let Some(pb) = pb {
                    pb.inc(1);
                }
                local_stats
            },
        )
        .reduce(
            || BatchStats::new(num_factions),
            |mut a, b| {
                a.merge(&b);
                a
            },
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use grandsim::ScenarioBuilder;

    #[test]
    fn test_progress_ticks_once_per_simulation() {
        let initial = ScenarioBuilder::new().factions(2).build().unwrap();
        let pb = ProgressBar::hidden();
        pb.set_length(6);

        let stats = run_batch(&initial, 6, 11, 3, Some(&pb));

        assert_eq!(stats.games_played, 6);
        assert_eq!(pb.position(), 6);
    }

    #[test]
    fn test_batch_runs_without_progress_bar() {
        let initial = ScenarioBuilder::new().factions(2).build().unwrap();

        let stats = run_batch(&initial, 4, 3, 2, None);

        assert_eq!(stats.games_played, 4);
        assert_eq!(stats.invariant_violations, 0);
    }
}
