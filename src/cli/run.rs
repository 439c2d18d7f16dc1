//! Run command implementation.

use super::output::{EventCounts, JsonRunResult, format_run_text, format_turn_line};
use super::{CliError, OutputFormat, WorldArgs, seed_or_clock};
use grandsim::ChaChaSyncRand;
use std::path::PathBuf;

/// Execute the run command.
///
/// # Errors
///
/// Returns an error if the world cannot be loaded or the result cannot be
/// written.
pub(crate) fn execute(
    world: &WorldArgs,
    seed: Option<u64>,
    turns: u32,
    format: OutputFormat,
    save: Option<PathBuf>,
    quiet: bool,
) -> Result<(), CliError> {
    let mut ctx = world.load()?;
    let seed = seed_or_clock(seed);
    let mut rng = ChaChaSyncRand::new(seed);

    let mut events = EventCounts::default();
    let mut violations = 0;
    for _ in 0..turns {
        let report = ctx.do_turn(&mut rng);
        events.add_report(&report);
        violations += report.invariant_violations;
        if !quiet && format == OutputFormat::Text {
            println!("{}", format_turn_line(&report, &ctx));
        }
    }

    match format {
        OutputFormat::Text => {
            if !quiet {
                println!();
            }
            print!("{}", format_run_text(&ctx, seed, &events));
            if violations > 0 {
                println!("  Invariant violations: {violations}");
            }
        }
        OutputFormat::Json => {
            let result = JsonRunResult::from_run(&ctx, seed, events, violations);
            let json = serde_json::to_string_pretty(&result)
                .map_err(|e| CliError::new(format!("JSON serialization failed: {e}")))?;
            println!("{json}");
        }
    }

    if let Some(path) = save {
        ctx.save(&path)?;
        if format == OutputFormat::Text {
            println!("\nState saved to: {}", path.display());
        }
    }

    Ok(())
}
