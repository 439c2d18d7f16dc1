//! Scenario validation command implementation.

use super::CliError;
use grandsim::{SimError, SimulationContext, sim::calculate_borders};
use std::fs;
use std::path::Path;

/// Execute the validate command.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the scenario is invalid.
pub(crate) fn execute(scenario: &Path) -> Result<(), CliError> {
    let json = fs::read_to_string(scenario)
        .map_err(|e| CliError::new(format!("Failed to read {}: {e}", scenario.display())))?;

    println!("Validating: {}", scenario.display());
    println!();

    let parsed = SimulationContext::from_json_str(&json);
    let parse_ok = !matches!(parsed, Err(SimError::Parse(_)));
    print_check("JSON parses", parse_ok);
    let structure_ok = parsed.is_ok();
    print_check("Ids and table sizes line up", parse_ok && structure_ok);

    let mut ctx = match parsed {
        Ok(ctx) => ctx,
        Err(e) => return Err(CliError::new(format!("Invalid scenario: {e}"))),
    };

    calculate_borders(&mut ctx);
    let violations = ctx.validate();
    print_check("Invariants hold", violations.is_empty());
    for violation in &violations {
        println!("      {violation}");
    }

    println!();
    println!("Summary:");
    println!("  Map:        {}x{}", ctx.map.width(), ctx.map.height());
    println!("  Provinces:  {}", ctx.provinces.len());
    println!("  Factions:   {}", ctx.factions.len());
    println!("  Turn:       {}", ctx.turn);

    if !violations.is_empty() {
        return Err(CliError::new(format!(
            "{} invariant violations",
            violations.len()
        )));
    }

    println!();
    println!("Validation successful!");

    Ok(())
}

fn print_check(name: &str, ok: bool) {
    let status = if ok { "OK" } else { "FAILED" };
    let symbol = if ok { "✓" } else { "✗" };
    println!("  {symbol} {name}: {status}");
}
