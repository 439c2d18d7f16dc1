//! Init command implementation.

use super::{CliError, WorldArgs};
use std::path::Path;

/// Execute the init command: build a world and write it out.
///
/// # Errors
///
/// Returns an error if the world cannot be built or written.
pub(crate) fn execute(world: &WorldArgs, output: &Path) -> Result<(), CliError> {
    let ctx = world.load()?;
    ctx.save(output)?;

    println!(
        "Wrote {} provinces and {} factions to {}",
        ctx.provinces.len(),
        ctx.factions.len(),
        output.display()
    );
    println!("  Digest: {:016x}", ctx.digest());

    Ok(())
}
