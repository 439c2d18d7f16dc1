#![no_main]

//! Scenario loading fuzzer.
//!
//! Arbitrary bytes must either be rejected with an error or yield a context
//! that survives a turn.

use grandsim::{ChaChaSyncRand, SimulationContext};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(json) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(mut ctx) = SimulationContext::from_json_str(json) else {
        return;
    };

    let mut rng = ChaChaSyncRand::new(0);
    let _ = ctx.do_turn(&mut rng);
    let _ = ctx.to_json();
});
