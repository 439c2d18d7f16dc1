// Allow unwrap and unreadable literals in tests (test code is not production)
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::unreadable_literal))]
//! grandsim: a deterministic grand-strategy turn simulation engine.
//!
//! Each turn evolves the economy, demography and diplomacy of every faction
//! and province on a world map. The pipeline is bit-for-bit deterministic:
//! replicas fed the same state and the same random draws stay in lockstep.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │   CLI (run / batch / validate)      │
//! ├─────────────────────────────────────┤
//! │   Turn pipeline (sim::run_turn)     │
//! ├─────────────────────────────────────┤
//! │ labor · production · trade · revolt │
//! ├─────────────────────────────────────┤
//! │   SimulationContext (world state)   │
//! └─────────────────────────────────────┘
//! ```

pub mod error;
pub mod hashing;
pub mod scenario;
pub mod sim;

pub use error::{SimError, SimResult};

// Re-export key types at crate root for convenience
pub use scenario::ScenarioBuilder;
pub use sim::{
    ChaChaSyncRand, Content, Coord, Faction, FactionId, Province, ProvinceId, Resource,
    SimConfig, SimulationContext, SyncRand, TurnEvent, TurnReport,
};
