//! Output formatting utilities for CLI.

use grandsim::{Resource, SimulationContext, TurnEvent, TurnReport};
use serde::Serialize;
use std::fmt::Write as _;

/// JSON-serializable run result.
#[derive(Debug, Serialize)]
pub(super) struct JsonRunResult {
    /// Random seed used.
    pub(super) seed: u64,
    /// Turn counter at the end of the run.
    pub(super) turn: u32,
    /// State digest at the end of the run.
    pub(super) digest: String,
    /// Tally of events over the run.
    pub(super) events: EventCounts,
    /// Invariant violations summed over all turns.
    pub(super) invariant_violations: usize,
    /// Per-faction final state.
    pub(super) factions: Vec<JsonFactionSummary>,
}

/// JSON-serializable final state of one faction.
#[derive(Debug, Serialize)]
pub(super) struct JsonFactionSummary {
    /// Faction index.
    pub(super) id: u32,
    /// Display name.
    pub(super) name: String,
    /// Owned provinces.
    pub(super) provinces: usize,
    /// Technologies acquired.
    pub(super) technologies: usize,
    /// Banked resources by name.
    pub(super) resources: Vec<(String, i32)>,
}

impl JsonFactionSummary {
    fn from_context(ctx: &SimulationContext) -> Vec<Self> {
        ctx.factions
            .iter()
            .map(|f| Self {
                id: f.id.0,
                name: f.name.clone(),
                provinces: f.province_count(),
                technologies: f.technologies.len(),
                resources: f
                    .resources
                    .iter()
                    .map(|(resource, amount)| (resource.to_string(), amount))
                    .collect(),
            })
            .collect()
    }
}

impl JsonRunResult {
    /// Summarise a finished run.
    pub(super) fn from_run(
        ctx: &SimulationContext,
        seed: u64,
        events: EventCounts,
        invariant_violations: usize,
    ) -> Self {
        Self {
            seed,
            turn: ctx.turn,
            digest: format!("{:016x}", ctx.digest()),
            events,
            invariant_violations,
            factions: JsonFactionSummary::from_context(ctx),
        }
    }
}

/// Event tally for one or many runs.
#[derive(Debug, Default, Clone, Copy, Serialize)]
pub(super) struct EventCounts {
    /// Buildings finished.
    pub(super) constructions: u64,
    /// Mercenary camps offering troops.
    pub(super) mercenaries: u64,
    /// Revolts raised.
    pub(super) revolts: u64,
    /// Claims acquired on provinces.
    pub(super) claims: u64,
    /// Workers born.
    pub(super) births: u64,
    /// Workers lost to starvation.
    pub(super) starvations: u64,
    /// Technologies discovered.
    pub(super) research: u64,
}

impl EventCounts {
    /// Count the events of one turn.
    pub(super) fn add_report(&mut self, report: &TurnReport) {
        for event in &report.events {
            match event {
                TurnEvent::ConstructionFinished { .. } => self.constructions += 1,
                TurnEvent::MercenaryOffered { .. } => self.mercenaries += 1,
                TurnEvent::Revolt { .. } => self.revolts += 1,
                TurnEvent::ClaimAcquired { .. } => self.claims += 1,
                TurnEvent::PopulationGrew { workers, .. } => self.births += u64::from(*workers),
                TurnEvent::WorkerStarved { .. } => self.starvations += 1,
                TurnEvent::ResearchCompleted { .. } => self.research += 1,
            }
        }
    }

    /// Combine two tallies.
    pub(super) fn merge(&mut self, other: &Self) {
        self.constructions += other.constructions;
        self.mercenaries += other.mercenaries;
        self.revolts += other.revolts;
        self.claims += other.claims;
        self.births += other.births;
        self.starvations += other.starvations;
        self.research += other.research;
    }
}

/// One line per turn.
pub(super) fn format_turn_line(report: &TurnReport, ctx: &SimulationContext) -> String {
    let mut line = format!(
        "Turn {:>4}: {} transfers, {} price changes",
        report.turn,
        report.trade.transfers.len(),
        report.trade.price_changes.len()
    );
    for event in &report.events {
        match event {
            TurnEvent::Revolt {
                province,
                rebel,
                count,
                ..
            } => {
                let province = ctx.province(*province).map_or("?", |p| p.name.as_str());
                let rebel = ctx.faction(*rebel).map_or("?", |f| f.name.as_str());
                let _ = write!(line, "; revolt in {province} ({count} units, {rebel})");
            }
            TurnEvent::WorkerStarved { province } => {
                let province = ctx.province(*province).map_or("?", |p| p.name.as_str());
                let _ = write!(line, "; starvation in {province}");
            }
            TurnEvent::ResearchCompleted { faction, tech } => {
                let faction = ctx.faction(*faction).map_or("?", |f| f.name.as_str());
                let tech = ctx.content.technology(*tech).map_or("?", |t| t.name.as_str());
                let _ = write!(line, "; {faction} discovered {tech}");
            }
            _ => {}
        }
    }
    if report.invariant_violations > 0 {
        let _ = write!(line, " [{} invariant violations]", report.invariant_violations);
    }
    line
}

/// Format the final state of a run as human-readable text.
pub(super) fn format_run_text(ctx: &SimulationContext, seed: u64, events: &EventCounts) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "Simulation Result (seed: {seed})");
    let _ = writeln!(output, "  Turns: {}", ctx.turn);
    let _ = writeln!(output, "  Digest: {:016x}", ctx.digest());
    let _ = writeln!(
        output,
        "  Events: {} revolts, {} starvations, {} births, {} technologies\n",
        events.revolts, events.starvations, events.births, events.research
    );

    for faction in &ctx.factions {
        let _ = writeln!(
            output,
            "  {}: {} provinces, {} gold, {} research, {} technologies",
            faction.name,
            faction.province_count(),
            faction.resources[Resource::Gold],
            faction.resources[Resource::Research],
            faction.technologies.len()
        );
    }

    output
}

/// Batch statistics for aggregated results.
#[derive(Debug, Default)]
pub(super) struct BatchStats {
    /// Total simulations run.
    pub(super) games_played: u64,
    /// Event tally over every simulation.
    pub(super) events: EventCounts,
    /// Invariant violations over every simulation.
    pub(super) invariant_violations: u64,
    /// Final gold summed per faction.
    total_gold: Vec<f64>,
    /// Final gold sum of squares for std dev calculation.
    gold_sq_sums: Vec<f64>,
    /// Final province count summed per faction.
    total_provinces: Vec<u64>,
    /// Simulations each faction ended with the most provinces.
    pub(super) leads: Vec<u64>,
}

impl BatchStats {
    /// Create new stats for n factions.
    pub(super) fn new(num_factions: usize) -> Self {
        Self {
            games_played: 0,
            events: EventCounts::default(),
            invariant_violations: 0,
            total_gold: vec![0.0; num_factions],
            gold_sq_sums: vec![0.0; num_factions],
            total_provinces: vec![0; num_factions],
            leads: vec![0; num_factions],
        }
    }

    /// Add a finished simulation to the stats.
    pub(super) fn add_result(&mut self, ctx: &SimulationContext, events: &EventCounts, violations: usize) {
        self.games_played += 1;
        self.events.merge(events);
        self.invariant_violations += violations as u64;

        for (i, faction) in ctx.factions.iter().enumerate() {
            if i < self.total_gold.len() {
                let gold = f64::from(faction.resources[Resource::Gold]);
                self.total_gold[i] += gold;
                self.gold_sq_sums[i] += gold * gold;
                self.total_provinces[i] += faction.province_count() as u64;
            }
        }

        // Ties go to the lowest index.
        let leader = ctx
            .factions
            .iter()
            .enumerate()
            .max_by(|(ia, a), (ib, b)| a.province_count().cmp(&b.province_count()).then(ib.cmp(ia)))
            .map(|(i, _)| i);
        if let Some(slot) = leader.and_then(|i| self.leads.get_mut(i)) {
            *slot += 1;
        }
    }

    /// Merge another stats instance into this one.
    pub(super) fn merge(&mut self, other: &Self) {
        self.games_played += other.games_played;
        self.events.merge(&other.events);
        self.invariant_violations += other.invariant_violations;
        for (a, b) in self.total_gold.iter_mut().zip(&other.total_gold) {
            *a += b;
        }
        for (a, b) in self.gold_sq_sums.iter_mut().zip(&other.gold_sq_sums) {
            *a += b;
        }
        for (a, b) in self.total_provinces.iter_mut().zip(&other.total_provinces) {
            *a += b;
        }
        for (a, b) in self.leads.iter_mut().zip(&other.leads) {
            *a += b;
        }
    }

    /// Get average final gold for a faction.
    #[allow(clippy::cast_precision_loss)]
    pub(super) fn avg_gold(&self, faction_idx: usize) -> f64 {
        if self.games_played == 0 {
            return 0.0;
        }
        self.total_gold.get(faction_idx).copied().unwrap_or(0.0) / self.games_played as f64
    }

    /// Get final gold standard deviation for a faction.
    #[allow(clippy::cast_precision_loss)]
    pub(super) fn gold_std_dev(&self, faction_idx: usize) -> f64 {
        if self.games_played == 0 {
            return 0.0;
        }
        let n = self.games_played as f64;
        let mean = self.avg_gold(faction_idx);
        let sq_sum = self.gold_sq_sums.get(faction_idx).copied().unwrap_or(0.0);
        let variance = (sq_sum / n) - (mean * mean);
        if variance < 0.0 { 0.0 } else { variance.sqrt() }
    }

    /// Get average final province count for a faction.
    #[allow(clippy::cast_precision_loss)]
    pub(super) fn avg_provinces(&self, faction_idx: usize) -> f64 {
        if self.games_played == 0 {
            return 0.0;
        }
        self.total_provinces.get(faction_idx).copied().unwrap_or(0) as f64 / self.games_played as f64
    }

    /// Share of simulations a faction led (0.0-1.0).
    #[allow(clippy::cast_precision_loss)]
    pub(super) fn lead_rate(&self, faction_idx: usize) -> f64 {
        if self.games_played == 0 {
            return 0.0;
        }
        self.leads.get(faction_idx).copied().unwrap_or(0) as f64 / self.games_played as f64
    }
}

/// JSON-serializable batch result.
#[derive(Debug, Serialize)]
pub(super) struct JsonBatchResult {
    /// Total simulations run.
    games_played: u64,
    /// Event tally over every simulation.
    events: EventCounts,
    /// Invariant violations over every simulation.
    invariant_violations: u64,
    /// Per-faction statistics.
    factions: Vec<JsonBatchFaction>,
}

/// JSON-serializable per-faction batch stats.
#[derive(Debug, Serialize)]
pub(super) struct JsonBatchFaction {
    /// Faction index.
    faction: usize,
    /// Display name.
    name: String,
    /// Average final gold.
    avg_gold: f64,
    /// Final gold standard deviation.
    gold_std_dev: f64,
    /// Average final province count.
    avg_provinces: f64,
    /// Share of simulations led on provinces.
    lead_rate: f64,
}

impl JsonBatchResult {
    /// Create from stats and faction names.
    pub(super) fn from_stats(stats: &BatchStats, names: &[String]) -> Self {
        let factions = names
            .iter()
            .enumerate()
            .map(|(i, name)| JsonBatchFaction {
                faction: i,
                name: name.clone(),
                avg_gold: stats.avg_gold(i),
                gold_std_dev: stats.gold_std_dev(i),
                avg_provinces: stats.avg_provinces(i),
                lead_rate: stats.lead_rate(i),
            })
            .collect();

        Self {
            games_played: stats.games_played,
            events: stats.events,
            invariant_violations: stats.invariant_violations,
            factions,
        }
    }
}

/// Format batch stats as human-readable text.
pub(super) fn format_batch_text(stats: &BatchStats, names: &[String]) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "Batch Results ({} simulations)", stats.games_played);
    output.push_str("========================================\n\n");

    output.push_str("Province Lead:\n");
    for (i, name) in names.iter().enumerate() {
        let _ = writeln!(
            output,
            "  {name}: {:.1}% (avg {:.1} provinces)",
            stats.lead_rate(i) * 100.0,
            stats.avg_provinces(i)
        );
    }

    output.push_str("\nFinal Gold:\n");
    for (i, name) in names.iter().enumerate() {
        let _ = writeln!(
            output,
            "  {name}: {:.1} (+/- {:.1})",
            stats.avg_gold(i),
            stats.gold_std_dev(i)
        );
    }

    let events = &stats.events;
    let _ = writeln!(
        output,
        "\nEvents: {} revolts, {} claims, {} starvations, {} births, {} technologies",
        events.revolts, events.claims, events.starvations, events.births, events.research
    );
    let _ = writeln!(output, "Invariant violations: {}", stats.invariant_violations);

    output
}

/// Format batch stats as CSV.
pub(super) fn format_batch_csv(stats: &BatchStats, names: &[String]) -> String {
    let mut output = String::new();

    // Header
    output.push_str("faction,name,avg_gold,gold_std_dev,avg_provinces,lead_rate\n");

    // Data rows
    for (i, name) in names.iter().enumerate() {
        let _ = writeln!(
            output,
            "{i},{name},{:.2},{:.2},{:.2},{:.4}",
            stats.avg_gold(i),
            stats.gold_std_dev(i),
            stats.avg_provinces(i),
            stats.lead_rate(i)
        );
    }

    output
}
