#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Contest runner that drives the world until a colony prevails.
//!
//! The referee ticks the world until it ends on its own, the safety bound is
//! reached, or an external stop flag is raised. It keeps the per-tick
//! statistics history that plotting collaborators consume and produces the
//! final [`ContestResult`].

use std::sync::atomic::{AtomicBool, Ordering};

use petri_core::{Command, ContestPhase, ContestResult, Event, FieldStats, SAFETY_TICK_LIMIT};
use petri_world::{self as world, query, World};

/// Default number of ticks between progress reports.
const DEFAULT_REPORT_INTERVAL: u64 = 100;

/// Drives a contest to completion and records its history.
#[derive(Debug)]
pub struct Referee {
    max_ticks: u64,
    report_every: u64,
    history: Vec<FieldStats>,
    scratch: Vec<Event>,
}

impl Referee {
    /// Creates a referee bounded by the standard safety tick limit.
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_ticks: SAFETY_TICK_LIMIT,
            report_every: DEFAULT_REPORT_INTERVAL,
            history: Vec::new(),
            scratch: Vec::new(),
        }
    }

    /// Overrides the number of ticks after which the contest is cut off.
    #[must_use]
    pub fn with_max_ticks(mut self, max_ticks: u64) -> Self {
        self.max_ticks = max_ticks;
        self
    }

    /// Overrides how often progress is logged. Zero disables progress logs.
    #[must_use]
    pub fn with_report_every(mut self, ticks: u64) -> Self {
        self.report_every = ticks;
        self
    }

    /// Tick bound applied to contests that never end on their own.
    #[must_use]
    pub const fn max_ticks(&self) -> u64 {
        self.max_ticks
    }

    /// Statistics recorded after every tick of the last run.
    #[must_use]
    pub fn history(&self) -> &[FieldStats] {
        &self.history
    }

    /// Runs the contest and reports its outcome.
    ///
    /// The stop flag is checked between ticks, so a raised flag leaves the
    /// world in a consistent state. Only a contest that ended on its own is
    /// marked as completed.
    pub fn run(&mut self, world: &mut World, stop: &AtomicBool) -> ContestResult {
        self.history.clear();

        while query::phase(world) == ContestPhase::Running {
            if stop.load(Ordering::Relaxed) {
                tracing::warn!(tick = query::tick(world), "contest stopped on request");
                break;
            }
            if query::tick(world) >= self.max_ticks {
                tracing::warn!(
                    max_ticks = self.max_ticks,
                    "contest reached the tick limit without a winner"
                );
                break;
            }

            self.scratch.clear();
            world::apply(world, Command::Tick, &mut self.scratch);

            let stats = query::field_stats(world);
            let tick = query::tick(world);
            if self.report_every > 0 && tick % self.report_every == 0 {
                let populations: Vec<usize> =
                    stats.colonies.iter().map(|colony| colony.alive).collect();
                tracing::info!(
                    tick,
                    ?populations,
                    nutrients = stats.nutrients,
                    "contest progress"
                );
            }
            self.history.push(stats);
        }

        let completed = query::phase(world) == ContestPhase::Ended;
        let result = ContestResult::new(query::colony_reports(world), query::tick(world), completed);
        tracing::info!(
            matchup = %result.matchup(),
            ticks = result.ticks,
            completed,
            points = result.points(),
            "contest finished"
        );
        result
    }
}

impl Default for Referee {
    fn default() -> Self {
        Self::new()
    }
}
