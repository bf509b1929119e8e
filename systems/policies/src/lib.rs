#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Catalogue of behavior policies that can compete in a contest.
//!
//! Every policy implements [`petri_core::Behavior`]. Callers pick entries
//! through [`PolicyKind`], which maps a catalogue index or slug onto the
//! factory the world uses to materialize organisms.

mod axis;
mod diagonal;
mod seeker;
mod tactics;
mod wanderer;

use std::{fmt, str::FromStr};

use petri_core::{Behavior, BehaviorFactory, ConfigError};

pub use axis::{Axis, AxisFollower};
pub use diagonal::DiagonalWalker;
pub use seeker::NutrientSeeker;
pub use tactics::{Tactic, Tactics};
pub use wanderer::RandomWalker;

/// Author credited for the bundled policies.
pub const AUTHOR: &str = "petri";

/// Energy above which the frugal policies divide.
pub(crate) const HIGH_MITOSIS_THRESHOLD: f64 = 5000.0;

/// Energy above which the aggressive policies divide.
pub(crate) const LOW_MITOSIS_THRESHOLD: f64 = 500.0;

/// Entries of the bundled policy catalogue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PolicyKind {
    /// Uniform random step to any neighbor.
    RandomWalker,
    /// Greedy climber toward the richest neighbor.
    NutrientSeeker,
    /// Constant `(+1, +1)` diagonal walker.
    DiagonalAscending,
    /// Constant `(-1, -1)` diagonal walker.
    DiagonalDescending,
    /// Nutrient follower restricted to the horizontal axis.
    HorizontalFollower,
    /// Nutrient follower restricted to the vertical axis.
    VerticalFollower,
    /// Tactical agent trying kill, eat, reproduce, then a random step.
    TacticsOne,
    /// Tactical agent trying eat, kill, then reproduce.
    TacticsTwo,
}

impl PolicyKind {
    /// Every catalogue entry in index order.
    pub const ALL: [Self; 8] = [
        Self::RandomWalker,
        Self::NutrientSeeker,
        Self::DiagonalAscending,
        Self::DiagonalDescending,
        Self::HorizontalFollower,
        Self::VerticalFollower,
        Self::TacticsOne,
        Self::TacticsTwo,
    ];

    /// Stable one-based catalogue index.
    #[must_use]
    pub fn index(self) -> usize {
        Self::ALL
            .iter()
            .position(|kind| *kind == self)
            .map_or(0, |position| position + 1)
    }

    /// Short identifier accepted on the command line.
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::RandomWalker => "random-walker",
            Self::NutrientSeeker => "nutrient-seeker",
            Self::DiagonalAscending => "mo-plus",
            Self::DiagonalDescending => "mo-minus",
            Self::HorizontalFollower => "mo-x",
            Self::VerticalFollower => "mo-y",
            Self::TacticsOne => "tactics-1",
            Self::TacticsTwo => "tactics-2",
        }
    }

    /// Factory building organisms of this policy.
    #[must_use]
    pub fn factory(self) -> BehaviorFactory {
        match self {
            Self::RandomWalker => random_walker,
            Self::NutrientSeeker => nutrient_seeker,
            Self::DiagonalAscending => diagonal_ascending,
            Self::DiagonalDescending => diagonal_descending,
            Self::HorizontalFollower => horizontal_follower,
            Self::VerticalFollower => vertical_follower,
            Self::TacticsOne => tactics_one,
            Self::TacticsTwo => tactics_two,
        }
    }

    /// Builds a single organism of this policy.
    #[must_use]
    pub fn build(self) -> Box<dyn Behavior> {
        (self.factory())()
    }
}

fn random_walker() -> Box<dyn Behavior> {
    Box::new(RandomWalker)
}

fn nutrient_seeker() -> Box<dyn Behavior> {
    Box::new(NutrientSeeker)
}

fn diagonal_ascending() -> Box<dyn Behavior> {
    Box::new(DiagonalWalker::ascending())
}

fn diagonal_descending() -> Box<dyn Behavior> {
    Box::new(DiagonalWalker::descending())
}

fn horizontal_follower() -> Box<dyn Behavior> {
    Box::new(AxisFollower::new(Axis::Horizontal))
}

fn vertical_follower() -> Box<dyn Behavior> {
    Box::new(AxisFollower::new(Axis::Vertical))
}

fn tactics_one() -> Box<dyn Behavior> {
    Box::new(Tactics::first())
}

fn tactics_two() -> Box<dyn Behavior> {
    Box::new(Tactics::second())
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.build().name())
    }
}

impl FromStr for PolicyKind {
    type Err = ConfigError;

    fn from_str(selector: &str) -> Result<Self, Self::Err> {
        let trimmed = selector.trim();
        if let Ok(index) = trimmed.parse::<usize>() {
            return index
                .checked_sub(1)
                .and_then(|position| Self::ALL.get(position).copied())
                .ok_or_else(|| ConfigError::UnknownPolicy(selector.to_owned()));
        }
        Self::ALL
            .into_iter()
            .find(|kind| {
                kind.slug().eq_ignore_ascii_case(trimmed)
                    || kind.build().name().eq_ignore_ascii_case(trimmed)
            })
            .ok_or_else(|| ConfigError::UnknownPolicy(selector.to_owned()))
    }
}
