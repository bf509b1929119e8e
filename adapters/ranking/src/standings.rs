use std::{cmp::Ordering, collections::BTreeMap, fmt::Write};

use crate::MatchRecord;

/// Aggregated record of one policy across the log.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Standing {
    /// Display name of the policy.
    pub name: String,
    /// Contests the policy took part in.
    pub contests: usize,
    /// Contests won.
    pub wins: usize,
    /// Contests lost.
    pub losses: usize,
    /// Contests drawn.
    pub draws: usize,
    /// Points accumulated from wins.
    pub total_points: usize,
}

impl Standing {
    /// Average points per contest.
    #[must_use]
    pub fn average_points(&self) -> f64 {
        if self.contests == 0 {
            return 0.0;
        }
        self.total_points as f64 / self.contests as f64
    }

    /// Share of contests won, as a percentage.
    #[must_use]
    pub fn win_rate(&self) -> f64 {
        if self.contests == 0 {
            return 0.0;
        }
        self.wins as f64 * 100.0 / self.contests as f64
    }
}

/// Ranking table ordered by win rate, then total points.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Standings {
    entries: Vec<Standing>,
    contests: usize,
}

impl Standings {
    /// Folds the records into per-policy standings.
    #[must_use]
    pub fn from_records(records: &[MatchRecord]) -> Self {
        let mut table: BTreeMap<String, Standing> = BTreeMap::new();
        for record in records {
            let [first, second] = match record.colonies.as_slice() {
                [first, second, ..] => [first.name.as_str(), second.name.as_str()],
                _ => continue,
            };
            for name in [first, second] {
                entry(&mut table, name).contests += 1;
            }
            if record.winner == first {
                let winner = entry(&mut table, first);
                winner.wins += 1;
                winner.total_points += record.points;
                entry(&mut table, second).losses += 1;
            } else if record.winner == second {
                let winner = entry(&mut table, second);
                winner.wins += 1;
                winner.total_points += record.points;
                entry(&mut table, first).losses += 1;
            } else {
                entry(&mut table, first).draws += 1;
                entry(&mut table, second).draws += 1;
            }
        }

        let mut entries: Vec<Standing> = table.into_values().collect();
        entries.sort_by(|left, right| {
            right
                .win_rate()
                .partial_cmp(&left.win_rate())
                .unwrap_or(Ordering::Equal)
                .then_with(|| right.total_points.cmp(&left.total_points))
        });
        Self {
            entries,
            contests: records.len(),
        }
    }

    /// Standings from best to worst.
    #[must_use]
    pub fn entries(&self) -> &[Standing] {
        &self.entries
    }

    /// Number of contests folded into the table.
    #[must_use]
    pub const fn contests(&self) -> usize {
        self.contests
    }

    /// Fixed-width report listing the best `top` policies.
    #[must_use]
    pub fn report(&self, top: usize) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Standings after {} contests", self.contests);
        let _ = writeln!(
            out,
            "{:>4}  {:<20} {:>5} {:>4} {:>4} {:>4} {:>7} {:>8} {:>7}",
            "#", "policy", "games", "won", "lost", "draw", "points", "avg", "win %"
        );
        for (rank, standing) in self.entries.iter().take(top).enumerate() {
            let _ = writeln!(
                out,
                "{:>4}  {:<20} {:>5} {:>4} {:>4} {:>4} {:>7} {:>8.2} {:>6.1}%",
                rank + 1,
                standing.name,
                standing.contests,
                standing.wins,
                standing.losses,
                standing.draws,
                standing.total_points,
                standing.average_points(),
                standing.win_rate(),
            );
        }
        out
    }
}

fn entry<'a>(table: &'a mut BTreeMap<String, Standing>, name: &str) -> &'a mut Standing {
    table.entry(name.to_owned()).or_insert_with(|| Standing {
        name: name.to_owned(),
        ..Standing::default()
    })
}
