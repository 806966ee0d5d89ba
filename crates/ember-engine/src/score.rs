//! Run scoring for batch ranking.

use ember_core::{EndReason, RunStats};

/// Tunable scoring weights.
///
/// The defaults separate outcomes decisively: a win's base score sits
/// far above any loss, fine adjustments reward saved victims and
/// punish losses, structural damage, and slow play. Whatever tuning a
/// caller picks, wins must strictly outscore losses for batch ranking
/// to mean anything.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScoreWeights {
    /// Base score for a win.
    pub win_base: i64,
    /// Base score for losing by victim count.
    pub loss_victims_base: i64,
    /// Base score for losing the building.
    pub loss_collapse_base: i64,
    /// Base score for running out the step ceiling.
    pub timeout_base: i64,
    /// Per saved victim.
    pub per_saved: i64,
    /// Per lost victim (negative).
    pub per_lost: i64,
    /// Per point of structural damage (negative).
    pub per_damage: i64,
    /// Per step taken (negative — the small time penalty).
    pub per_step: i64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            win_base: 10_000,
            loss_victims_base: -5_000,
            loss_collapse_base: -5_000,
            timeout_base: -1_000,
            per_saved: 500,
            per_lost: -500,
            per_damage: -10,
            per_step: -5,
        }
    }
}

impl ScoreWeights {
    /// Score one finished run.
    pub fn score(&self, end_reason: EndReason, stats: &RunStats, steps: u32) -> i64 {
        let base = match end_reason {
            EndReason::Win => self.win_base,
            EndReason::LossVictims => self.loss_victims_base,
            EndReason::LossCollapse => self.loss_collapse_base,
            EndReason::Timeout => self.timeout_base,
        };
        base + self.per_saved * i64::from(stats.saved)
            + self.per_lost * i64::from(stats.lost)
            + self.per_damage * i64::from(stats.damage)
            + self.per_step * i64::from(steps)
    }
}
