//! Round numbering from the collector's cycle counter.
//!
//! The cycle counter counts down and is sometimes null; a null carries the last valid
//! value forward. The round of a turn is the distance from the battle's baseline cycle.
//!
//! Two departures from the bare `baseline - effective` difference:
//!
//! - rounds are clamped to never decrease, so a counter that jumps back up (cycles
//!   `[3, 1, 2]`) yields rounds `[0, 2, 2]` rather than `[0, 2, 1]`;
//! - when turn 0 has no counter, the first non-null counter becomes the baseline
//!   instead of treating the missing baseline as zero.

use crate::battle::log_ingest::TurnEntry;

/// Accumulator threaded through one scan of the turn history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundFold {
    baseline: Option<i64>,
    last_valid: Option<i64>,
    last_round: i64,
}

impl RoundFold {
    pub fn new(baseline: Option<i64>) -> Self {
        Self {
            baseline,
            last_valid: baseline,
            last_round: 0,
        }
    }

    /// Advance over one turn, returning the next state and that turn's round.
    /// Rounds never decrease even if the counter jumps back up.
    pub fn step(self, cycle_index: Option<i64>) -> (Self, i64) {
        let last_valid = cycle_index.or(self.last_valid);
        let round = match (self.baseline, last_valid) {
            (Some(baseline), Some(effective)) => baseline - effective,
            _ => 0,
        }
        .max(self.last_round);
        (
            Self {
                baseline: self.baseline,
                last_valid,
                last_round: round,
            },
            round,
        )
    }
}

/// Baseline cycle: the first turn's counter, or the first non-null one after it.
pub fn cycle_baseline(turns: &[TurnEntry]) -> Option<i64> {
    turns.iter().find_map(|turn| turn.cycle_index)
}

pub fn derive_rounds(turns: &[TurnEntry]) -> Vec<i64> {
    turns
        .iter()
        .scan(RoundFold::new(cycle_baseline(turns)), |fold, turn| {
            let (next, round) = fold.step(turn.cycle_index);
            *fold = next;
            Some(round)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turns(cycles: &[Option<i64>]) -> Vec<TurnEntry> {
        cycles
            .iter()
            .map(|cycle| TurnEntry {
                avatar_id: None,
                action_value: 0.0,
                wave_index: 1,
                cycle_index: *cycle,
            })
            .collect()
    }

    #[test]
    fn null_cycles_carry_the_last_valid_value_forward() {
        let rounds = derive_rounds(&turns(&[Some(5), None, Some(4), None, None, Some(2)]));
        assert_eq!(rounds, vec![0, 0, 1, 1, 1, 3]);
    }

    #[test]
    fn all_null_cycles_collapse_to_round_zero() {
        let rounds = derive_rounds(&turns(&[None, None, None]));
        assert_eq!(rounds, vec![0, 0, 0]);
    }

    #[test]
    fn leading_nulls_use_the_first_valid_cycle_as_baseline() {
        let rounds = derive_rounds(&turns(&[None, Some(3), Some(2)]));
        assert_eq!(rounds, vec![0, 0, 1]);
    }

    #[test]
    fn rounds_never_decrease() {
        let rounds = derive_rounds(&turns(&[Some(3), Some(1), Some(2)]));
        assert_eq!(rounds, vec![0, 2, 2]);
    }

    #[test]
    fn step_is_testable_in_isolation() {
        let fold = RoundFold::new(Some(10));
        let (fold, first) = fold.step(None);
        let (_, second) = fold.step(Some(8));
        assert_eq!((first, second), (0, 2));
    }
}
