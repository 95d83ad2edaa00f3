use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::pattern::{Pattern, PatternError};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TapOutcome {
    Advance,
    Complete,
    Mismatch,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TapResult {
    pub outcome: TapOutcome,
    pub cursor: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MismatchPolicy {
    #[default]
    Reset,
    Keep,
}

pub fn check_tap(pattern: &Pattern, cursor: usize, tapped: usize) -> Result<TapResult, PatternError> {
    check_tap_with(pattern, cursor, tapped, MismatchPolicy::Reset)
}

pub fn check_tap_with(
    pattern: &Pattern,
    cursor: usize,
    tapped: usize,
    policy: MismatchPolicy,
) -> Result<TapResult, PatternError> {
    let cells = pattern.grid().cells();
    if tapped >= cells {
        return Err(PatternError::InvalidInput {
            index: tapped,
            cells,
        });
    }
    let Some(expected) = pattern.get(cursor) else {
        return Err(PatternError::CursorOutOfRange {
            cursor,
            length: pattern.len(),
        });
    };

    if tapped != expected {
        let cursor = match policy {
            MismatchPolicy::Reset => 0,
            MismatchPolicy::Keep => cursor,
        };
        return Ok(TapResult {
            outcome: TapOutcome::Mismatch,
            cursor,
        });
    }

    let next = cursor + 1;
    let outcome = if next == pattern.len() {
        TapOutcome::Complete
    } else {
        TapOutcome::Advance
    };
    Ok(TapResult {
        outcome,
        cursor: next,
    })
}

#[derive(Clone, Debug)]
pub struct Round {
    pattern: Pattern,
    cursor: usize,
    policy: MismatchPolicy,
    taps: u32,
    mismatches: u32,
}

impl Round {
    pub fn new(pattern: Pattern, policy: MismatchPolicy) -> Self {
        Round {
            pattern,
            cursor: 0,
            policy,
            taps: 0,
            mismatches: 0,
        }
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_complete(&self) -> bool {
        self.cursor == self.pattern.len()
    }

    pub fn taps(&self) -> u32 {
        self.taps
    }

    pub fn mismatches(&self) -> u32 {
        self.mismatches
    }

    /// Rejected taps (out of range, or after completion) leave the round
    /// untouched and are not counted.
    pub fn tap(&mut self, index: usize) -> Result<TapOutcome, PatternError> {
        let result = check_tap_with(&self.pattern, self.cursor, index, self.policy)?;
        self.taps = self.taps.saturating_add(1);
        if result.outcome == TapOutcome::Mismatch {
            self.mismatches = self.mismatches.saturating_add(1);
            debug!(index, cursor = self.cursor, "mismatched tap");
        } else {
            trace!(index, cursor = result.cursor, "tap accepted");
        }
        self.cursor = result.cursor;
        Ok(result.outcome)
    }

    pub fn replace(&mut self, pattern: Pattern) {
        self.pattern = pattern;
        self.cursor = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::pattern::Grid;

    fn sample_pattern(grid: Grid) -> Pattern {
        Pattern::new(grid, vec![4, 2, 7]).unwrap()
    }

    #[test]
    fn correct_first_tap_advances() {
        let pattern = sample_pattern(Grid::default());
        assert_eq!(
            check_tap(&pattern, 0, 4),
            Ok(TapResult {
                outcome: TapOutcome::Advance,
                cursor: 1
            })
        );
    }

    #[test]
    fn correct_last_tap_completes() {
        let pattern = sample_pattern(Grid::default());
        assert_eq!(
            check_tap(&pattern, 2, 7),
            Ok(TapResult {
                outcome: TapOutcome::Complete,
                cursor: 3
            })
        );
    }

    #[test]
    fn wrong_tap_resets_progress() {
        let pattern = sample_pattern(Grid::new(4, 4));
        assert_eq!(
            check_tap(&pattern, 1, 9),
            Ok(TapResult {
                outcome: TapOutcome::Mismatch,
                cursor: 0
            })
        );
    }

    #[test]
    fn wrong_tap_keeps_progress_when_asked() {
        let pattern = sample_pattern(Grid::default());
        let result = check_tap_with(&pattern, 2, 4, MismatchPolicy::Keep).unwrap();
        assert_eq!(result.outcome, TapOutcome::Mismatch);
        assert_eq!(result.cursor, 2);
    }

    #[test]
    fn tap_outside_grid_is_invalid() {
        let pattern = sample_pattern(Grid::default());
        assert_eq!(
            check_tap(&pattern, 1, 9),
            Err(PatternError::InvalidInput { index: 9, cells: 9 })
        );
        assert!(check_tap(&pattern, 0, usize::MAX).is_err());
    }

    #[test]
    fn tap_after_completion_is_invalid() {
        let pattern = sample_pattern(Grid::default());
        assert_eq!(
            check_tap(&pattern, 3, 4),
            Err(PatternError::CursorOutOfRange {
                cursor: 3,
                length: 3
            })
        );
    }

    #[test]
    fn single_cell_pattern_completes_immediately() {
        let pattern = Pattern::new(Grid::new(1, 1), vec![0]).unwrap();
        assert_eq!(check_tap(&pattern, 0, 0).unwrap().outcome, TapOutcome::Complete);
    }

    #[test]
    fn round_walks_the_pattern() {
        let mut round = Round::new(sample_pattern(Grid::default()), MismatchPolicy::Reset);
        assert_eq!(round.tap(4), Ok(TapOutcome::Advance));
        assert_eq!(round.tap(3), Ok(TapOutcome::Mismatch));
        assert_eq!(round.cursor(), 0);
        assert_eq!(round.tap(4), Ok(TapOutcome::Advance));
        assert_eq!(round.tap(2), Ok(TapOutcome::Advance));
        assert_eq!(round.tap(7), Ok(TapOutcome::Complete));
        assert!(round.is_complete());
        assert_eq!(round.taps(), 5);
        assert_eq!(round.mismatches(), 1);

        assert!(round.tap(4).is_err());
        assert_eq!(round.taps(), 5);

        round.replace(Pattern::new(Grid::default(), vec![0, 1]).unwrap());
        assert_eq!(round.cursor(), 0);
        assert!(!round.is_complete());
    }

    #[test]
    fn round_with_keep_policy_holds_the_cursor() {
        let mut round = Round::new(sample_pattern(Grid::default()), MismatchPolicy::Keep);
        assert_eq!(round.tap(4), Ok(TapOutcome::Advance));
        assert_eq!(round.tap(2), Ok(TapOutcome::Advance));
        assert_eq!(round.tap(0), Ok(TapOutcome::Mismatch));
        assert_eq!(round.cursor(), 2);
        assert_eq!(round.mismatches(), 1);
        assert_eq!(round.taps(), 3);
        assert_eq!(round.tap(7), Ok(TapOutcome::Complete));
    }

    #[test]
    fn rejected_tap_leaves_round_untouched() {
        let mut round = Round::new(sample_pattern(Grid::default()), MismatchPolicy::Reset);
        round.tap(4).unwrap();
        assert!(round.tap(42).is_err());
        assert_eq!(round.cursor(), 1);
        assert_eq!(round.taps(), 1);
    }
}
