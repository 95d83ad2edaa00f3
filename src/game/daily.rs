use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use super::pattern::{PatternError, PatternGenerator};
use super::storage;
use super::tap::{MismatchPolicy, Round, TapOutcome};

pub const DAILY_FILE_NAME: &str = "daily.json";
pub const DEFAULT_COOLDOWN_SECS: i64 = 30;
pub const MAX_COOLDOWN_SECS: i64 = 7 * 24 * 60 * 60;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DailyError {
    #[error("daily puzzle already solved, next one opens at {until}")]
    OnCooldown { until: DateTime<Utc> },

    #[error(transparent)]
    Pattern(#[from] PatternError),
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DailyState {
    pub solved_at: Option<DateTime<Utc>>,
    pub hint_count: u32,
}

impl DailyState {
    pub fn next_available_at(&self, cooldown: Duration) -> Option<DateTime<Utc>> {
        self.solved_at.map(|solved_at| {
            solved_at
                .checked_add_signed(cooldown)
                .unwrap_or(DateTime::<Utc>::MAX_UTC)
        })
    }

    pub fn can_solve(&self, now: DateTime<Utc>, cooldown: Duration) -> bool {
        self.next_available_at(cooldown)
            .is_none_or(|available_at| available_at <= now)
    }

    pub fn mark_solved(&mut self, now: DateTime<Utc>) {
        self.solved_at = Some(now);
        self.hint_count = self.hint_count.saturating_add(1);
    }
}

#[derive(Debug)]
pub struct DailyPuzzle {
    round: Round,
    state: DailyState,
    cooldown: Duration,
    path: Option<PathBuf>,
}

impl DailyPuzzle {
    pub fn new<R: Rng + ?Sized>(state: DailyState, cooldown: Duration, rng: &mut R) -> Self {
        DailyPuzzle {
            round: Round::new(PatternGenerator::default().generate_with(rng), MismatchPolicy::Reset),
            state,
            cooldown,
            path: None,
        }
    }

    pub fn open<R: Rng + ?Sized>(path: &Path, cooldown: Duration, rng: &mut R) -> Self {
        let mut puzzle = Self::new(storage::load_json_or_default(path), cooldown, rng);
        puzzle.path = Some(path.to_path_buf());
        puzzle
    }

    pub fn state(&self) -> &DailyState {
        &self.state
    }

    pub fn round(&self) -> &Round {
        &self.round
    }

    pub fn can_solve(&self, now: DateTime<Utc>) -> bool {
        self.state.can_solve(now, self.cooldown)
    }

    pub fn next_available_at(&self) -> Option<DateTime<Utc>> {
        self.state.next_available_at(self.cooldown)
    }

    pub fn tap(&mut self, index: usize, now: DateTime<Utc>) -> Result<TapOutcome, DailyError> {
        if !self.can_solve(now) {
            if let Some(until) = self.next_available_at() {
                return Err(DailyError::OnCooldown { until });
            }
        }
        let outcome = self.round.tap(index)?;
        if outcome == TapOutcome::Complete {
            self.state.mark_solved(now);
            info!(hint_count = self.state.hint_count, "daily puzzle solved");
            if let Err(err) = self.save() {
                warn!(error = %err, "could not persist daily state");
            }
        }
        Ok(outcome)
    }

    pub fn next_puzzle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.round.replace(PatternGenerator::default().generate_with(rng));
    }

    pub fn save(&self) -> Result<()> {
        match &self.path {
            Some(path) => storage::save_json_atomic(path, &self.state),
            None => Ok(()),
        }
    }
}
