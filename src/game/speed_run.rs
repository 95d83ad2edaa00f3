use std::time::{Duration, Instant};

use rand::Rng;
use thiserror::Error;
use tracing::{debug, info};

use super::pattern::{PatternError, PatternGenerator};
use super::state::Difficulty;
use super::tap::{MismatchPolicy, Round, TapOutcome};

pub const DEFAULT_TIME_LIMIT: Duration = Duration::from_secs(5);
pub const MAX_TIME_LIMIT: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpeedRunError {
    #[error("time is up")]
    TimeUp,

    #[error(transparent)]
    Pattern(#[from] PatternError),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpeedRunResult {
    pub difficulty: Difficulty,
    pub answer_count: u32,
}

#[derive(Debug)]
pub struct SpeedRun {
    difficulty: Difficulty,
    generator: PatternGenerator,
    round: Round,
    answer_count: u32,
    deadline: Instant,
}

impl SpeedRun {
    pub fn start<R: Rng + ?Sized>(
        difficulty: Difficulty,
        time_limit: Duration,
        policy: MismatchPolicy,
        now: Instant,
        rng: &mut R,
    ) -> Result<Self, PatternError> {
        let generator = difficulty.generator()?;
        let round = Round::new(generator.generate_with(rng), policy);
        let time_limit = time_limit.min(MAX_TIME_LIMIT);
        let deadline = now.checked_add(time_limit).unwrap_or(now);
        info!(difficulty = difficulty.label(), ?time_limit, "speed run started");
        Ok(SpeedRun {
            difficulty,
            generator,
            round,
            answer_count: 0,
            deadline,
        })
    }

    pub fn round(&self) -> &Round {
        &self.round
    }

    pub fn answer_count(&self) -> u32 {
        self.answer_count
    }

    pub fn remaining(&self, now: Instant) -> Duration {
        self.deadline.saturating_duration_since(now)
    }

    pub fn remaining_secs(&self, now: Instant) -> u64 {
        self.remaining(now).as_secs_f64().round() as u64
    }

    pub fn is_over(&self, now: Instant) -> bool {
        now >= self.deadline
    }

    pub fn tap<R: Rng + ?Sized>(
        &mut self,
        index: usize,
        now: Instant,
        rng: &mut R,
    ) -> Result<TapOutcome, SpeedRunError> {
        if self.is_over(now) {
            debug!(index, "tap after deadline");
            return Err(SpeedRunError::TimeUp);
        }
        let outcome = self.round.tap(index)?;
        if outcome == TapOutcome::Complete {
            self.answer_count = self.answer_count.saturating_add(1);
            self.round.replace(self.generator.generate_with(rng));
            debug!(answer_count = self.answer_count, "pattern solved");
        }
        Ok(outcome)
    }

    pub fn finish(self) -> SpeedRunResult {
        info!(
            difficulty = self.difficulty.label(),
            answer_count = self.answer_count,
            "speed run finished"
        );
        SpeedRunResult {
            difficulty: self.difficulty,
            answer_count: self.answer_count,
        }
    }
}
