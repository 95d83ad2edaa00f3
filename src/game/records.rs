use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Local;
use tracing::info;

use super::state::{Difficulty, PlayerRecords, ScoreEntry};
use super::storage;

pub const RECORDS_FILE_NAME: &str = "records.json";
pub const TOP_LIMIT: usize = 3;
const HISTORY_LIMIT: usize = 200;
const CHART_FILL: f64 = 0.8;

pub fn now_date_label() -> String {
    Local::now().format("%Y-%m-%d %H:%M").to_string()
}

/// Bar heights for a top-3 chart as fractions of the chart height. The best
/// score fills `CHART_FILL`; the `+ 1` keeps empty boards drawable.
pub fn chart_ratios(top: &[u32; TOP_LIMIT]) -> [f64; TOP_LIMIT] {
    let base = f64::from(top[0]) + 1.0;
    top.map(|value| CHART_FILL * (f64::from(value) + 1.0) / base)
}

#[derive(Debug, Default)]
pub struct RecordBook {
    path: Option<PathBuf>,
    records: PlayerRecords,
}

impl RecordBook {
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn open(path: &Path) -> Self {
        RecordBook {
            records: storage::load_json_or_default(path),
            path: Some(path.to_path_buf()),
        }
    }

    pub fn records(&self) -> &PlayerRecords {
        &self.records
    }

    pub fn register(&mut self, difficulty: Difficulty, answer_count: u32, date_label: String) -> Result<()> {
        let entries = self.records.entries_mut(difficulty);
        entries.push(ScoreEntry {
            answer_count,
            date_label,
        });
        let overflow = entries.len().saturating_sub(HISTORY_LIMIT);
        if overflow > 0 {
            entries.drain(0..overflow);
        }
        info!(difficulty = difficulty.label(), answer_count, "score registered");
        self.save()
    }

    pub fn save(&self) -> Result<()> {
        match &self.path {
            Some(path) => storage::save_json_atomic(path, &self.records),
            None => Ok(()),
        }
    }

    pub fn top(&self, difficulty: Difficulty, limit: usize) -> Vec<u32> {
        let mut counts: Vec<u32> = self
            .records
            .entries(difficulty)
            .iter()
            .map(|entry| entry.answer_count)
            .collect();
        counts.sort_unstable_by(|a, b| b.cmp(a));
        counts.truncate(limit);
        counts
    }

    pub fn top3_padded(&self, difficulty: Difficulty) -> [u32; TOP_LIMIT] {
        let mut padded = [0; TOP_LIMIT];
        for (slot, value) in padded.iter_mut().zip(self.top(difficulty, TOP_LIMIT)) {
            *slot = value;
        }
        padded
    }

    pub fn high_score(&self, difficulty: Difficulty) -> u32 {
        self.top(difficulty, 1).first().copied().unwrap_or(0)
    }

    pub fn recent(&self, difficulty: Difficulty, limit: usize) -> Vec<ScoreEntry> {
        self.records
            .entries(difficulty)
            .iter()
            .rev()
            .take(limit)
            .cloned()
            .collect()
    }
}
