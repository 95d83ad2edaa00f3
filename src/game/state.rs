use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use super::pattern::{PatternError, PatternGenerator};

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum,
)]
pub enum Difficulty {
    #[default]
    Low,
    Intermediate,
    High,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Low, Difficulty::Intermediate, Difficulty::High];

    /// `(rows, cols, pattern length)`
    pub fn config(self) -> (usize, usize, usize) {
        match self {
            Difficulty::Low => (3, 3, 3),
            Difficulty::Intermediate => (4, 4, 5),
            Difficulty::High => (5, 5, 7),
        }
    }

    pub fn generator(self) -> Result<PatternGenerator, PatternError> {
        let (rows, cols, length) = self.config();
        PatternGenerator::new(rows, cols, length)
    }

    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Low => "Low",
            Difficulty::Intermediate => "Intermediate",
            Difficulty::High => "High",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Difficulty::Low => "Beginner",
            Difficulty::Intermediate => "Intermediate",
            Difficulty::High => "Advanced",
        }
    }

    pub fn from_label(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Difficulty::Low),
            "intermediate" => Some(Difficulty::Intermediate),
            "high" => Some(Difficulty::High),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub answer_count: u32,
    pub date_label: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerRecords {
    pub low: Vec<ScoreEntry>,
    pub intermediate: Vec<ScoreEntry>,
    pub high: Vec<ScoreEntry>,
}

impl PlayerRecords {
    pub fn entries(&self, difficulty: Difficulty) -> &[ScoreEntry] {
        match difficulty {
            Difficulty::Low => &self.low,
            Difficulty::Intermediate => &self.intermediate,
            Difficulty::High => &self.high,
        }
    }

    pub fn entries_mut(&mut self, difficulty: Difficulty) -> &mut Vec<ScoreEntry> {
        match difficulty {
            Difficulty::Low => &mut self.low,
            Difficulty::Intermediate => &mut self.intermediate,
            Difficulty::High => &mut self.high,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.low.is_empty() && self.intermediate.is_empty() && self.high.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_are_valid() {
        for difficulty in Difficulty::ALL {
            let generator = difficulty.generator().unwrap();
            let (rows, cols, length) = difficulty.config();
            assert_eq!(generator.grid().cells(), rows * cols);
            assert_eq!(generator.length(), length);
        }
    }

    #[test]
    fn labels_round_trip() {
        for difficulty in Difficulty::ALL {
            assert_eq!(Difficulty::from_label(difficulty.label()), Some(difficulty));
        }
        assert_eq!(Difficulty::from_label(" HIGH "), Some(Difficulty::High));
        assert_eq!(Difficulty::from_label("expert"), None);
    }

    #[test]
    fn serialized_with_wire_labels() {
        let json = serde_json::to_string(&Difficulty::Intermediate).unwrap();
        assert_eq!(json, "\"Intermediate\"");
    }
}
