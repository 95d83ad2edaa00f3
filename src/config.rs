use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::TimeDelta;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::game::daily::{DAILY_FILE_NAME, DEFAULT_COOLDOWN_SECS, MAX_COOLDOWN_SECS};
use crate::game::records::{RECORDS_FILE_NAME, TOP_LIMIT};
use crate::game::speed_run::{DEFAULT_TIME_LIMIT, MAX_TIME_LIMIT};
use crate::game::storage;
use crate::game::tap::MismatchPolicy;

const SETTINGS_FILE_NAME: &str = "settings.json";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub speed_run_seconds: u64,
    pub daily_cooldown_secs: i64,
    pub ranking_size: usize,
    pub mismatch_policy: MismatchPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            speed_run_seconds: DEFAULT_TIME_LIMIT.as_secs(),
            daily_cooldown_secs: DEFAULT_COOLDOWN_SECS,
            ranking_size: TOP_LIMIT,
            mismatch_policy: MismatchPolicy::Reset,
        }
    }
}

impl Settings {
    pub fn speed_run_limit(&self) -> Duration {
        Duration::from_secs(self.speed_run_seconds.clamp(1, MAX_TIME_LIMIT.as_secs()))
    }

    pub fn daily_cooldown(&self) -> TimeDelta {
        let secs = self.daily_cooldown_secs.clamp(0, MAX_COOLDOWN_SECS);
        TimeDelta::try_seconds(secs).unwrap_or_else(|| TimeDelta::seconds(DEFAULT_COOLDOWN_SECS))
    }
}

pub struct Paths {
    pub settings_path: PathBuf,
    pub records_path: PathBuf,
    pub daily_path: PathBuf,
}

impl Paths {
    pub fn in_dir(dir: &Path) -> Self {
        Paths {
            settings_path: dir.join(SETTINGS_FILE_NAME),
            records_path: dir.join(RECORDS_FILE_NAME),
            daily_path: dir.join(DAILY_FILE_NAME),
        }
    }
}

pub fn project_paths() -> Result<Paths> {
    let proj = ProjectDirs::from("com", "patternrun", "PatternRun")
        .context("could not resolve project directories")?;
    let dir = proj.data_local_dir();
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    Ok(Paths::in_dir(dir))
}

pub fn load_settings(path: &Path) -> Settings {
    storage::load_json_or_default(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_settings_fill_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE_NAME);
        fs::write(&path, r#"{ "speed_run_seconds": 10, "mismatch_policy": "keep" }"#).unwrap();
        let settings = load_settings(&path);
        assert_eq!(settings.speed_run_seconds, 10);
        assert_eq!(settings.mismatch_policy, MismatchPolicy::Keep);
        assert_eq!(settings.daily_cooldown_secs, DEFAULT_COOLDOWN_SECS);
        assert_eq!(settings.ranking_size, TOP_LIMIT);
    }

    #[test]
    fn limits_are_clamped() {
        let settings = Settings {
            speed_run_seconds: 0,
            daily_cooldown_secs: -5,
            ..Settings::default()
        };
        assert_eq!(settings.speed_run_limit(), Duration::from_secs(1));
        assert_eq!(settings.daily_cooldown(), TimeDelta::zero());
    }

    #[test]
    fn huge_limits_are_capped() {
        let settings = Settings {
            speed_run_seconds: u64::MAX,
            daily_cooldown_secs: i64::MAX,
            ..Settings::default()
        };
        assert_eq!(settings.speed_run_limit(), MAX_TIME_LIMIT);
        assert_eq!(settings.daily_cooldown(), TimeDelta::seconds(MAX_COOLDOWN_SECS));
    }

    #[test]
    fn paths_share_a_directory() {
        let paths = Paths::in_dir(Path::new("/tmp/patternrun"));
        assert_eq!(paths.records_path, Path::new("/tmp/patternrun/records.json"));
        assert_eq!(paths.daily_path, Path::new("/tmp/patternrun/daily.json"));
        assert_eq!(paths.settings_path, Path::new("/tmp/patternrun/settings.json"));
    }
}
