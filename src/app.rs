use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::{DateTime, Local, Utc};
use clap::{Parser, Subcommand};
use tracing::debug;

use crate::config::{self, Paths, Settings};
use crate::game::daily::{DailyError, DailyPuzzle};
use crate::game::pattern::Pattern;
use crate::game::records::{self, RecordBook};
use crate::game::speed_run::{SpeedRun, SpeedRunError};
use crate::game::state::Difficulty;
use crate::game::tap::{MismatchPolicy, TapOutcome};

const CHART_WIDTH: f64 = 30.0;
const RECENT_LIMIT: usize = 5;

#[derive(Debug, Parser)]
#[command(name = "patternrun", version, about = "Memorize a pattern, tap it back")]
pub struct Cli {
    /// Directory for settings, records and daily state
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Solve as many patterns as possible before time runs out
    SpeedRun {
        #[arg(short, long, value_enum, default_value_t = Difficulty::Low)]
        difficulty: Difficulty,

        /// Override the configured time limit
        #[arg(long)]
        seconds: Option<u64>,
    },
    /// Today's pattern; solving it earns a hint
    Daily,
    /// Top scores per difficulty
    Ranks {
        #[arg(short, long, value_enum)]
        difficulty: Option<Difficulty>,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    execute(cli, stdin.lock(), &mut stdout)
}

pub fn execute<R: BufRead, W: Write>(cli: Cli, input: R, out: &mut W) -> Result<()> {
    let paths = match &cli.data_dir {
        Some(dir) => {
            fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
            Paths::in_dir(dir)
        }
        None => config::project_paths()?,
    };
    let mut settings = config::load_settings(&paths.settings_path);
    debug!(?settings, "settings loaded");

    match cli.command {
        Command::SpeedRun {
            difficulty,
            seconds,
        } => {
            if let Some(seconds) = seconds {
                settings.speed_run_seconds = seconds;
            }
            play_speed_run(&paths, &settings, difficulty, input, out)
        }
        Command::Daily => play_daily(&paths, &settings, input, out),
        Command::Ranks { difficulty } => {
            let book = RecordBook::open(&paths.records_path);
            match difficulty {
                Some(difficulty) => write_ranks(&book, &settings, difficulty, out),
                None => {
                    for difficulty in Difficulty::ALL {
                        write_ranks(&book, &settings, difficulty, out)?;
                    }
                    Ok(())
                }
            }
        }
    }
}

pub fn render_pattern(pattern: &Pattern) -> String {
    let grid = pattern.grid();
    let width = grid.cells().saturating_sub(1).to_string().len().max(pattern.len().to_string().len());
    let mut out = String::new();
    for row in 0..grid.rows {
        let line: Vec<String> = (0..grid.cols)
            .map(|col| {
                let index = row * grid.cols + col;
                match pattern.step_of(index) {
                    Some(step) => format!("{:>width$}", step + 1),
                    None => format!("{:>width$}", "."),
                }
            })
            .collect();
        out.push_str(&line.join(" "));
        out.push('\n');
    }
    out.push_str("cells:\n");
    for row in 0..grid.rows {
        let line: Vec<String> = (0..grid.cols)
            .map(|col| format!("{:>width$}", row * grid.cols + col))
            .collect();
        out.push_str(&line.join(" "));
        out.push('\n');
    }
    out
}

fn mismatch_message(policy: MismatchPolicy) -> &'static str {
    match policy {
        MismatchPolicy::Reset => "wrong cell, start the pattern over",
        MismatchPolicy::Keep => "wrong cell, try again",
    }
}

fn local_label(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string()
}

fn play_speed_run<R: BufRead, W: Write>(
    paths: &Paths,
    settings: &Settings,
    difficulty: Difficulty,
    input: R,
    out: &mut W,
) -> Result<()> {
    let mut rng = rand::rng();
    let limit = settings.speed_run_limit();
    let mut run = SpeedRun::start(difficulty, limit, settings.mismatch_policy, Instant::now(), &mut rng)?;

    writeln!(
        out,
        "{} speed run: solve as many patterns as you can in {}s",
        difficulty.name(),
        limit.as_secs()
    )?;
    write!(out, "{}", render_pattern(run.round().pattern()))?;

    'lines: for line in input.lines() {
        let line = line?;
        for token in line.split(|c: char| c.is_whitespace() || c == ',').filter(|t| !t.is_empty()) {
            let Ok(index) = token.parse::<usize>() else {
                writeln!(out, "not a cell: {token}")?;
                continue;
            };
            match run.tap(index, Instant::now(), &mut rng) {
                Ok(TapOutcome::Advance) => {}
                Ok(TapOutcome::Complete) => {
                    writeln!(out, "solved! answers: {}", run.answer_count())?;
                    write!(out, "{}", render_pattern(run.round().pattern()))?;
                }
                Ok(TapOutcome::Mismatch) => writeln!(out, "{}", mismatch_message(settings.mismatch_policy))?,
                Err(SpeedRunError::TimeUp) => break 'lines,
                Err(SpeedRunError::Pattern(err)) => writeln!(out, "{err}")?,
            }
        }
        let now = Instant::now();
        if run.is_over(now) {
            break;
        }
        writeln!(out, "time left: {}s", run.remaining_secs(now))?;
    }

    let result = run.finish();
    let mut book = RecordBook::open(&paths.records_path);
    book.register(result.difficulty, result.answer_count, records::now_date_label())?;
    writeln!(
        out,
        "time up! answers: {}  high score: {}",
        result.answer_count,
        book.high_score(result.difficulty)
    )?;
    Ok(())
}

fn play_daily<R: BufRead, W: Write>(paths: &Paths, settings: &Settings, input: R, out: &mut W) -> Result<()> {
    let mut rng = rand::rng();
    let mut puzzle = DailyPuzzle::open(&paths.daily_path, settings.daily_cooldown(), &mut rng);

    if !puzzle.can_solve(Utc::now()) {
        write_cooldown(&puzzle, out)?;
        return Ok(());
    }

    writeln!(out, "daily pattern (hints: {})", puzzle.state().hint_count)?;
    write!(out, "{}", render_pattern(puzzle.round().pattern()))?;

    for line in input.lines() {
        let line = line?;
        for token in line.split(|c: char| c.is_whitespace() || c == ',').filter(|t| !t.is_empty()) {
            let Ok(index) = token.parse::<usize>() else {
                writeln!(out, "not a cell: {token}")?;
                continue;
            };
            match puzzle.tap(index, Utc::now()) {
                Ok(TapOutcome::Advance) => {}
                Ok(TapOutcome::Complete) => {
                    writeln!(out, "daily pattern solved! hints: {}", puzzle.state().hint_count)?;
                    puzzle.next_puzzle(&mut rng);
                    write_cooldown(&puzzle, out)?;
                    return Ok(());
                }
                Ok(TapOutcome::Mismatch) => writeln!(out, "{}", mismatch_message(MismatchPolicy::Reset))?,
                Err(DailyError::OnCooldown { .. }) => {
                    write_cooldown(&puzzle, out)?;
                    return Ok(());
                }
                Err(DailyError::Pattern(err)) => writeln!(out, "{err}")?,
            }
        }
    }

    writeln!(out, "daily pattern left unsolved")?;
    Ok(())
}

fn write_cooldown<W: Write>(puzzle: &DailyPuzzle, out: &mut W) -> Result<()> {
    if let Some(solved_at) = puzzle.state().solved_at {
        writeln!(out, "solved at: {}", local_label(solved_at))?;
    }
    if let Some(next) = puzzle.next_available_at() {
        writeln!(out, "next daily pattern at: {}", local_label(next))?;
    }
    Ok(())
}

fn write_ranks<W: Write>(book: &RecordBook, settings: &Settings, difficulty: Difficulty, out: &mut W) -> Result<()> {
    writeln!(
        out,
        "{} ({})  high score: {}",
        difficulty.name(),
        difficulty.label(),
        book.high_score(difficulty)
    )?;
    let top = book.top(difficulty, settings.ranking_size);
    if top.is_empty() {
        writeln!(out, "  no scores yet")?;
    }
    for (place, count) in top.iter().enumerate() {
        writeln!(out, "  {:>2}. {}", place + 1, count)?;
    }
    let padded = book.top3_padded(difficulty);
    for (value, ratio) in padded.iter().zip(records::chart_ratios(&padded)) {
        let bar = "#".repeat((ratio * CHART_WIDTH).round() as usize);
        writeln!(out, "  {bar:<30} {value}")?;
    }
    let recent = book.recent(difficulty, RECENT_LIMIT);
    if !recent.is_empty() {
        writeln!(out, "  recent runs:")?;
    }
    for entry in recent {
        writeln!(out, "    {}  {}", entry.date_label, entry.answer_count)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::pattern::Grid;

    #[test]
    fn render_marks_steps_in_order() {
        let pattern = Pattern::new(Grid::default(), vec![4, 2, 7]).unwrap();
        let rendered = render_pattern(&pattern);
        let expected = ". . 2\n. 1 .\n. 3 .\ncells:\n0 1 2\n3 4 5\n6 7 8\n";
        assert_eq!(rendered, expected);
    }

    #[test]
    fn render_pads_wide_grids() {
        let pattern = Pattern::new(Grid::new(4, 4), vec![15]).unwrap();
        let rendered = render_pattern(&pattern);
        assert!(rendered.starts_with(" .  .  .  .\n"));
        assert!(rendered.ends_with("12 13 14 15\n"));
    }

    #[test]
    fn cli_parses_difficulty_labels() {
        let cli = Cli::try_parse_from(["patternrun", "speed-run", "--difficulty", "high", "--seconds", "9"]).unwrap();
        match cli.command {
            Command::SpeedRun {
                difficulty,
                seconds,
            } => {
                assert_eq!(difficulty, Difficulty::High);
                assert_eq!(seconds, Some(9));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
