pub mod daily;
pub mod pattern;
pub mod records;
pub mod speed_run;
pub mod state;
pub mod storage;
pub mod tap;

pub use pattern::{Grid, Pattern, PatternError, PatternGenerator, generate_pattern};
pub use state::Difficulty;
pub use tap::{MismatchPolicy, Round, TapOutcome, TapResult, check_tap, check_tap_with};
