// Error type for the composition engine.
//
// Only malformed input is an error: zero step or bar counts, a step
// resolution that doesn't divide the 48-tick bar, unknown key or scale
// names, and numeric parameters outside the range an algorithm accepts.
// Unknown genre/mood tags are not errors (they fall back to defaults in
// `style.rs`) and neither is uniqueness exhaustion (`uniqueness.rs` accepts
// the duplicate and flags it).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("step count must be at least 1")]
    ZeroSteps,

    #[error("bar count must be at least 1")]
    ZeroBars,

    #[error("steps per bar ({steps}) must evenly divide the {ticks}-tick bar")]
    InvalidStepsPerBar { steps: u32, ticks: u32 },

    #[error("unknown key '{0}'")]
    UnknownKey(String),

    #[error("unknown scale '{0}'")]
    UnknownScale(String),

    #[error("{name} = {value} is outside {expected}")]
    OutOfRange {
        name: &'static str,
        value: f64,
        expected: &'static str,
    },

    #[error("invalid engine configuration: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ComposeError>;

/// Fail with `OutOfRange` unless `low <= value <= high`.
pub(crate) fn check_range(
    name: &'static str,
    value: f64,
    low: f64,
    high: f64,
    expected: &'static str,
) -> Result<()> {
    if value.is_nan() || value < low || value > high {
        return Err(ComposeError::OutOfRange {
            name,
            value,
            expected,
        });
    }
    Ok(())
}
