use std::fmt;

/// Errors raised by misconfigured engine objects.
///
/// Runtime conditions (out-of-range cells, double destroy, unknown timer names)
/// are not errors; these variants all indicate a mistake in the calling game.
#[derive(Debug)]
pub enum EngineError {
    /// `GameCamera::follow` was asked to snap to a target that does not exist.
    MissingFollowTarget,
    /// A fixed-step duration was zero, negative or not finite.
    InvalidStepDuration(f32),
    /// A sub-step size (fraction of a cell) was zero, negative or not finite.
    InvalidMaxGridMovement(f32),
    /// A JSON game config could not be parsed.
    InvalidConfig(serde_json::Error),
    /// Level cell data does not match the declared grid dimensions.
    LevelSizeMismatch { expected: usize, actual: usize },
    /// An ASCII level row is not as wide as the first row.
    RaggedRow { row: usize, expected: usize, actual: usize },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::MissingFollowTarget => write!(f, "camera follow target not set"),
            EngineError::InvalidStepDuration(step) => {
                write!(f, "fixed step duration must be positive and finite, got {step}")
            }
            EngineError::InvalidMaxGridMovement(percent) => {
                write!(f, "max grid movement must be positive and finite, got {percent}")
            }
            EngineError::InvalidConfig(err) => write!(f, "invalid game config: {err}"),
            EngineError::LevelSizeMismatch { expected, actual } => {
                write!(f, "level expects {expected} cells but {actual} were given")
            }
            EngineError::RaggedRow { row, expected, actual } => {
                write!(f, "level row {row} is {actual} cells wide, expected {expected}")
            }
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::InvalidConfig(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::InvalidConfig(err)
    }
}
