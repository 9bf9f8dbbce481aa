use core::fmt;

/// Structured failures surfaced by the session control surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameError {
    /// A level load asked for a level number outside the campaign.
    LevelOutOfRange { requested: u32, max: u32 },
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LevelOutOfRange { requested, max } => {
                write!(f, "level {requested} out of range (valid levels are 1..={max})")
            }
        }
    }
}

impl std::error::Error for GameError {}
