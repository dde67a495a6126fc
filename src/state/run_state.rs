//! Lifecycle of a crawl run

use std::fmt;

/// The crawl engine's state machine: `Running -> Done`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RunState {
    /// Batches are still being dispatched
    #[default]
    Running,

    /// The frontier is exhausted or the page budget is reached; the manifest is final
    Done,
}

impl RunState {
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
