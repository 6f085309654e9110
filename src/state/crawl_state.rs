/// Crawl lifecycle state definitions
///
/// A crawl moves `Idle -> Running -> {Completed, Aborted}` exactly once.
use std::fmt;

/// Represents the current state of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlState {
    /// Engine constructed, nothing fetched yet
    Idle,

    /// Frontier is being drained
    Running,

    // ===== Terminal States =====
    /// Frontier exhausted or page limit reached
    Completed,

    /// Stopped by a fatal error or a cancellation request
    Aborted,
}

impl CrawlState {
    /// Returns true if this is a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Aborted)
    }

    /// Returns true if moving from `self` to `next` is a legal transition
    pub fn can_transition_to(&self, next: CrawlState) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Running)
                | (Self::Idle, Self::Aborted)
                | (Self::Running, Self::Completed)
                | (Self::Running, Self::Aborted)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Aborted => "aborted",
        }
    }
}

impl fmt::Display for CrawlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_terminal() {
        assert!(!CrawlState::Idle.is_terminal());
        assert!(!CrawlState::Running.is_terminal());
        assert!(CrawlState::Completed.is_terminal());
        assert!(CrawlState::Aborted.is_terminal());
    }

    #[test]
    fn test_legal_transitions() {
        assert!(CrawlState::Idle.can_transition_to(CrawlState::Running));
        assert!(CrawlState::Running.can_transition_to(CrawlState::Completed));
        assert!(CrawlState::Running.can_transition_to(CrawlState::Aborted));
        assert!(CrawlState::Idle.can_transition_to(CrawlState::Aborted));
    }

    #[test]
    fn test_illegal_transitions() {
        assert!(!CrawlState::Idle.can_transition_to(CrawlState::Completed));
        assert!(!CrawlState::Running.can_transition_to(CrawlState::Idle));
        assert!(!CrawlState::Completed.can_transition_to(CrawlState::Running));
        assert!(!CrawlState::Aborted.can_transition_to(CrawlState::Completed));
        assert!(!CrawlState::Completed.can_transition_to(CrawlState::Completed));
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", CrawlState::Idle), "idle");
        assert_eq!(format!("{}", CrawlState::Aborted), "aborted");
    }
}
