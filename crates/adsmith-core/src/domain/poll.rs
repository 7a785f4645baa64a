//! Poll - ポーリング設定と状態
//!
//! 状態遷移そのものは `app::poller::advance` にあります。

use std::time::Duration;

/// PollConfig はポーリングのタイミングと回数上限
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// Delay before the first status query.
    pub initial_delay: Duration,
    /// Delay between later queries.
    pub interval: Duration,
    /// Number of status queries before giving up. Always at least 1.
    pub max_attempts: u32,
}

impl PollConfig {
    pub fn new(initial_delay: Duration, interval: Duration, max_attempts: u32) -> Self {
        Self {
            initial_delay,
            interval,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Delay to wait before issuing poll number `attempt + 1`, given that
    /// `attempt` polls have already been made.
    pub fn next_delay(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            self.initial_delay
        } else {
            self.interval
        }
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self::new(Duration::from_secs(3), Duration::from_secs(5), 30)
    }
}

/// PollState は 1 タスクのポーリング状態
///
/// ```text
/// Submitted -> Polling(1) -> ... -> Polling(n) -> Completed | Failed | TimedOut
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Submitted,
    /// `attempt` polls have been issued and the task is still running.
    Polling { attempt: u32 },
    Completed,
    Failed,
    TimedOut,
}

impl PollState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PollState::Completed | PollState::Failed | PollState::TimedOut
        )
    }

    /// Number of polls issued so far.
    pub fn attempts(&self) -> u32 {
        match self {
            PollState::Polling { attempt } => *attempt,
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(PollState::Submitted, false)]
    #[case(PollState::Polling { attempt: 3 }, false)]
    #[case(PollState::Completed, true)]
    #[case(PollState::Failed, true)]
    #[case(PollState::TimedOut, true)]
    fn terminal_states(#[case] state: PollState, #[case] terminal: bool) {
        assert_eq!(state.is_terminal(), terminal);
    }

    #[test]
    fn first_delay_is_initial_then_interval() {
        let config = PollConfig::new(Duration::from_secs(3), Duration::from_secs(5), 60);
        assert_eq!(config.next_delay(0), Duration::from_secs(3));
        assert_eq!(config.next_delay(1), Duration::from_secs(5));
        assert_eq!(config.next_delay(59), Duration::from_secs(5));
    }

    #[test]
    fn zero_attempts_is_raised_to_one() {
        let config = PollConfig::new(Duration::ZERO, Duration::ZERO, 0);
        assert_eq!(config.max_attempts, 1);
    }
}
