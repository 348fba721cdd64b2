//! Retry policy for the update loop.
//!
//! [`PollPolicy::next_action`] is a pure function of the last poll's outcome, so the loop only
//! executes the returned [`NextAction`].

use std::time::Duration;

use yobot_core::TransportErrorKind;

/// Fixed delay before a delayed re-poll.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(5000);

/// What the loop does after a status that does not by itself mean "poll again".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusAction {
    /// Stop polling; the process must be restarted to resume.
    #[default]
    Halt,
    /// Wait the retry delay and poll again.
    Resume,
}

/// Result of one fetch as seen by the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    Status(u16),
    Failed(TransportErrorKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextAction {
    PollNow,
    PollAfter(Duration),
    /// Stop the loop, optionally after waiting.
    Halt { after: Option<Duration> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub retry_delay: Duration,
    /// Status >= 500. The retry delay is always waited first.
    pub on_server_error: StatusAction,
    /// Status 429.
    pub on_rate_limit: StatusAction,
    /// Any status other than 200, 204, 429 or >= 500.
    pub on_unexpected_status: StatusAction,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            retry_delay: DEFAULT_RETRY_DELAY,
            on_server_error: StatusAction::Halt,
            on_rate_limit: StatusAction::Halt,
            on_unexpected_status: StatusAction::Halt,
        }
    }
}

impl PollPolicy {
    /// Never stops: every status that would halt waits the retry delay and polls again.
    pub fn keep_polling() -> Self {
        Self {
            on_server_error: StatusAction::Resume,
            on_rate_limit: StatusAction::Resume,
            on_unexpected_status: StatusAction::Resume,
            ..Self::default()
        }
    }

    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    pub fn next_action(&self, outcome: PollOutcome) -> NextAction {
        match outcome {
            PollOutcome::Status(200 | 204) => NextAction::PollNow,
            PollOutcome::Status(status) if status >= 500 => match self.on_server_error {
                StatusAction::Halt => NextAction::Halt {
                    after: Some(self.retry_delay),
                },
                StatusAction::Resume => NextAction::PollAfter(self.retry_delay),
            },
            PollOutcome::Status(429) => self.status_action(self.on_rate_limit),
            PollOutcome::Status(_) => self.status_action(self.on_unexpected_status),
            PollOutcome::Failed(
                TransportErrorKind::ConnectionReset | TransportErrorKind::BadResponse,
            ) => NextAction::PollNow,
            PollOutcome::Failed(TransportErrorKind::Other) => {
                NextAction::PollAfter(self.retry_delay)
            }
        }
    }

    fn status_action(&self, action: StatusAction) -> NextAction {
        match action {
            StatusAction::Halt => NextAction::Halt { after: None },
            StatusAction::Resume => NextAction::PollAfter(self.retry_delay),
        }
    }
}
