/// Seconds on the quiz clock.
pub const QUIZ_SECONDS: u32 = 45;

/// Result of advancing the countdown by one second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownTick {
    /// Still counting; carries the seconds left.
    Running(u32),
    /// The countdown just hit zero. Reported exactly once.
    Expired,
    /// The countdown is not running; the tick did nothing.
    Inactive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    Running,
    Expired,
    Cancelled,
}

/// Explicit countdown owned by the quiz session.
///
/// The driver calls `tick` once per wall-clock second. Cancellation makes
/// every later tick inert, so a stale tick can never force a second
/// submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    remaining: u32,
    state: State,
}

impl Countdown {
    /// A countdown that has never been started.
    #[must_use]
    pub fn idle() -> Self {
        Self {
            remaining: 0,
            state: State::Idle,
        }
    }

    /// Start counting down from `seconds`.
    #[must_use]
    pub fn start(seconds: u32) -> Self {
        Self {
            remaining: seconds,
            state: State::Running,
        }
    }

    /// Seconds left on the clock.
    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state == State::Running
    }

    /// Stop the countdown. Later ticks become inert.
    pub fn cancel(&mut self) {
        if self.state == State::Running {
            self.state = State::Cancelled;
        }
    }

    /// Advance by one second.
    pub fn tick(&mut self) -> CountdownTick {
        if self.state != State::Running {
            return CountdownTick::Inactive;
        }

        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.state = State::Expired;
            CountdownTick::Expired
        } else {
            CountdownTick::Running(self.remaining)
        }
    }
}

impl Default for Countdown {
    fn default() -> Self {
        Self::idle()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expires_exactly_once() {
        let mut countdown = Countdown::start(3);
        assert_eq!(countdown.tick(), CountdownTick::Running(2));
        assert_eq!(countdown.tick(), CountdownTick::Running(1));
        assert_eq!(countdown.tick(), CountdownTick::Expired);
        assert_eq!(countdown.tick(), CountdownTick::Inactive);
        assert_eq!(countdown.tick(), CountdownTick::Inactive);
    }

    #[test]
    fn cancel_makes_ticks_inert() {
        let mut countdown = Countdown::start(QUIZ_SECONDS);
        assert_eq!(countdown.tick(), CountdownTick::Running(44));

        countdown.cancel();
        assert!(!countdown.is_running());
        assert_eq!(countdown.tick(), CountdownTick::Inactive);
        assert_eq!(countdown.remaining(), 44);
    }

    #[test]
    fn idle_countdown_never_ticks() {
        let mut countdown = Countdown::idle();
        assert_eq!(countdown.tick(), CountdownTick::Inactive);
    }

    #[test]
    fn cancel_after_expiry_keeps_expired_inert() {
        let mut countdown = Countdown::start(1);
        assert_eq!(countdown.tick(), CountdownTick::Expired);
        countdown.cancel();
        assert_eq!(countdown.tick(), CountdownTick::Inactive);
    }
}
