use std::time::Duration;

/// Shortest accepted period, so a zero interval can never spin
const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Fixed-period timer with an explicit start/stop lifecycle
///
/// The ticker does not sleep by itself. It records when the next tick is due
/// and the owner asks it, with a clock reading, whether that moment has come.
/// Deadlines follow a fixed schedule (`previous due + period`) so late polls
/// do not stretch the cadence.
#[derive(Debug, Clone)]
pub struct Ticker {
    period: Duration,
    next_due: Option<Duration>,
}

impl Ticker {
    pub fn new(period: Duration) -> Self {
        Self {
            period: period.max(MIN_PERIOD),
            next_due: None,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Arm the ticker; the first tick is due one period after `now`
    pub fn start(&mut self, now: Duration) {
        self.next_due = Some(now + self.period);
    }

    pub fn stop(&mut self) {
        self.next_due = None;
    }

    /// Clock reading at which the next tick is due, if running
    pub fn next_due(&self) -> Option<Duration> {
        self.next_due
    }

    /// Consume one due tick. Returns false when stopped or not yet due.
    pub fn fire(&mut self, now: Duration) -> bool {
        match self.next_due {
            Some(due) if now >= due => {
                self.next_due = Some(due + self.period);
                true
            }
            _ => false,
        }
    }
}
