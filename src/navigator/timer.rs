use std::time::{Duration, Instant};

/// A single cancellable deadline. Scheduling replaces whatever was pending,
/// so at most one callback is ever outstanding.
#[derive(Debug, Default, Clone)]
pub struct Timer {
    deadline: Option<Instant>,
}

impl Timer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, now: Instant, delay: Duration) {
        self.deadline = Some(now + delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|d| now >= d)
    }

    /// Time left before the deadline, zero once it has passed.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.deadline.map(|d| d.saturating_duration_since(now))
    }

    /// Consume the deadline if it has passed. Returns whether it fired.
    pub fn take_due(&mut self, now: Instant) -> bool {
        if self.is_due(now) {
            self.deadline = None;
            true
        } else {
            false
        }
    }

    /// Consume a pending deadline without waiting for it.
    pub fn take_pending(&mut self) -> bool {
        self.deadline.take().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_only_at_deadline() {
        let start = Instant::now();
        let mut timer = Timer::new();
        timer.schedule(start, Duration::from_secs(5));
        assert!(!timer.is_due(start + Duration::from_millis(4999)));
        assert!(timer.take_due(start + Duration::from_secs(5)));
        assert!(!timer.is_pending());
        assert!(!timer.take_due(start + Duration::from_secs(10)));
    }

    #[test]
    fn test_reschedule_replaces_pending() {
        let start = Instant::now();
        let mut timer = Timer::new();
        timer.schedule(start, Duration::from_secs(5));
        timer.schedule(start + Duration::from_secs(3), Duration::from_secs(5));
        // The first deadline passes without firing.
        assert!(!timer.is_due(start + Duration::from_secs(5)));
        assert!(timer.is_due(start + Duration::from_secs(8)));
    }

    #[test]
    fn test_cancel_drops_deadline() {
        let start = Instant::now();
        let mut timer = Timer::new();
        timer.schedule(start, Duration::from_millis(100));
        timer.cancel();
        assert!(!timer.is_pending());
        assert!(!timer.take_due(start + Duration::from_secs(1)));
        assert_eq!(timer.remaining(start), None);
    }

    #[test]
    fn test_remaining_saturates() {
        let start = Instant::now();
        let mut timer = Timer::new();
        timer.schedule(start, Duration::from_millis(100));
        assert_eq!(
            timer.remaining(start + Duration::from_millis(40)),
            Some(Duration::from_millis(60))
        );
        assert_eq!(
            timer.remaining(start + Duration::from_secs(1)),
            Some(Duration::ZERO)
        );
    }
}
