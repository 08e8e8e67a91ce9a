//! Variable-rate drive timer.
//!
//! The worker fires one state-machine action per expiry. The period is
//! recomputed whenever the connection phase changes, and the next expiry is
//! always measured from the previous fire, so a slow action delays the next
//! tick instead of causing a burst.

use std::time::{Duration, Instant};

use super::{config::ViewerHandlerConfig, state::Phase};

/// Period to use for `phase`, or `None` to keep the current one.
pub fn interval_for(phase: Phase, config: &ViewerHandlerConfig) -> Option<Duration> {
    match phase {
        Phase::Closed | Phase::Opened | Phase::Connected => Some(config.reconnect_interval),
        Phase::Running => Some(config.worker_interval),
        Phase::Crashed => None,
    }
}

#[derive(Debug)]
pub struct DriveTimer {
    period: Duration,
    next_fire: Option<Instant>,
}

impl DriveTimer {
    /// Start a timer whose first expiry is one `period` after `now`.
    pub fn new(period: Duration, now: Instant) -> Self {
        Self {
            period,
            next_fire: Some(now + period),
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Next expiry, or `None` once cancelled.
    pub fn deadline(&self) -> Option<Instant> {
        self.next_fire
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.next_fire.is_some_and(|at| now >= at)
    }

    pub fn is_cancelled(&self) -> bool {
        self.next_fire.is_none()
    }

    /// Record a fire at `now` and arm the next expiry.
    pub fn fired(&mut self, now: Instant) {
        if self.next_fire.is_some() {
            self.next_fire = Some(now + self.period);
        }
    }

    /// Switch to `period`, measuring the next expiry from `now`.
    pub fn reschedule(&mut self, period: Duration, now: Instant) {
        self.period = period;
        if self.next_fire.is_some() {
            self.next_fire = Some(now + period);
        }
    }

    /// Stop firing. A cancelled timer never fires again.
    pub fn cancel(&mut self) {
        self.next_fire = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const PERIOD: Duration = Duration::from_millis(100);

    #[rstest]
    fn fires_once_period_elapses() {
        let start = Instant::now();
        let timer = DriveTimer::new(PERIOD, start);
        assert!(!timer.is_due(start + Duration::from_millis(99)));
        assert!(timer.is_due(start + PERIOD));
    }

    #[rstest]
    fn next_expiry_is_measured_from_the_fire() {
        let start = Instant::now();
        let mut timer = DriveTimer::new(PERIOD, start);
        let late = start + Duration::from_millis(350);
        timer.fired(late);
        assert_eq!(timer.deadline(), Some(late + PERIOD));
    }

    #[rstest]
    fn reschedule_changes_the_period() {
        let start = Instant::now();
        let mut timer = DriveTimer::new(PERIOD, start);
        let fast = Duration::from_millis(10);
        timer.reschedule(fast, start);
        assert_eq!(timer.period(), fast);
        assert_eq!(timer.deadline(), Some(start + fast));
    }

    #[rstest]
    fn cancelled_timer_stays_cancelled() {
        let start = Instant::now();
        let mut timer = DriveTimer::new(PERIOD, start);
        timer.cancel();
        timer.fired(start);
        timer.reschedule(PERIOD, start);
        assert!(timer.is_cancelled());
        assert!(!timer.is_due(start + Duration::from_secs(10)));
    }

    #[rstest]
    #[case(Phase::Closed, Some(Duration::from_millis(500)))]
    #[case(Phase::Opened, Some(Duration::from_millis(500)))]
    #[case(Phase::Connected, Some(Duration::from_millis(500)))]
    #[case(Phase::Running, Some(Duration::from_millis(20)))]
    #[case(Phase::Crashed, None)]
    fn interval_tracks_phase(#[case] phase: Phase, #[case] expected: Option<Duration>) {
        let config = ViewerHandlerConfig {
            reconnect_interval: Duration::from_millis(500),
            worker_interval: Duration::from_millis(20),
            ..ViewerHandlerConfig::default()
        };
        assert_eq!(interval_for(phase, &config), expected);
    }
}
