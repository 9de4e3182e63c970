/// A single-slot debounce timer driven by an external clock.
///
/// Every [`arm`](Debounce::arm) replaces the pending deadline, so at most one
/// reset is ever outstanding. [`poll`](Debounce::poll) fires it once the quiet
/// period has elapsed and reports the instant it was due.
#[derive(Clone, Copy, Debug)]
pub struct Debounce {
    delay: f64,
    deadline: Option<f64>,
}

impl Debounce {
    pub fn new(delay_secs: f64) -> Self {
        Self {
            delay: delay_secs,
            deadline: None,
        }
    }

    /// Schedule the action `delay` after `now`, cancelling any earlier one.
    pub fn arm(&mut self, now: f64) {
        self.deadline = Some(now + self.delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<f64> {
        self.deadline
    }

    /// Returns the deadline if it has passed, disarming the timer.
    pub fn poll(&mut self, now: f64) -> Option<f64> {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                Some(deadline)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_after_quiet_period() {
        let mut debounce = Debounce::new(0.1);
        debounce.arm(1.0);
        assert_eq!(debounce.poll(1.05), None);
        let fired = debounce.poll(1.2).expect("deadline passed");
        assert!((fired - 1.1).abs() < 1e-6);
        assert_eq!(debounce.poll(5.0), None);
    }

    #[test]
    fn rearming_pushes_the_deadline_back() {
        let mut debounce = Debounce::new(0.1);
        debounce.arm(1.0);
        debounce.arm(1.08);
        assert_eq!(debounce.poll(1.15), None);
        assert!(debounce.poll(1.19).is_some());
    }

    #[test]
    fn cancel_drops_pending_action() {
        let mut debounce = Debounce::new(0.1);
        debounce.arm(0.0);
        debounce.cancel();
        assert!(!debounce.is_pending());
        assert_eq!(debounce.poll(10.0), None);
    }
}
