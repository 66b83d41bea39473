/// Repeating timer polled from the event loop
#[derive(Debug, Clone)]
pub struct IntervalTimer {
    interval: u64,
    next_due: Option<u64>,
}

impl IntervalTimer {
    pub fn start(interval: u64, now: u64) -> Self {
        Self {
            interval: interval.max(1),
            next_due: Some(now + interval.max(1)),
        }
    }

    /// Fire at most once if the deadline has passed; the next deadline is
    /// counted from `now`, so missed intervals do not pile up.
    pub fn poll(&mut self, now: u64) -> bool {
        match self.next_due {
            Some(due) if now >= due => {
                self.next_due = Some(now + self.interval);
                true
            }
            _ => false,
        }
    }

    pub fn stop(&mut self) {
        self.next_due = None;
    }

    pub fn is_running(&self) -> bool {
        self.next_due.is_some()
    }

    pub fn interval(&self) -> u64 {
        self.interval
    }
}

/// Fires once, `delay` after the most recent `touch`
#[derive(Debug, Clone)]
pub struct Debounce {
    delay: u64,
    deadline: Option<u64>,
}

impl Debounce {
    pub fn new(delay: u64) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    pub fn touch(&mut self, now: u64) {
        self.deadline = Some(now + self.delay);
    }

    pub fn poll(&mut self, now: u64) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Consume a pending deadline regardless of time
    pub fn take_pending(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }
}
