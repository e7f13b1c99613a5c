use std::time::Duration;
use std::time::Instant;

/// Decides when the next generation is due.
///
/// The pacer fires at most once per [`Pacer::tick`]. When a tick arrives late, only the
/// fraction of an interval past the deadline is carried into the next one, so a steady stream of
/// ticks averages out to the target rate.
#[derive(Clone, Debug)]
pub struct Pacer {
    interval: Duration,

    /// Deadline anchor. `None` means the next tick fires immediately.
    last: Option<Instant>,
}

impl Pacer {
    /// A pacer firing `fps` times per second. `fps` must be non-zero.
    pub fn new(fps: u32) -> Self {
        Self {
            interval: Self::interval_for(fps),
            last: None,
        }
    }

    #[cfg(test)]
    fn interval(&self) -> Duration {
        self.interval
    }

    /// Change the target rate. The current anchor is kept.
    pub fn set_fps(&mut self, fps: u32) {
        self.interval = Self::interval_for(fps);
    }

    /// Forget the last tick, so the next one fires straight away
    pub fn restart(&mut self) {
        self.last = None;
    }

    /// Returns whether a generation should run at `now`.
    pub fn tick(&mut self, now: Instant) -> bool {
        let Some(last) = self.last else {
            self.last = Some(now);
            return true;
        };

        let delta = now.saturating_duration_since(last);
        if delta < self.interval {
            return false;
        }

        let carry = Duration::from_nanos((delta.as_nanos() % self.interval.as_nanos()) as u64);
        self.last = Some(now - carry);

        true
    }

    /// Time until the next tick would fire, measured from `now`
    pub fn time_left(&self, now: Instant) -> Duration {
        match self.last {
            None => Duration::ZERO,
            Some(last) => self
                .interval
                .saturating_sub(now.saturating_duration_since(last)),
        }
    }

    fn interval_for(fps: u32) -> Duration {
        Duration::from_secs(1) / fps.max(1)
    }
}
