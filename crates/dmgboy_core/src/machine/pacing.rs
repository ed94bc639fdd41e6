use std::thread;
use std::time::{Duration, Instant};

/// Sleeps so that consecutive frames are `1 / frame_rate` seconds apart.
pub(super) struct FramePacer {
    frame: Duration,
    deadline: Instant,
}

impl FramePacer {
    pub(super) fn new(frame_rate: f64) -> Self {
        let frame = Duration::from_secs_f64(1.0 / frame_rate);
        Self {
            frame,
            deadline: Instant::now() + frame,
        }
    }

    /// Block until the current frame's deadline, then arm the next one.
    ///
    /// A frame that ran late does not try to catch up: the schedule is
    /// restarted from now.
    pub(super) fn wait(&mut self) {
        let now = Instant::now();
        if now < self.deadline {
            thread::sleep(self.deadline - now);
            self.deadline += self.frame;
        } else {
            log::trace!("frame overran by {:?}", now - self.deadline);
            self.deadline = now + self.frame;
        }
    }
}
