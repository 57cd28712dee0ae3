use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

/// Identifies one periodic tick registered with a [`TickScheduler`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TickHandle(u64);

/// Source of periodic playback ticks.
///
/// Schedulers do not call back into the player; the host drains due ticks with
/// [`TickScheduler::take_due`], usually through [`crate::timeline::player::Player::pump`].
pub trait TickScheduler {
    /// Register a tick firing every `interval`, first due one interval from now.
    fn schedule_tick(&mut self, interval: Duration) -> TickHandle;

    /// Forget `handle`. Unknown handles are ignored.
    fn cancel(&mut self, handle: TickHandle);

    /// Ticks of `handle` that fell due since the last call. Zero for cancelled handles.
    fn take_due(&mut self, handle: TickHandle) -> u32;

    /// Time left until `handle` next falls due, or `None` when it is not scheduled.
    fn next_due_in(&self, handle: TickHandle) -> Option<Duration>;
}

#[derive(Clone, Copy, Debug)]
struct Timer {
    interval: Duration,
    next_due: Duration,
}

#[derive(Debug, Default)]
struct Timers {
    next_id: u64,
    timers: HashMap<u64, Timer>,
}

impl Timers {
    fn schedule(&mut self, now: Duration, interval: Duration) -> TickHandle {
        let interval = interval.max(Duration::from_millis(1));
        self.next_id += 1;
        self.timers.insert(
            self.next_id,
            Timer {
                interval,
                next_due: now + interval,
            },
        );
        TickHandle(self.next_id)
    }

    fn cancel(&mut self, handle: TickHandle) {
        self.timers.remove(&handle.0);
    }

    fn take_due(&mut self, handle: TickHandle, now: Duration, max: u32) -> u32 {
        let Some(timer) = self.timers.get_mut(&handle.0) else {
            return 0;
        };
        if now < timer.next_due {
            return 0;
        }
        let elapsed = now - timer.next_due;
        let due = 1 + elapsed.as_nanos() / timer.interval.as_nanos();
        let due = u32::try_from(due).unwrap_or(u32::MAX);
        timer.next_due += timer.interval * due;
        if due > max {
            tracing::debug!(due, max, "dropping late ticks");
        }
        due.min(max)
    }

    fn next_due_in(&self, handle: TickHandle, now: Duration) -> Option<Duration> {
        self.timers
            .get(&handle.0)
            .map(|t| t.next_due.saturating_sub(now))
    }
}

/// Scheduler on a manually advanced clock. Used headless and in tests.
#[derive(Debug, Default)]
pub struct VirtualScheduler {
    now: Duration,
    timers: Timers,
}

impl VirtualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the virtual clock forward.
    pub fn advance(&mut self, by: Duration) {
        self.now += by;
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    /// Registered ticks.
    pub fn scheduled(&self) -> usize {
        self.timers.timers.len()
    }
}

impl TickScheduler for VirtualScheduler {
    fn schedule_tick(&mut self, interval: Duration) -> TickHandle {
        self.timers.schedule(self.now, interval)
    }

    fn cancel(&mut self, handle: TickHandle) {
        self.timers.cancel(handle);
    }

    fn take_due(&mut self, handle: TickHandle) -> u32 {
        self.timers.take_due(handle, self.now, u32::MAX)
    }

    fn next_due_in(&self, handle: TickHandle) -> Option<Duration> {
        self.timers.next_due_in(handle, self.now)
    }
}

/// Scheduler on the monotonic wall clock.
///
/// A host that stalls does not replay every missed tick: at most [`WallScheduler::MAX_CATCH_UP`]
/// ticks are reported per drain and the rest are dropped.
#[derive(Debug)]
pub struct WallScheduler {
    origin: Instant,
    timers: Timers,
}

impl WallScheduler {
    pub const MAX_CATCH_UP: u32 = 4;

    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            timers: Timers::default(),
        }
    }

    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

impl Default for WallScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl TickScheduler for WallScheduler {
    fn schedule_tick(&mut self, interval: Duration) -> TickHandle {
        let now = self.now();
        self.timers.schedule(now, interval)
    }

    fn cancel(&mut self, handle: TickHandle) {
        self.timers.cancel(handle);
    }

    fn take_due(&mut self, handle: TickHandle) -> u32 {
        let now = self.now();
        self.timers.take_due(handle, now, Self::MAX_CATCH_UP)
    }

    fn next_due_in(&self, handle: TickHandle) -> Option<Duration> {
        self.timers.next_due_in(handle, self.now())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/clock.rs"]
mod tests;
