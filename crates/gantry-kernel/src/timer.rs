//! One-shot and repeating timers, advanced by the main loop.
//!
//! There is no dedicated timer thread: [`TimerWheel::advance`] is called once
//! per host iteration with the current monotonic time, collects everything
//! due, and the kernel delivers the callbacks afterwards with the lock
//! released.

use std::time::{Duration, Instant};

use gantry_abi::EventCallback;

use crate::PluginId;

struct TimerEntry {
    id: u64,
    period: Duration,
    callback: EventCallback,
    repeat: bool,
    next_fire: Instant,
    active: bool,
    owner: Option<PluginId>,
}

/// Timer table.  Ids are strictly increasing from 1 and never reused within
/// a process lifetime.
pub(crate) struct TimerWheel {
    timers: Vec<TimerEntry>,
    next_id: u64,
}

impl Default for TimerWheel {
    fn default() -> Self {
        Self {
            timers: Vec::new(),
            next_id: 1,
        }
    }
}

impl TimerWheel {
    /// Schedules a timer whose first fire is `now + period_ms`.
    pub fn schedule(
        &mut self,
        now: Instant,
        period_ms: u32,
        callback: EventCallback,
        repeat: bool,
        owner: Option<PluginId>,
    ) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        let period = Duration::from_millis(u64::from(period_ms));
        self.timers.push(TimerEntry {
            id,
            period,
            callback,
            repeat,
            next_fire: now + period,
            active: true,
            owner,
        });
        id
    }

    /// Marks the timer inactive; returns whether a matching active timer
    /// existed.  An already-in-flight firing cannot be aborted.
    pub fn cancel(&mut self, id: u64) -> bool {
        match self.timers.iter_mut().find(|t| t.id == id && t.active) {
            Some(timer) => {
                timer.active = false;
                true
            }
            None => false,
        }
    }

    /// Deactivates every timer owned by `owner` (plugin unload scrub).
    pub fn cancel_owner(&mut self, owner: PluginId) {
        for timer in &mut self.timers {
            if timer.owner == Some(owner) {
                timer.active = false;
            }
        }
        self.compact();
    }

    /// Collects every active timer due at `now`, in insertion order.
    ///
    /// Repeating timers are rearmed at `now + period`; one-shots are marked
    /// inactive.  After the pass the table is compacted by dropping inactive
    /// entries.  Delivery is the caller's job.
    pub fn advance(&mut self, now: Instant) -> Vec<(EventCallback, Option<PluginId>)> {
        let mut due = Vec::new();
        for timer in &mut self.timers {
            if !timer.active || timer.next_fire > now {
                continue;
            }
            due.push((timer.callback, timer.owner));
            if timer.repeat {
                timer.next_fire = now + timer.period;
            } else {
                timer.active = false;
            }
        }
        self.compact();
        due
    }

    /// Number of active timers.
    pub fn active_count(&self) -> usize {
        self.timers.iter().filter(|t| t.active).count()
    }

    fn compact(&mut self) {
        self.timers.retain(|t| t.active);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    extern "C" fn cb_one(_: *const std::ffi::c_char, _: *const std::ffi::c_char) {}
    extern "C" fn cb_two(_: *const std::ffi::c_char, _: *const std::ffi::c_char) {}

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn ids_are_strictly_increasing_from_one() {
        let mut wheel = TimerWheel::default();
        let now = Instant::now();
        let a = wheel.schedule(now, 10, cb_one, false, None);
        let b = wheel.schedule(now, 10, cb_one, true, None);
        wheel.cancel(a);
        let c = wheel.schedule(now, 10, cb_one, false, None);
        assert_eq!((a, b, c), (1, 2, 3));
    }

    #[test]
    fn one_shot_fires_exactly_once_at_its_deadline() {
        let mut wheel = TimerWheel::default();
        let t = Instant::now();
        wheel.schedule(t, 100, cb_one, false, None);

        assert!(wheel.advance(t).is_empty());
        assert!(wheel.advance(t + ms(99)).is_empty());
        assert_eq!(wheel.advance(t + ms(100)).len(), 1);
        // Consumed: compaction removed it.
        assert!(wheel.advance(t + ms(200)).is_empty());
        assert_eq!(wheel.active_count(), 0);
    }

    #[test]
    fn repeating_timer_rearms_relative_to_the_tick() {
        let mut wheel = TimerWheel::default();
        let t = Instant::now();
        wheel.schedule(t, 100, cb_one, true, None);

        assert_eq!(wheel.advance(t + ms(120)).len(), 1);
        // Rearmed at tick + period, not deadline + period.
        assert!(wheel.advance(t + ms(210)).is_empty());
        assert_eq!(wheel.advance(t + ms(220)).len(), 1);
        assert_eq!(wheel.active_count(), 1);
    }

    #[test]
    fn simultaneous_timers_fire_in_insertion_order() {
        let mut wheel = TimerWheel::default();
        let t = Instant::now();
        wheel.schedule(t, 50, cb_one, false, None);
        wheel.schedule(t, 50, cb_two, false, None);

        let due = wheel.advance(t + ms(50));
        assert_eq!(due.len(), 2);
        assert_eq!(due[0].0 as usize, cb_one as usize);
        assert_eq!(due[1].0 as usize, cb_two as usize);
    }

    #[test]
    fn cancel_takes_effect_before_the_next_tick() {
        let mut wheel = TimerWheel::default();
        let t = Instant::now();
        let id = wheel.schedule(t, 50, cb_one, true, None);

        assert_eq!(wheel.advance(t + ms(60)).len(), 1);
        assert!(wheel.cancel(id));
        assert!(wheel.advance(t + ms(500)).is_empty());
        // The id is gone for good.
        assert!(!wheel.cancel(id));
    }

    #[test]
    fn cancel_owner_drops_only_that_owners_timers() {
        let mut wheel = TimerWheel::default();
        let t = Instant::now();
        wheel.schedule(t, 50, cb_one, true, Some(1));
        wheel.schedule(t, 50, cb_two, true, Some(2));

        wheel.cancel_owner(1);
        assert_eq!(wheel.active_count(), 1);
        let due = wheel.advance(t + ms(50));
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].1, Some(2));
    }
}
