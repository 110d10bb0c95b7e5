//! Named one-shot countdown timers.
//!
//! Timers live in a slot arena with a free list so arming and expiring them
//! does not allocate once the arena has grown to the working-set size.
//!
//! Usage:
//!   let mut cd = CooldownComponent::new();
//!   cd.timeout("jump_buffer", 0.15, |_| {});
//!   cd.update(dt);
//!   if cd.has("jump_buffer") { ... }

use std::collections::HashMap;
use std::fmt;

/// Completion callback. Receives the owning component so it can re-arm timers.
pub type CooldownCallback = Box<dyn FnOnce(&mut CooldownComponent)>;

struct CooldownTimer {
    /// Duration in seconds.
    duration: f32,
    /// Elapsed time in seconds.
    elapsed: f32,
    /// Arm order; bumped on every (re-)arm.
    seq: u64,
    callback: Option<CooldownCallback>,
}

impl CooldownTimer {
    fn empty() -> Self {
        Self {
            duration: 0.0,
            elapsed: 0.0,
            seq: 0,
            callback: None,
        }
    }

    fn finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// 1.0 at arm time, 0.0 at expiry.
    fn ratio(&self) -> f32 {
        if self.duration <= 0.0 {
            0.0
        } else {
            (1.0 - self.elapsed / self.duration).clamp(0.0, 1.0)
        }
    }
}

/// A set of named cooldown timers. A name maps to at most one active timer.
#[derive(Default)]
pub struct CooldownComponent {
    timers: Vec<CooldownTimer>,
    free: Vec<usize>,
    active: HashMap<String, usize>,
    next_seq: u64,
    /// Scratch list reused by `update`.
    expired: Vec<(u64, String)>,
    /// Names that expired during the most recent `update`.
    finished: Vec<String>,
}

impl CooldownComponent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm (or re-arm) `name` for `duration` seconds, firing `callback` on expiry.
    ///
    /// Re-arming an active name resets its elapsed time and replaces its callback.
    pub fn timeout(
        &mut self,
        name: &str,
        duration: f32,
        callback: impl FnOnce(&mut CooldownComponent) + 'static,
    ) {
        self.interval(name, duration, Some(Box::new(callback)));
    }

    /// Arm (or re-arm) `name` without a callback.
    pub fn arm(&mut self, name: &str, duration: f32) {
        self.interval(name, duration, None);
    }

    fn interval(&mut self, name: &str, duration: f32, callback: Option<CooldownCallback>) {
        let seq = self.next_seq;
        self.next_seq += 1;

        let slot = match self.active.get(name) {
            Some(&slot) => slot,
            None => {
                let slot = self.alloc();
                self.active.insert(name.to_owned(), slot);
                slot
            }
        };

        let timer = &mut self.timers[slot];
        timer.duration = duration;
        timer.elapsed = 0.0;
        timer.seq = seq;
        timer.callback = callback;
    }

    fn alloc(&mut self) -> usize {
        match self.free.pop() {
            Some(slot) => slot,
            None => {
                self.timers.push(CooldownTimer::empty());
                self.timers.len() - 1
            }
        }
    }

    fn release(&mut self, slot: usize) {
        let timer = &mut self.timers[slot];
        timer.duration = 0.0;
        timer.elapsed = 0.0;
        timer.callback = None;
        self.free.push(slot);
    }

    /// Whether `name` is armed and has not expired yet.
    pub fn has(&self, name: &str) -> bool {
        self.active.contains_key(name)
    }

    /// Cancel `name` without firing its callback. No-op for unknown names.
    pub fn remove(&mut self, name: &str) {
        if let Some(slot) = self.active.remove(name) {
            self.release(slot);
        }
    }

    /// Remaining fraction of `name`: 1.0 when armed, decaying to 0.0. 0.0 if unknown.
    pub fn ratio(&self, name: &str) -> f32 {
        self.active
            .get(name)
            .map(|&slot| self.timers[slot].ratio())
            .unwrap_or(0.0)
    }

    /// Advance every active timer by `dt` seconds.
    ///
    /// Expired timers are removed before their callback runs, in arm order, so a
    /// callback may re-arm any name (its own included). A timer re-armed or removed
    /// by an earlier callback in the same pass does not fire.
    pub fn update(&mut self, dt: f32) {
        self.finished.clear();

        let mut expired = std::mem::take(&mut self.expired);
        expired.clear();
        for (name, &slot) in &self.active {
            let timer = &mut self.timers[slot];
            timer.elapsed += dt;
            if timer.finished() {
                expired.push((timer.seq, name.clone()));
            }
        }
        expired.sort_unstable_by_key(|(seq, _)| *seq);

        for (seq, name) in expired.drain(..) {
            let slot = match self.active.get(&name) {
                Some(&slot) => slot,
                None => continue,
            };
            let timer = &mut self.timers[slot];
            if timer.seq != seq || !timer.finished() {
                continue;
            }
            let callback = timer.callback.take();
            self.active.remove(&name);
            self.release(slot);
            self.finished.push(name);
            if let Some(callback) = callback {
                callback(self);
            }
        }

        self.expired = expired;
    }

    /// Names of timers that expired during the most recent `update`.
    pub fn drain_finished(&mut self) -> impl Iterator<Item = String> + '_ {
        self.finished.drain(..)
    }

    /// Number of active timers.
    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Cancel every timer without firing callbacks.
    pub fn clear(&mut self) {
        let slots: Vec<usize> = self.active.drain().map(|(_, slot)| slot).collect();
        for slot in slots {
            self.release(slot);
        }
        self.finished.clear();
    }
}

impl fmt::Debug for CooldownComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.active.keys().collect();
        names.sort();
        f.debug_struct("CooldownComponent")
            .field("active", &names)
            .field("pooled", &self.free.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    fn counter() -> (Rc<Cell<u32>>, impl FnOnce(&mut CooldownComponent) + 'static) {
        let hits = Rc::new(Cell::new(0));
        let inner = Rc::clone(&hits);
        (hits, move |_: &mut CooldownComponent| inner.set(inner.get() + 1))
    }

    #[test]
    fn fires_once_when_cumulative_time_reaches_duration() {
        let mut cd = CooldownComponent::new();
        let (hits, cb) = counter();
        cd.timeout("x", 0.1, cb);

        cd.update(0.06);
        assert_eq!(hits.get(), 0);
        assert!(cd.has("x"));

        cd.update(0.06);
        assert_eq!(hits.get(), 1);
        assert!(!cd.has("x"));

        cd.update(0.06);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn ratio_decays_from_one_to_zero() {
        let mut cd = CooldownComponent::new();
        cd.arm("shake", 0.1);
        assert!((cd.ratio("shake") - 1.0).abs() < 1e-6);

        cd.update(0.05);
        assert!((cd.ratio("shake") - 0.5).abs() < 1e-4);

        cd.update(0.05);
        assert_eq!(cd.ratio("shake"), 0.0);
    }

    #[test]
    fn unknown_names_are_safe() {
        let mut cd = CooldownComponent::new();
        assert!(!cd.has("nope"));
        assert_eq!(cd.ratio("nope"), 0.0);
        cd.remove("nope");
        assert!(cd.is_empty());
    }

    #[test]
    fn rearm_resets_instead_of_duplicating() {
        let mut cd = CooldownComponent::new();
        let (first, cb1) = counter();
        let (second, cb2) = counter();
        cd.timeout("x", 0.1, cb1);
        cd.update(0.08);
        cd.timeout("x", 0.1, cb2);
        assert_eq!(cd.len(), 1);

        cd.update(0.08);
        assert!(cd.has("x"), "re-arm must reset elapsed time");

        cd.update(0.08);
        assert_eq!(first.get(), 0, "replaced callback must not fire");
        assert_eq!(second.get(), 1);
    }

    #[test]
    fn remove_cancels_without_firing() {
        let mut cd = CooldownComponent::new();
        let (hits, cb) = counter();
        cd.timeout("x", 0.1, cb);
        cd.remove("x");
        cd.update(1.0);
        assert_eq!(hits.get(), 0);
        assert!(!cd.has("x"));
    }

    #[test]
    fn callback_may_rearm_its_own_name() {
        let mut cd = CooldownComponent::new();
        let fired = Rc::new(Cell::new(0));
        let inner = Rc::clone(&fired);
        cd.timeout("tick", 0.1, move |cd| {
            inner.set(inner.get() + 1);
            cd.arm("tick", 0.1);
        });

        cd.update(0.1);
        assert_eq!(fired.get(), 1);
        assert!(cd.has("tick"));
        assert!((cd.ratio("tick") - 1.0).abs() < 1e-6);
    }

    #[test]
    fn every_expired_timer_fires_even_when_callbacks_arm_new_ones() {
        let mut cd = CooldownComponent::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        for (name, duration) in [("a", 0.01), ("b", 0.02), ("c", 0.03)] {
            let log = Rc::clone(&order);
            cd.timeout(name, duration, move |cd| {
                log.borrow_mut().push(name);
                cd.arm("spawned", 1.0);
            });
        }

        cd.update(0.05);
        assert_eq!(*order.borrow(), vec!["a", "b", "c"]);
        assert_eq!(cd.len(), 1);
        assert!(cd.has("spawned"));
    }

    #[test]
    fn finished_names_are_reported_for_one_update() {
        let mut cd = CooldownComponent::new();
        cd.arm("footstep", 0.05);
        cd.arm("dust", 1.0);
        cd.update(0.1);
        let done: Vec<String> = cd.drain_finished().collect();
        assert_eq!(done, vec!["footstep".to_string()]);

        cd.update(0.1);
        assert_eq!(cd.drain_finished().count(), 0);
    }

    #[test]
    fn slots_are_reused_after_expiry() {
        let mut cd = CooldownComponent::new();
        cd.arm("a", 0.01);
        cd.update(0.02);
        cd.arm("b", 0.01);
        assert_eq!(cd.timers.len(), 1);
        assert!(cd.free.is_empty());
    }
}
