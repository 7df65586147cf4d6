//! Deferred one-shot actions
//!
//! Some reactions happen after a real-time delay rather than a number of
//! frames (bullet reload, stun release, shovel expiry). They are queued
//! against a millisecond clock that advances with real elapsed time and are
//! drained once per frame, before the update sweep.

use serde::{Deserialize, Serialize};

use super::entity::Handle;

/// Work to perform once a deadline passes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeferredAction {
    /// Give a bullet back to the tank that fired it, if it is on the same life
    ReleaseBullet { owner: Handle },
    /// Lift a friendly-fire stun, only if the tank is still on the same life
    Unfreeze { tank: Handle },
    /// Turn the temporary steel fortress back into brick
    RevertFortress,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Pending {
    due_ms: f64,
    seq: u64,
    action: DeferredAction,
}

/// Deadline-ordered queue of deferred actions
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeferredQueue {
    clock_ms: f64,
    next_seq: u64,
    pending: Vec<Pending>,
}

impl DeferredQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current wall-clock reading in milliseconds
    pub fn now(&self) -> f64 {
        self.clock_ms
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Schedule `action` to run `delay_ms` from now
    pub fn schedule(&mut self, delay_ms: f32, action: DeferredAction) {
        let due_ms = self.clock_ms + f64::from(delay_ms.max(0.0));
        self.pending.push(Pending {
            due_ms,
            seq: self.next_seq,
            action,
        });
        self.next_seq += 1;
    }

    /// Advance the clock
    pub fn advance(&mut self, elapsed_ms: f32) {
        self.clock_ms += f64::from(elapsed_ms.max(0.0));
    }

    /// Remove and return every action whose deadline has passed, earliest
    /// first (ties keep scheduling order)
    pub fn take_due(&mut self) -> Vec<DeferredAction> {
        let now = self.clock_ms;
        let mut due: Vec<Pending> = Vec::new();
        self.pending.retain(|p| {
            if p.due_ms <= now {
                due.push(p.clone());
                false
            } else {
                true
            }
        });
        due.sort_by(|a, b| a.due_ms.total_cmp(&b.due_ms).then(a.seq.cmp(&b.seq)));
        due.into_iter().map(|p| p.action).collect()
    }

    pub fn contains(&self, action: &DeferredAction) -> bool {
        self.pending.iter().any(|p| &p.action == action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner(id: u32) -> Handle {
        Handle { id, life: 0 }
    }

    #[test]
    fn test_nothing_due_before_deadline() {
        let mut q = DeferredQueue::new();
        q.schedule(150.0, DeferredAction::ReleaseBullet { owner: owner(1) });
        q.advance(149.0);
        assert!(q.take_due().is_empty());
        assert_eq!(q.len(), 1);
        q.advance(1.0);
        assert_eq!(q.take_due(), vec![DeferredAction::ReleaseBullet { owner: owner(1) }]);
        assert!(q.is_empty());
    }

    #[test]
    fn test_due_actions_ordered_by_deadline_then_schedule() {
        let mut q = DeferredQueue::new();
        q.schedule(300.0, DeferredAction::RevertFortress);
        q.schedule(100.0, DeferredAction::ReleaseBullet { owner: owner(2) });
        q.schedule(100.0, DeferredAction::ReleaseBullet { owner: owner(3) });
        q.advance(1000.0);
        assert_eq!(
            q.take_due(),
            vec![
                DeferredAction::ReleaseBullet { owner: owner(2) },
                DeferredAction::ReleaseBullet { owner: owner(3) },
                DeferredAction::RevertFortress,
            ]
        );
    }
}
