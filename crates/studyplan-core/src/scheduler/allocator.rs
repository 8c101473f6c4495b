//! Fair round-robin allocation across window queues.
//!
//! Each step takes the front segment of the next non-empty queue, carves a
//! session of `min(slot, remaining, capacity)` minutes from its start and
//! puts the leftover back at the front of the same queue. The cursor always
//! advances, so windows take turns and no single window is drained first.

use std::fmt;

use chrono::Duration;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::resolver::WindowQueue;
use crate::timeline::Interval;

/// Why allocation for a goal stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    RequirementMet,
    /// Remaining requirement is positive but shorter than a minimum session.
    BelowMinimum,
    CapacityExhausted,
    NoWindows,
    SafetyBound,
}

impl StopReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            StopReason::RequirementMet => "requirement_met",
            StopReason::BelowMinimum => "below_minimum",
            StopReason::CapacityExhausted => "capacity_exhausted",
            StopReason::NoWindows => "no_windows",
            StopReason::SafetyBound => "safety_bound",
        }
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of allocating one goal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation {
    /// New session intervals, in allocation order.
    pub intervals: Vec<Interval>,
    pub allocated_minutes: i64,
    pub steps: usize,
    pub stop: StopReason,
}

#[derive(Debug, Clone, Copy)]
pub struct FairAllocator {
    min_minutes: i64,
}

impl FairAllocator {
    /// `min_minutes` is clamped to at least one minute.
    pub fn new(min_minutes: u32) -> Self {
        Self {
            min_minutes: i64::from(min_minutes.max(1)),
        }
    }

    /// Upper bound on steps for the given queues.
    ///
    /// Every step either removes a queue entry or shrinks one by at least
    /// `min_minutes`, so this many steps always suffice.
    pub fn step_budget(&self, queues: &[WindowQueue]) -> usize {
        queues
            .iter()
            .flat_map(|q| q.candidates.iter())
            .map(|c| (c.duration().num_minutes() / self.min_minutes) as usize + 1)
            .sum()
    }

    /// Allocate up to `requirement_minutes` from `queues` in chunks of at most
    /// `slot_minutes`. Queues are consumed in place.
    pub fn allocate(
        &self,
        requirement_minutes: i64,
        slot_minutes: u32,
        queues: &mut [WindowQueue],
    ) -> Allocation {
        let slot = i64::from(slot_minutes);
        let budget = self.step_budget(queues);
        let mut intervals = Vec::new();
        let mut remaining = requirement_minutes;
        let mut cursor = 0usize;
        let mut steps = 0usize;

        let stop = loop {
            if remaining <= 0 {
                break StopReason::RequirementMet;
            }
            if remaining < self.min_minutes {
                break StopReason::BelowMinimum;
            }
            let Some(index) = next_non_empty(queues, cursor) else {
                break StopReason::CapacityExhausted;
            };
            if steps >= budget {
                warn!(steps, remaining, "allocator hit its step bound");
                break StopReason::SafetyBound;
            }
            steps += 1;

            let queue = &mut queues[index];
            if let Some(segment) = queue.candidates.pop_front() {
                let capacity = segment.duration().num_minutes();
                let minutes = slot.min(remaining).min(capacity);
                if minutes >= self.min_minutes {
                    let end = segment.start + Duration::minutes(minutes);
                    intervals.push(Interval::new(segment.start, end));
                    remaining -= minutes;
                    if let Some(rest) = Interval::checked(end, segment.end) {
                        queue.candidates.push_front(rest);
                    }
                }
            }

            cursor = (index + 1) % queues.len();
        };

        Allocation {
            allocated_minutes: requirement_minutes.max(0) - remaining.max(0),
            intervals,
            steps,
            stop,
        }
    }
}

fn next_non_empty(queues: &[WindowQueue], cursor: usize) -> Option<usize> {
    let n = queues.len();
    (0..n)
        .map(|offset| (cursor + offset) % n)
        .find(|&i| !queues[i].is_empty())
}
