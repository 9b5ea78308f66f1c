//! One-shot win latch
//!
//! `Idle -> Pending { fire_at } -> Won`. Once pending, the win is announced at
//! the deadline even if a rope turns red in between; there is no path back.

use serde::{Deserialize, Serialize};

/// Win latch state, advanced once per tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WinLatch {
    #[default]
    Idle,
    /// All ropes were green; announce at tick `fire_at`
    Pending { fire_at: u64 },
    /// Announced. Terminal for this state instance.
    Won,
}

impl WinLatch {
    /// Feed the result of the all-green scan for tick `now`.
    ///
    /// Schedules the win when every rope is green and the grace period is
    /// over. Returns `true` if this call scheduled it.
    pub fn observe(&mut self, all_green: bool, now: u64, grace_ticks: u64, delay_ticks: u64) -> bool {
        if *self != WinLatch::Idle || !all_green || now < grace_ticks {
            return false;
        }
        *self = WinLatch::Pending {
            fire_at: now + delay_ticks,
        };
        true
    }

    /// Advance to tick `now`. Returns `true` exactly once, when the win fires.
    pub fn advance(&mut self, now: u64) -> bool {
        match *self {
            WinLatch::Pending { fire_at } if now >= fire_at => {
                *self = WinLatch::Won;
                true
            }
            _ => false,
        }
    }

    #[inline]
    pub fn is_won(&self) -> bool {
        *self == WinLatch::Won
    }

    #[inline]
    pub fn is_pending(&self) -> bool {
        matches!(self, WinLatch::Pending { .. })
    }
}
