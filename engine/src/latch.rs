//! Reentrancy latch
//!
//! Scoped mutual exclusion around every mutating entry point: acquired on
//! entry, released on every exit path (including error paths) by the RAII
//! guard. While one invocation is in flight, any nested acquisition is a
//! `ReentrantCall` rejection rather than a deadlock.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::EngineError;

#[derive(Debug, Default)]
pub struct ReentrancyLatch {
    held: AtomicBool,
}

impl ReentrancyLatch {
    pub fn new() -> Arc<Self> {
        Arc::new(Self { held: AtomicBool::new(false) })
    }
}

/// RAII guard for the latch. Dropping it releases the latch.
#[derive(Debug)]
pub struct LatchGuard {
    latch: Arc<ReentrancyLatch>,
}

impl LatchGuard {
    pub fn acquire(latch: &Arc<ReentrancyLatch>) -> Result<Self, EngineError> {
        if latch.held.swap(true, Ordering::Acquire) {
            return Err(EngineError::ReentrantCall);
        }
        Ok(Self { latch: Arc::clone(latch) })
    }
}

impl Drop for LatchGuard {
    fn drop(&mut self) {
        self.latch.held.store(false, Ordering::Release);
    }
}
