use atomic_float::AtomicF64;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Instant;

/// Monotonic time source in seconds.
pub trait Clock: Send + Sync {
    fn now(&self) -> f64;
}

pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// Clock driven by hand. Clones share the same time, so a test can hold one
/// copy while the match loop reads another.
#[derive(Clone, Default)]
pub struct ManualClock {
    time: Arc<AtomicF64>,
}

impl ManualClock {
    pub fn new(start: f64) -> Self {
        Self {
            time: Arc::new(AtomicF64::new(start)),
        }
    }

    pub fn set(&self, time: f64) {
        self.time.store(time, Ordering::Release);
    }

    pub fn advance(&self, delta: f64) {
        self.time.fetch_add(delta, Ordering::AcqRel);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        self.time.load(Ordering::Acquire)
    }
}
