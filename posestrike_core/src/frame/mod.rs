use parking_lot::Mutex;
use std::sync::Arc;

/// A frame as seen by a reader: the image plus the generation it was
/// published under.
#[derive(Debug)]
pub struct Frame<F> {
    pub generation: u64,
    pub image: Arc<F>,
}

impl<F> Clone for Frame<F> {
    fn clone(&self) -> Self {
        Self {
            generation: self.generation,
            image: Arc::clone(&self.image),
        }
    }
}

/// Single-slot mailbox holding the most recent camera frame.
///
/// The capture side overwrites the slot; readers take whatever is there
/// without waiting. Generations start at 1 and grow by one per publish.
pub struct FrameSlot<F> {
    latest: Mutex<Option<Frame<F>>>,
}

impl<F> FrameSlot<F> {
    pub fn new() -> Self {
        Self {
            latest: Mutex::new(None),
        }
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Replaces the current frame. Safe to call from the capture thread.
    pub fn publish(&self, image: F) -> u64 {
        let mut slot = self.latest.lock();
        let generation = slot.as_ref().map_or(1, |f| f.generation + 1);
        *slot = Some(Frame {
            generation,
            image: Arc::new(image),
        });
        generation
    }

    /// Returns the newest frame, or None if nothing was published yet.
    /// Never blocks on the capture side.
    pub fn latest(&self) -> Option<Frame<F>> {
        self.latest.lock().clone()
    }

    pub fn generation(&self) -> u64 {
        self.latest.lock().as_ref().map_or(0, |f| f.generation)
    }
}

impl<F> Default for FrameSlot<F> {
    fn default() -> Self {
        Self::new()
    }
}
