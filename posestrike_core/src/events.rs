use crossbeam_channel::{unbounded, Receiver, Sender};

/// Notifications for the UI layer. Sent from the match loop thread; the UI
/// drains them on its own thread.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    ScoreChanged { score: u32 },
    ComboChanged { multiplier: u32 },
    MatchStatusChanged { is_match: bool },
    ReferenceChanged { index: usize, image: String },
    RoundOver,
}

pub struct EventQueue {
    sender: Sender<GameEvent>,
    receiver: Receiver<GameEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self { sender, receiver }
    }

    /// Pops an event from the queue.
    /// Non-blocking. Returns None if queue is empty.
    pub fn pop(&self) -> Option<GameEvent> {
        self.receiver.try_recv().ok()
    }

    /// Drains everything currently queued.
    pub fn drain(&self) -> Vec<GameEvent> {
        self.receiver.try_iter().collect()
    }

    /// Returns a clone of the sender, to be moved into the match loop.
    pub fn sender(&self) -> Sender<GameEvent> {
        self.sender.clone()
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}
