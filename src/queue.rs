use crate::events::Event;
use crossbeam::channel::{Receiver, Sender, TryRecvError};

pub struct EventQueue {
    tx: Sender<Event>,
    rx: Receiver<Event>,
}

#[derive(Clone)]
pub struct EventSender {
    tx: Sender<Event>,
}

impl EventQueue {
    pub fn new() -> Self {
        let (tx, rx) = crossbeam::channel::unbounded();
        Self { tx, rx }
    }

    pub fn sender(&self) -> EventSender {
        EventSender {
            tx: self.tx.clone(),
        }
    }

    pub fn push(&self, event: Event) {
        // The queue holds its own receiver, so the send cannot fail.
        let _ = self.tx.send(event);
    }

    pub fn pop(&self) -> Option<Event> {
        match self.rx.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSender {
    /// Never blocks. Returns false once the queue has been dropped.
    pub fn push(&self, event: Event) -> bool {
        self.tx.send(event).is_ok()
    }
}
