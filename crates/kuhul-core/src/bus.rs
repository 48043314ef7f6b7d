//! Synchronous event bus
//!
//! Every event is persisted first and only then handed to observers, in
//! registration order. A misbehaving observer can never hide a written record.

use crate::{Event, Result};
use tracing::debug;

/// Durable append-only destination for events
///
/// The file-backed implementation lives in `kuhul-journal`; [`MemoryLog`]
/// covers tests and embedding.
pub trait EventLog {
    /// Append one event. Must be durable (per the log's policy) on return.
    fn append(&mut self, event: &Event) -> Result<()>;
}

impl<L: EventLog + ?Sized> EventLog for &mut L {
    fn append(&mut self, event: &Event) -> Result<()> {
        (**self).append(event)
    }
}

impl<L: EventLog + ?Sized> EventLog for Box<L> {
    fn append(&mut self, event: &Event) -> Result<()> {
        (**self).append(event)
    }
}

/// In-memory event log
#[derive(Debug, Clone, Default)]
pub struct MemoryLog {
    events: Vec<Event>,
}

impl MemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded events in append order
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn into_events(self) -> Vec<Event> {
        self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl EventLog for MemoryLog {
    fn append(&mut self, event: &Event) -> Result<()> {
        self.events.push(event.clone());
        Ok(())
    }
}

/// Observer callback invoked for every event on the bus
pub type Observer = Box<dyn FnMut(&Event)>;

/// Persist-then-notify publisher
pub struct EventBus<L> {
    log: L,
    observers: Vec<Observer>,
}

impl<L: EventLog> EventBus<L> {
    /// Create a bus writing to `log`
    pub fn new(log: L) -> Self {
        Self {
            log,
            observers: Vec::new(),
        }
    }

    /// Register an observer. Observers run in registration order.
    pub fn subscribe(&mut self, observer: impl FnMut(&Event) + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Publish an event, persisting it first when `persist` is set
    ///
    /// No buffering, batching or reordering.
    pub fn append(&mut self, event: &Event, persist: bool) -> Result<()> {
        if persist {
            self.log.append(event)?;
        }
        debug!(topic = %event.topic, id = %event.id, persist, "event published");
        for observer in &mut self.observers {
            observer(event);
        }
        Ok(())
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    pub fn log(&self) -> &L {
        &self.log
    }

    pub fn log_mut(&mut self) -> &mut L {
        &mut self.log
    }

    pub fn into_log(self) -> L {
        self.log
    }
}
