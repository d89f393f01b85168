use crate::transport::TransportState;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventChannel {
    Transport,
    AudioBuffer,
    Clipboard,
}

#[derive(Clone, Debug, PartialEq)]
pub enum EditorEvent {
    /// A transport state was entered.
    TransportChanged(TransportState),
    /// Buffer content or length changed.
    AudioBufferChanged { num_channels: usize, num_samples: usize },
    /// Clipboard content changed; `num_samples == 0` means it was cleared.
    ClipboardChanged { num_samples: usize },
}

impl EditorEvent {
    pub fn channel(&self) -> EventChannel {
        match self {
            EditorEvent::TransportChanged(_) => EventChannel::Transport,
            EditorEvent::AudioBufferChanged { .. } => EventChannel::AudioBuffer,
            EditorEvent::ClipboardChanged { .. } => EventChannel::Clipboard,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Callback = Box<dyn FnMut(&EditorEvent) + Send>;

#[derive(Default)]
pub struct Listeners {
    next_id: u64,
    entries: Vec<(ListenerId, EventChannel, Callback)>,
}

impl Listeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&mut self, channel: EventChannel, callback: F) -> ListenerId
    where
        F: FnMut(&EditorEvent) + Send + 'static,
    {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, channel, Box::new(callback)));
        id
    }

    /// Returns false if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(eid, _, _)| *eid != id);
        self.entries.len() != before
    }

    pub fn emit(&mut self, event: &EditorEvent) {
        let channel = event.channel();
        for (_, ch, cb) in self.entries.iter_mut() {
            if *ch == channel {
                cb(event);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for Listeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.entries.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn only_matching_channel_is_called() {
        let mut listeners = Listeners::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        listeners.subscribe(EventChannel::Clipboard, move |e| {
            sink.lock().expect("lock").push(e.clone());
        });
        listeners.emit(&EditorEvent::TransportChanged(TransportState::Playing));
        listeners.emit(&EditorEvent::ClipboardChanged { num_samples: 4 });
        assert_eq!(
            *seen.lock().expect("lock"),
            vec![EditorEvent::ClipboardChanged { num_samples: 4 }]
        );
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let mut listeners = Listeners::new();
        let count = Arc::new(Mutex::new(0usize));
        let c = count.clone();
        let id = listeners.subscribe(EventChannel::AudioBuffer, move |_| {
            *c.lock().expect("lock") += 1;
        });
        let ev = EditorEvent::AudioBufferChanged {
            num_channels: 1,
            num_samples: 1,
        };
        listeners.emit(&ev);
        assert!(listeners.unsubscribe(id));
        assert!(!listeners.unsubscribe(id));
        listeners.emit(&ev);
        assert_eq!(*count.lock().expect("lock"), 1);
    }
}
