//! Level-complete notifications.
//!
//! Listeners are plain closures registered on an [`EventBus`]. They run synchronously, in
//! the order they subscribed, on the tick that reached the goal.

use super::score::LevelResult;

/// Handle returned by [`EventBus::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Callback invoked with the result of a completed level.
pub type LevelCompleteListener = Box<dyn FnMut(&LevelResult)>;

/// Ordered list of level-complete listeners.
#[derive(Default)]
pub struct EventBus {
    listeners: Vec<(ListenerId, LevelCompleteListener)>,
    next_id: u64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a listener after the existing ones.
    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&LevelResult) + 'static,
    {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Removes a listener. Returns `false` if it was not subscribed.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    /// Calls every listener with `result`, in subscription order.
    pub fn emit(&mut self, result: &LevelResult) {
        for (_, listener) in &mut self.listeners {
            listener(result);
        }
    }

    /// Number of registered listeners.
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}
