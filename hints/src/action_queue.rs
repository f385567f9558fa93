use arena_ai_core::{ActionId, ActorId};

/// Action requested by some producer for the action-priority collaborator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QueuedAction {
    /// Action to execute.
    pub action: ActionId,
    /// Target of the action, if it needs one.
    pub target: Option<ActorId>,
    /// Relative importance; larger values win.
    pub priority: f32,
    /// Seconds until the request lapses.
    pub expire_in: f32,
}

/// Outgoing actions gathered during a tick.
#[derive(Clone, Debug, Default)]
pub struct ActionQueue {
    entries: Vec<QueuedAction>,
}

impl ActionQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a request.
    pub fn push(
        &mut self,
        action: ActionId,
        target: Option<ActorId>,
        priority: f32,
        expire_in: f32,
    ) {
        self.entries.push(QueuedAction {
            action,
            target,
            priority,
            expire_in,
        });
    }

    /// Highest priority request; the earliest pushed wins ties.
    #[must_use]
    pub fn best(&self) -> Option<&QueuedAction> {
        self.entries.iter().fold(None, |best, entry| match best {
            Some(current) if current.priority >= entry.priority => Some(current),
            _ => Some(entry),
        })
    }

    /// Drops every request.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Requests in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &QueuedAction> {
        self.entries.iter()
    }

    /// Number of queued requests.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Reports whether nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
