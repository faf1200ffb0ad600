use parking_lot::RwLock;
use std::collections::HashMap;

use crate::entity::{Entity, EntityId};

/// Default number of entities awaiting review
pub const DEFAULT_REVIEW_QUEUE_CAPACITY: usize = 100;

#[derive(Debug, Default)]
struct QueueState {
    entries: HashMap<EntityId, (u64, Entity)>,
    next_sequence: u64,
}

/// Bounded store of low-confidence entities awaiting human review.
///
/// The queue never evicts and never overwrites: once full, `add` fails and
/// reviewers have to drain it. Each operation runs under one lock, so
/// `size` and `all` always see a consistent state.
#[derive(Debug)]
pub struct ReviewQueue {
    state: RwLock<QueueState>,
    capacity: usize,
}

impl Default for ReviewQueue {
    fn default() -> Self {
        Self::new(DEFAULT_REVIEW_QUEUE_CAPACITY)
    }
}

impl ReviewQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            state: RwLock::new(QueueState::default()),
            capacity,
        }
    }

    /// Add an entity. Returns `false` if the queue is full or an entry with
    /// the same identifier is already pending.
    pub fn add(&self, entity: Entity) -> bool {
        let mut state = self.state.write();

        if state.entries.len() >= self.capacity {
            tracing::warn!(
                entity_id = %entity.id,
                queue_size = state.entries.len(),
                max_size = self.capacity,
                "Review queue is full"
            );
            return false;
        }

        if state.entries.contains_key(&entity.id) {
            tracing::warn!(entity_id = %entity.id, "Entity already pending review");
            return false;
        }

        let sequence = state.next_sequence;
        state.next_sequence += 1;
        state.entries.insert(entity.id, (sequence, entity));
        true
    }

    pub fn get(&self, id: &EntityId) -> Option<Entity> {
        self.state.read().entries.get(id).map(|(_, entity)| entity.clone())
    }

    pub fn remove(&self, id: &EntityId) -> bool {
        self.state.write().entries.remove(id).is_some()
    }

    /// Remove and return an entry in one step
    pub fn take(&self, id: &EntityId) -> Option<Entity> {
        self.state.write().entries.remove(id).map(|(_, entity)| entity)
    }

    /// Pending entries in insertion order
    pub fn all(&self) -> Vec<Entity> {
        let state = self.state.read();
        let mut entries: Vec<&(u64, Entity)> = state.entries.values().collect();
        entries.sort_by_key(|(sequence, _)| *sequence);
        entries.into_iter().map(|(_, entity)| entity.clone()).collect()
    }

    pub fn size(&self) -> usize {
        self.state.read().entries.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.size() >= self.capacity
    }
}
