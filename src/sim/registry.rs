//! Index-based listener registry
//!
//! Subscriptions are keyed by a stable id rather than by callback identity,
//! so `unsubscribe` always removes exactly the registration `subscribe`
//! created. Both operations are idempotent.

use serde::{Deserialize, Serialize};

/// Stable obstacle identity, allocated monotonically by the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObstacleId(pub u32);

impl std::fmt::Display for ObstacleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SubscriberRegistry {
    /// Sorted, no duplicates
    ids: Vec<ObstacleId>,
}

impl SubscriberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if `id` was already subscribed
    pub fn subscribe(&mut self, id: ObstacleId) -> bool {
        match self.ids.binary_search(&id) {
            Ok(_) => false,
            Err(pos) => {
                self.ids.insert(pos, id);
                true
            }
        }
    }

    /// Returns false if `id` was not subscribed
    pub fn unsubscribe(&mut self, id: ObstacleId) -> bool {
        match self.ids.binary_search(&id) {
            Ok(pos) => {
                self.ids.remove(pos);
                true
            }
            Err(_) => false,
        }
    }

    pub fn contains(&self, id: ObstacleId) -> bool {
        self.ids.binary_search(&id).is_ok()
    }

    /// Current listeners in id order
    pub fn ids(&self) -> &[ObstacleId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }
}
