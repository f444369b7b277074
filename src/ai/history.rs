use std::num::NonZeroUsize;

use lru::LruCache;
use serde::{Serialize, Serializer};
use tracing::debug;

use crate::record::Node;

/// Generation results keyed by their input text. Unbounded unless built
/// with [`History::bounded`]; serializes as a map from input to node.
#[derive(Debug)]
pub struct History {
    entries: LruCache<String, Node>,
    capacity: Option<NonZeroUsize>,
}

impl Default for History {
    fn default() -> Self {
        Self {
            entries: LruCache::unbounded(),
            capacity: None,
        }
    }
}

impl History {
    /// Keeps at most `capacity` entries, evicting the least recently written.
    pub fn bounded(capacity: NonZeroUsize) -> Self {
        Self {
            entries: LruCache::new(capacity),
            capacity: Some(capacity),
        }
    }

    pub fn capacity(&self) -> Option<NonZeroUsize> {
        self.capacity
    }

    /// Stores `node` under its input, replacing any earlier node for it.
    pub fn insert(&mut self, node: Node) -> Option<Node> {
        let key = node.input.clone();
        match self.entries.push(key.clone(), node) {
            Some((old_key, previous)) if old_key == key => Some(previous),
            Some((evicted, _)) => {
                debug!(key = %evicted, "evicting history entry");
                None
            }
            None => None,
        }
    }

    // Reads go through `peek` so only writes count towards recency.
    pub fn get(&self, input: &str) -> Option<&Node> {
        self.entries.peek(input)
    }

    pub fn contains_key(&self, input: &str) -> bool {
        self.entries.contains(input)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for History {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.entries.iter())
    }
}
