//! Component registry.
//!
//! Owns every component by id, preserves insertion order for category
//! lookups, and rejects (logs + no-op) structurally invalid insertions.
//! Nothing here is fatal: the simulation runs with whatever valid subset
//! of the graph it has.

use std::collections::HashMap;

use tracing::warn;

use crate::component::{Category, HasMeta};
use crate::error::{GraphError, GraphResult};

/// Registry of all components, keyed by id.
#[derive(Debug)]
pub struct ComponentGraph<T: HasMeta> {
    /// Components in insertion order.
    items: Vec<T>,
    /// id -> index into `items`.
    index: HashMap<String, usize>,
}

impl<T: HasMeta> Default for ComponentGraph<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: HasMeta> ComponentGraph<T> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Register a component. An empty or duplicate id is reported and the
    /// component is dropped; the existing registration wins.
    pub fn insert(&mut self, component: T) -> GraphResult<()> {
        let id = component.id().to_owned();
        if id.is_empty() {
            warn!("rejecting component with empty id");
            return Err(GraphError::EmptyId);
        }
        if self.index.contains_key(&id) {
            warn!(id = %id, "rejecting duplicate component id");
            return Err(GraphError::DuplicateId { id });
        }
        self.index.insert(id, self.items.len());
        self.items.push(component);
        Ok(())
    }

    /// Remove a component by id, returning it if present.
    ///
    /// The caller owns the flow map and is responsible for dropping the
    /// edges that mention the removed id.
    pub fn remove(&mut self, id: &str) -> Option<T> {
        let pos = self.index.remove(id)?;
        let removed = self.items.remove(pos);
        // Reindex everything after the removed slot.
        for (i, item) in self.items.iter().enumerate().skip(pos) {
            self.index.insert(item.id().to_owned(), i);
        }
        Some(removed)
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.index.get(id).map(|&i| &self.items[i])
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut T> {
        let i = *self.index.get(id)?;
        Some(&mut self.items[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// All components of one category, in original insertion order.
    pub fn by_category(&self, category: Category) -> impl Iterator<Item = &T> {
        self.items
            .iter()
            .filter(move |c| c.category() == category)
    }

    /// Ids of one category, in original insertion order.
    pub fn ids_by_category(&self, category: Category) -> Vec<String> {
        self.by_category(category)
            .map(|c| c.id().to_owned())
            .collect()
    }

    /// All components in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.items.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Drop every component. Used on teardown, not on reset: reset keeps
    /// the topology and only re-initializes owned state.
    pub fn clear(&mut self) {
        self.items.clear();
        self.index.clear();
    }
}
