//! Batch cover indices.
//!
//! Answering "what does each sentence cover" with one covered query per
//! sentence repeats the same binary searches. The builders here sweep both
//! positional indices once instead.

use crate::{AnnotationId, AnnotationStore, SelectResult, TypeId};
use std::collections::HashMap;

/// A map from every annotation of a key type to related annotations of a
/// value type, in index order.
///
/// Holds plain handles, so it outlives store mutations. A mutation makes it
/// stale; compare [`generation`](Self::generation) with
/// [`AnnotationStore::generation`] or call [`is_current`](Self::is_current).
#[derive(Debug, Clone)]
pub struct CoverIndex {
    store: u64,
    generation: u64,
    keys: Vec<AnnotationId>,
    entries: HashMap<AnnotationId, Vec<AnnotationId>>,
}

impl CoverIndex {
    fn new(store: u64, generation: u64) -> Self {
        Self {
            store,
            generation,
            keys: Vec::new(),
            entries: HashMap::new(),
        }
    }

    fn insert(&mut self, key: AnnotationId, values: Vec<AnnotationId>) {
        self.keys.push(key);
        self.entries.insert(key, values);
    }

    /// Values for a key; `None` if the key was not part of the build.
    pub fn get(&self, key: AnnotationId) -> Option<&[AnnotationId]> {
        self.entries.get(&key).map(Vec::as_slice)
    }

    /// Keys in index order.
    pub fn keys(&self) -> &[AnnotationId] {
        &self.keys
    }

    /// Key and values pairs, keys in index order.
    pub fn iter(&self) -> impl Iterator<Item = (AnnotationId, &[AnnotationId])> + '_ {
        self.keys
            .iter()
            .map(move |key| (*key, self.entries.get(key).map_or(&[][..], Vec::as_slice)))
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn store(&self) -> u64 {
        self.store
    }

    /// Store generation the index was built from.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// True if built from this store and nothing changed since.
    pub fn is_current<P>(&self, store: &AnnotationStore<P>) -> bool {
        self.store == store.id() && self.generation == store.generation()
    }
}

impl<P> AnnotationStore<P> {
    /// Map each container to the targets it covers.
    ///
    /// Equivalent to calling [`select_covered_by`](Self::select_covered_by)
    /// for every container, so a container never lists itself.
    pub fn index_covered(&self, container_type: TypeId, target_type: TypeId) -> SelectResult<CoverIndex> {
        let containers = self.index(container_type)?.entries();
        let targets = self.index(target_type)?.entries();

        let mut index = CoverIndex::new(self.id(), self.generation());
        let mut lo = 0;
        for c in containers {
            // Container begins only grow, so the lower bound only moves forward.
            while lo < targets.len() && targets[lo].span.begin < c.span.begin {
                lo += 1;
            }
            let covered = targets[lo..]
                .iter()
                .take_while(|t| t.span.begin <= c.span.end)
                .filter(|t| t.span.end <= c.span.end && t.seq != c.seq)
                .filter_map(|t| self.slot(t.seq).map(|a| a.id()))
                .collect();
            if let Some(container) = self.slot(c.seq) {
                index.insert(container.id(), covered);
            }
        }

        tracing::debug!(
            store = self.id(),
            generation = index.generation,
            container = self.type_system().name(container_type),
            target = self.type_system().name(target_type),
            keys = index.len(),
            "built covered index"
        );
        Ok(index)
    }

    /// Map each target to the containers covering it.
    ///
    /// Equivalent to calling [`select_covering_of`](Self::select_covering_of)
    /// for every target.
    pub fn index_covering(&self, target_type: TypeId, container_type: TypeId) -> SelectResult<CoverIndex> {
        let targets = self.index(target_type)?.entries();
        let containers = self.index(container_type)?.entries();

        let mut index = CoverIndex::new(self.id(), self.generation());
        let mut next = 0;
        let mut active = Vec::new();
        for t in targets {
            while next < containers.len() && containers[next].span.begin <= t.span.begin {
                active.push(containers[next]);
                next += 1;
            }
            // Later targets begin no earlier, so these can never cover again.
            active.retain(|c| c.span.end >= t.span.begin);

            let covering = active
                .iter()
                .filter(|c| c.span.end >= t.span.end && c.seq != t.seq)
                .filter_map(|c| self.slot(c.seq).map(|a| a.id()))
                .collect();
            if let Some(target) = self.slot(t.seq) {
                index.insert(target.id(), covering);
            }
        }

        tracing::debug!(
            store = self.id(),
            generation = index.generation,
            target = self.type_system().name(target_type),
            container = self.type_system().name(container_type),
            keys = index.len(),
            "built covering index"
        );
        Ok(index)
    }
}
