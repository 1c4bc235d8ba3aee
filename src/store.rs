//! The ordered annotation store.
//!
//! A store owns the document text and every annotation over it. Per exact
//! type it keeps annotations in index order; views over a type and its
//! subtypes are merged on first use and dropped whenever the store changes.
//!
//! Mutation takes `&mut self`, so nothing can query a store while it is
//! being changed. Batch indices hold plain ids and outlive mutations; they
//! are then stale and must be rebuilt by the caller.

use crate::{
    AnnotationOrder, SelectConfig, SelectError, SelectResult, Span, TypeId, TypePriorities,
    TypeSystem,
};
use once_cell::sync::OnceCell;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_STORE_ID: AtomicU64 = AtomicU64::new(1);

/// Handle of an annotation: the owning store plus its insertion sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnnotationId {
    store: u64,
    seq: usize,
}

impl AnnotationId {
    pub fn store(&self) -> u64 {
        self.store
    }

    /// Insertion sequence within the store.
    pub fn seq(&self) -> usize {
        self.seq
    }
}

/// A typed span with an opaque payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation<P = ()> {
    id: AnnotationId,
    span: Span,
    type_id: TypeId,
    payload: P,
}

impl<P> Annotation<P> {
    pub fn id(&self) -> AnnotationId {
        self.id
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn begin(&self) -> usize {
        self.span.begin
    }

    pub fn end(&self) -> usize {
        self.span.end
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn payload(&self) -> &P {
        &self.payload
    }
}

/// Position of one annotation inside an ordered view.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Entry {
    pub(crate) span: Span,
    pub(crate) type_id: TypeId,
    pub(crate) seq: usize,
}

/// Annotations of one type (and its subtypes) in index order.
#[derive(Debug, Clone, Default)]
pub(crate) struct TypeView {
    pub(crate) entries: Vec<Entry>,
    /// Longest span ever inserted for the covered types.
    pub(crate) max_len: usize,
}

pub struct AnnotationStore<P = ()> {
    id: u64,
    generation: u64,
    type_system: Arc<TypeSystem>,
    priorities: TypePriorities,
    config: SelectConfig,
    text: String,
    slots: Vec<Option<Annotation<P>>>,
    live: usize,
    /// Exact-type views, indexed by type.
    exact: Vec<TypeView>,
    /// Merged type + subtype views, indexed by type.
    merged: Vec<OnceCell<TypeView>>,
}

impl<P> std::fmt::Debug for AnnotationStore<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnnotationStore")
            .field("id", &self.id)
            .field("generation", &self.generation)
            .field("annotations", &self.live)
            .field("text_len", &self.text.len())
            .finish()
    }
}

impl<P> AnnotationStore<P> {
    /// Create an empty store over a type system, without priorities.
    pub fn new(type_system: Arc<TypeSystem>) -> Self {
        let n = type_system.len();
        Self {
            id: NEXT_STORE_ID.fetch_add(1, Ordering::Relaxed),
            generation: 0,
            type_system,
            priorities: TypePriorities::none(),
            config: SelectConfig::default(),
            text: String::new(),
            slots: Vec::new(),
            live: 0,
            exact: vec![TypeView::default(); n],
            merged: (0..n).map(|_| OnceCell::new()).collect(),
        }
    }

    /// Use type priorities built for this store's type system.
    pub fn with_priorities(mut self, priorities: TypePriorities) -> SelectResult<Self> {
        priorities.check(&self.type_system)?;
        self.priorities = priorities;
        self.invalidate();
        Ok(self)
    }

    pub fn with_config(mut self, config: SelectConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.generation += 1;
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Bumped on every mutation. Batch indices record the generation they
    /// were built from.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn type_system(&self) -> &TypeSystem {
        &self.type_system
    }

    pub fn priorities(&self) -> &TypePriorities {
        &self.priorities
    }

    pub fn config(&self) -> &SelectConfig {
        &self.config
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of annotations currently in the store.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// The total order annotations of this store are merged by.
    pub fn order(&self) -> AnnotationOrder<'_> {
        AnnotationOrder::new(&self.priorities)
    }

    /// Add an annotation and return its handle.
    pub fn add(&mut self, type_id: TypeId, span: Span, payload: P) -> SelectResult<AnnotationId> {
        self.type_system.check(type_id)?;
        if span.end < span.begin {
            return Err(SelectError::InvalidSpan {
                begin: span.begin,
                end: span.end,
            });
        }
        let id = AnnotationId {
            store: self.id,
            seq: self.slots.len(),
        };

        let view = &mut self.exact[type_id.index()];
        // Equal spans keep insertion order: the new sequence is the largest.
        let pos = view.entries.partition_point(|e| e.span <= span);
        view.entries.insert(
            pos,
            Entry {
                span,
                type_id,
                seq: id.seq,
            },
        );
        view.max_len = view.max_len.max(span.len());

        self.slots.push(Some(Annotation {
            id,
            span,
            type_id,
            payload,
        }));
        self.live += 1;
        self.invalidate();

        tracing::trace!(
            store = self.id,
            seq = id.seq,
            type_name = self.type_system.name(type_id),
            begin = span.begin,
            end = span.end,
            "added annotation"
        );
        Ok(id)
    }

    /// Remove an annotation. Returns `None` if it was already removed.
    ///
    /// The per-type maximum length is not lowered, it stays a safe bound.
    pub fn remove(&mut self, id: AnnotationId) -> SelectResult<Option<Annotation<P>>> {
        self.check_id(id)?;
        let removed = match self.slots.get_mut(id.seq).and_then(Option::take) {
            Some(annotation) => annotation,
            None => return Ok(None),
        };

        let view = &mut self.exact[removed.type_id.index()];
        if let Some(pos) = view.entries.iter().position(|e| e.seq == id.seq) {
            view.entries.remove(pos);
        }
        self.live -= 1;
        self.invalidate();

        tracing::trace!(store = self.id, seq = id.seq, "removed annotation");
        Ok(Some(removed))
    }

    pub fn get(&self, id: AnnotationId) -> Option<&Annotation<P>> {
        if id.store != self.id {
            return None;
        }
        self.slots.get(id.seq).and_then(Option::as_ref)
    }

    /// Live annotations in insertion order.
    pub fn annotations(&self) -> impl Iterator<Item = &Annotation<P>> + '_ {
        self.slots.iter().flatten()
    }

    /// Resolve a list of handles, skipping any that no longer exist.
    pub fn resolve<'a>(&'a self, ids: &'a [AnnotationId]) -> impl Iterator<Item = &'a Annotation<P>> + 'a {
        ids.iter().filter_map(move |&id| self.get(id))
    }

    /// The document text under an annotation, if the span lies on it.
    pub fn covered_text(&self, annotation: &Annotation<P>) -> Option<&str> {
        self.text.get(annotation.begin()..annotation.end())
    }

    /// Reject handles issued by another store.
    pub fn check_id(&self, id: AnnotationId) -> SelectResult<()> {
        if id.store == self.id {
            Ok(())
        } else {
            Err(SelectError::ForeignAnnotation {
                expected: self.id,
                found: id.store,
            })
        }
    }

    pub(crate) fn slot(&self, seq: usize) -> Option<&Annotation<P>> {
        self.slots.get(seq).and_then(Option::as_ref)
    }

    /// Ordered view over a type and its subtypes.
    ///
    /// A type without subtypes is served from its exact view, only merged
    /// views are built and cached.
    pub(crate) fn view(&self, type_id: TypeId) -> SelectResult<&TypeView> {
        self.type_system.check(type_id)?;
        if let [only] = self.type_system.subtypes(type_id) {
            return Ok(&self.exact[only.index()]);
        }
        Ok(self.merged[type_id.index()].get_or_init(|| self.build_view(type_id)))
    }

    fn build_view(&self, type_id: TypeId) -> TypeView {
        let subtypes = self.type_system.subtypes(type_id);
        let mut entries = Vec::new();
        let mut max_len = 0;
        for ty in subtypes {
            let exact = &self.exact[ty.index()];
            entries.extend_from_slice(&exact.entries);
            max_len = max_len.max(exact.max_len);
        }
        let order = self.order();
        entries.sort_by_key(|e| order.key(e.span, e.type_id, e.seq));

        tracing::trace!(
            store = self.id,
            type_name = self.type_system.name(type_id),
            subtypes = subtypes.len(),
            annotations = entries.len(),
            "merged type view"
        );
        TypeView { entries, max_len }
    }

    fn invalidate(&mut self) {
        self.generation += 1;
        for cell in self.merged.iter_mut() {
            cell.take();
        }
    }
}
