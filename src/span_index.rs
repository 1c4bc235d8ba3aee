//! Random-access positional view over one type.

use crate::store::{Entry, TypeView};
use crate::{Annotation, AnnotationStore, SelectResult, Span, TypeId};

/// Annotations of one type and its subtypes, in index order, with binary
/// search on `begin`.
pub struct SpanIndex<'a, P = ()> {
    store: &'a AnnotationStore<P>,
    view: &'a TypeView,
    type_id: TypeId,
}

impl<'a, P> Clone for SpanIndex<'a, P> {
    fn clone(&self) -> Self {
        Self {
            store: self.store,
            view: self.view,
            type_id: self.type_id,
        }
    }
}

impl<'a, P> std::fmt::Debug for SpanIndex<'a, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpanIndex")
            .field("type", &self.store.type_system().name(self.type_id))
            .field("len", &self.len())
            .field("max_len", &self.view.max_len)
            .finish()
    }
}

impl<'a, P> SpanIndex<'a, P> {
    pub(crate) fn new(store: &'a AnnotationStore<P>, type_id: TypeId) -> SelectResult<Self> {
        let view = store.view(type_id)?;
        Ok(Self {
            store,
            view,
            type_id,
        })
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn len(&self) -> usize {
        self.view.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.view.entries.is_empty()
    }

    pub fn get(&self, i: usize) -> Option<&'a Annotation<P>> {
        let store = self.store;
        let view = self.view;
        view.entries.get(i).and_then(|e| store.slot(e.seq))
    }

    pub fn span(&self, i: usize) -> Option<Span> {
        self.view.entries.get(i).map(|e| e.span)
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &'a Annotation<P>> + 'a {
        let store = self.store;
        let view = self.view;
        view.entries.iter().filter_map(move |e| store.slot(e.seq))
    }

    /// Index of the first annotation with `begin >= pos`.
    pub fn first_at_or_after(&self, pos: usize) -> usize {
        self.view.entries.partition_point(|e| e.span.begin < pos)
    }

    /// Index of the first annotation with `begin > pos`.
    pub fn first_after(&self, pos: usize) -> usize {
        self.view.entries.partition_point(|e| e.span.begin <= pos)
    }

    /// Length of the longest annotation ever inserted for these types.
    pub fn max_len(&self) -> usize {
        self.view.max_len
    }

    /// Index of an annotation in this view, if it is one of its members.
    pub fn position_of(&self, annotation: &Annotation<P>) -> Option<usize> {
        let span = annotation.span();
        let start = self.view.entries.partition_point(|e| e.span < span);
        self.view.entries[start..]
            .iter()
            .take_while(|e| e.span == span)
            .position(|e| e.seq == annotation.id().seq())
            .map(|offset| start + offset)
    }

    pub(crate) fn entries(&self) -> &'a [Entry] {
        let view = self.view;
        &view.entries
    }

    pub(crate) fn store(&self) -> &'a AnnotationStore<P> {
        self.store
    }
}

impl<P> AnnotationStore<P> {
    /// Positional index over a type and its subtypes.
    pub fn index(&self, type_id: TypeId) -> SelectResult<SpanIndex<'_, P>> {
        SpanIndex::new(self, type_id)
    }
}

#[cfg(test)]
mod tests {
    use crate::{AnnotationStore, Span, TypeSystem};
    use std::sync::Arc;

    #[test]
    fn test_binary_search_bounds() {
        let ts = Arc::new(TypeSystem::with_types(&["Token"]).unwrap());
        let token = ts.type_named("Token").unwrap();
        let mut store: AnnotationStore = AnnotationStore::new(ts);
        for (b, e) in [(0, 1), (2, 3), (2, 5), (4, 5), (4, 4), (8, 9)] {
            store.add(token, Span::new(b, e), ()).unwrap();
        }

        let index = store.index(token).unwrap();
        assert_eq!(index.len(), 6);
        assert_eq!(index.first_at_or_after(2), 1);
        assert_eq!(index.first_after(2), 3);
        assert_eq!(index.first_at_or_after(4), 3);
        assert_eq!(index.first_after(4), 5);
        assert_eq!(index.first_at_or_after(10), 6);
        assert_eq!(index.first_after(0), 1);
        assert_eq!(index.max_len(), 3);

        assert_eq!(index.span(1), Some(Span::new(2, 5)));
        assert_eq!(index.span(2), Some(Span::new(2, 3)));
        assert_eq!(index.span(4), Some(Span::point(4)));
    }

    #[test]
    fn test_position_of_identical_spans() {
        let ts = Arc::new(TypeSystem::with_types(&["Token"]).unwrap());
        let token = ts.type_named("Token").unwrap();
        let mut store: AnnotationStore = AnnotationStore::new(ts);
        store.add(token, Span::new(0, 1), ()).unwrap();
        let c = store.add(token, Span::new(4, 5), ()).unwrap();
        let c1 = store.add(token, Span::new(4, 5), ()).unwrap();

        let index = store.index(token).unwrap();
        assert_eq!(index.position_of(store.get(c).unwrap()), Some(1));
        assert_eq!(index.position_of(store.get(c1).unwrap()), Some(2));
    }
}
