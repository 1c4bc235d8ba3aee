//! Positional queries over an [`AnnotationStore`].
//!
//! Every query seeds a bounded scan with a binary search on the positional
//! index of the target type and returns matches in index order. Queries
//! that take an annotation instead of a bare span never return that
//! annotation instance itself.

use crate::{
    Annotation, AnnotationStore, CoveringScan, SelectError, SelectResult, Span, SpanIndex, TypeId,
};
use std::cmp::Ordering;

impl<P> AnnotationStore<P> {
    /// All annotations of a type (and its subtypes), in index order.
    pub fn select(&self, type_id: TypeId) -> SelectResult<impl DoubleEndedIterator<Item = &Annotation<P>> + '_> {
        Ok(self.index(type_id)?.iter())
    }

    /// The annotation at position `i` in index order. Negative positions
    /// count from the end; out of range is `None`.
    pub fn select_by_index(&self, type_id: TypeId, i: isize) -> SelectResult<Option<&Annotation<P>>> {
        let index = self.index(type_id)?;
        let len = index.len() as isize;
        let pos = if i < 0 { len + i } else { i };
        if pos < 0 || pos >= len {
            return Ok(None);
        }
        Ok(index.get(pos as usize))
    }

    /// The only annotation of a type.
    pub fn select_single(&self, type_id: TypeId) -> SelectResult<&Annotation<P>> {
        let index = self.index(type_id)?;
        self.single(type_id, index.iter().collect(), "in the store")
    }

    pub fn exists(&self, type_id: TypeId) -> SelectResult<bool> {
        Ok(!self.index(type_id)?.is_empty())
    }

    /// Annotations lying within `span`.
    ///
    /// A zero-width container only covers zero-width annotations at its
    /// position.
    pub fn select_covered(&self, type_id: TypeId, span: Span) -> SelectResult<Vec<&Annotation<P>>> {
        let index = self.index(type_id)?;
        Ok(covered(&index, span, None).collect())
    }

    /// Annotations lying within `container`, excluding the container itself.
    pub fn select_covered_by(
        &self,
        type_id: TypeId,
        container: &Annotation<P>,
    ) -> SelectResult<Vec<&Annotation<P>>> {
        self.check_id(container.id())?;
        let index = self.index(type_id)?;
        Ok(covered(&index, container.span(), Some(container.id().seq())).collect())
    }

    /// True if any annotation of the type lies within `container`.
    pub fn contains(&self, container: &Annotation<P>, type_id: TypeId) -> SelectResult<bool> {
        self.check_id(container.id())?;
        let index = self.index(type_id)?;
        let found = covered(&index, container.span(), Some(container.id().seq()))
            .next()
            .is_some();
        Ok(found)
    }

    /// Annotations enclosing `span` (boundaries included).
    pub fn select_covering(&self, type_id: TypeId, span: Span) -> SelectResult<Vec<&Annotation<P>>> {
        let index = self.index(type_id)?;
        Ok(self.covering(&index, span, None))
    }

    /// Annotations enclosing `annotation`, excluding the annotation itself.
    pub fn select_covering_of(
        &self,
        type_id: TypeId,
        annotation: &Annotation<P>,
    ) -> SelectResult<Vec<&Annotation<P>>> {
        self.check_id(annotation.id())?;
        let index = self.index(type_id)?;
        Ok(self.covering(&index, annotation.span(), Some(annotation.id().seq())))
    }

    /// Annotations lying in the gap between two boundary annotations.
    ///
    /// The boundaries may be given in either order. Overlapping boundaries
    /// have no gap, so the result is empty.
    pub fn select_between(
        &self,
        type_id: TypeId,
        left: &Annotation<P>,
        right: &Annotation<P>,
    ) -> SelectResult<Vec<&Annotation<P>>> {
        if left.id().store() != right.id().store() {
            return Err(SelectError::InvalidBoundary {
                reason: format!(
                    "boundaries come from different stores ({} and {})",
                    left.id().store(),
                    right.id().store()
                ),
            });
        }
        self.check_id(left.id())?;
        self.select_between_spans(type_id, left.span(), right.span())
    }

    /// [`select_between`](Self::select_between) over bare spans.
    pub fn select_between_spans(
        &self,
        type_id: TypeId,
        a: Span,
        b: Span,
    ) -> SelectResult<Vec<&Annotation<P>>> {
        let index = self.index(type_id)?;
        if a.overlaps(&b) {
            return Ok(Vec::new());
        }
        let gap = Span::new(a.end.min(b.end), a.begin.max(b.begin));
        Ok(covered(&index, gap, None).collect())
    }

    /// Annotations with exactly this span.
    pub fn select_at(&self, type_id: TypeId, span: Span) -> SelectResult<Vec<&Annotation<P>>> {
        let index = self.index(type_id)?;
        let entries = index.entries();
        let mut result = Vec::new();
        for e in &entries[index.first_at_or_after(span.begin)..] {
            // Same begin sorts by descending end.
            if e.span.begin != span.begin || e.span.end < span.end {
                break;
            }
            if e.span.end == span.end {
                result.extend(self.slot(e.seq));
            }
        }
        Ok(result)
    }

    /// The only annotation with exactly this span.
    pub fn select_single_at(&self, type_id: TypeId, span: Span) -> SelectResult<&Annotation<P>> {
        let matches = self.select_at(type_id, span)?;
        self.single(type_id, matches, &format!("at {}", span))
    }

    /// Up to `count` annotations ending at or before `reference` begins,
    /// nearest last.
    pub fn select_preceding(
        &self,
        type_id: TypeId,
        reference: &Annotation<P>,
        count: usize,
    ) -> SelectResult<Vec<&Annotation<P>>> {
        self.check_id(reference.id())?;
        let index = self.index(type_id)?;
        Ok(self.preceding(&index, reference.span(), Some(reference.id().seq()), count))
    }

    /// [`select_preceding`](Self::select_preceding) relative to a bare span.
    pub fn select_preceding_span(
        &self,
        type_id: TypeId,
        span: Span,
        count: usize,
    ) -> SelectResult<Vec<&Annotation<P>>> {
        let index = self.index(type_id)?;
        Ok(self.preceding(&index, span, None, count))
    }

    /// Up to `count` annotations beginning at or after `reference` ends,
    /// nearest first.
    pub fn select_following(
        &self,
        type_id: TypeId,
        reference: &Annotation<P>,
        count: usize,
    ) -> SelectResult<Vec<&Annotation<P>>> {
        self.check_id(reference.id())?;
        let index = self.index(type_id)?;
        Ok(self.following(&index, reference.span(), Some(reference.id().seq()), count))
    }

    /// [`select_following`](Self::select_following) relative to a bare span.
    pub fn select_following_span(
        &self,
        type_id: TypeId,
        span: Span,
        count: usize,
    ) -> SelectResult<Vec<&Annotation<P>>> {
        let index = self.index(type_id)?;
        Ok(self.following(&index, span, None, count))
    }

    /// The annotation `offset` positions away from `reference`.
    ///
    /// Offset 0 is the reference itself, valid only if it is of the
    /// requested type. Negative offsets walk preceding neighbours, positive
    /// offsets following ones.
    pub fn select_single_relative(
        &self,
        type_id: TypeId,
        reference: &Annotation<P>,
        offset: isize,
    ) -> SelectResult<&Annotation<P>> {
        self.check_id(reference.id())?;
        self.type_system().check(type_id)?;
        let not_found = |detail: String| SelectError::NotFound {
            type_name: self.type_system().name(type_id).to_string(),
            detail,
        };

        let distance = offset.unsigned_abs();
        match offset.cmp(&0) {
            Ordering::Equal => {
                if self.type_system().subsumes(type_id, reference.type_id()) {
                    self.get(reference.id())
                        .ok_or_else(|| not_found(format!("at {}", reference.span())))
                } else {
                    Err(not_found(format!(
                        "at offset 0 from a {} annotation",
                        self.type_system().name(reference.type_id())
                    )))
                }
            }
            Ordering::Less => {
                let preceding = self.select_preceding(type_id, reference, distance)?;
                if preceding.len() < distance {
                    return Err(not_found(format!(
                        "{} positions before {}, only {} exist",
                        distance,
                        reference.span(),
                        preceding.len()
                    )));
                }
                Ok(preceding[0])
            }
            Ordering::Greater => {
                let following = self.select_following(type_id, reference, distance)?;
                if following.len() < distance {
                    return Err(not_found(format!(
                        "{} positions after {}, only {} exist",
                        distance,
                        reference.span(),
                        following.len()
                    )));
                }
                Ok(following[distance - 1])
            }
        }
    }

    /// Covered text of each annotation; annotations off the text yield "".
    pub fn texts<'a>(&'a self, annotations: impl IntoIterator<Item = &'a Annotation<P>>) -> Vec<&'a str>
    where
        P: 'a,
    {
        annotations
            .into_iter()
            .map(|a| self.covered_text(a).unwrap_or(""))
            .collect()
    }

    fn covering<'a>(&'a self, index: &SpanIndex<'a, P>, span: Span, exclude: Option<usize>) -> Vec<&'a Annotation<P>> {
        let entries = index.entries();
        let bound = match self.config().covering_scan {
            CoveringScan::MaxLength => Some(index.max_len()),
            CoveringScan::Full => None,
        };

        let mut result = Vec::new();
        for e in entries[..index.first_after(span.begin)].iter().rev() {
            if let Some(max_len) = bound {
                // Nothing that begins here or earlier can reach the query end.
                if e.span.begin.saturating_add(max_len) < span.end {
                    break;
                }
            }
            if e.span.end >= span.end && Some(e.seq) != exclude {
                result.extend(self.slot(e.seq));
            }
        }
        result.reverse();
        result
    }

    fn preceding<'a>(
        &'a self,
        index: &SpanIndex<'a, P>,
        span: Span,
        exclude: Option<usize>,
        count: usize,
    ) -> Vec<&'a Annotation<P>> {
        let mut result = Vec::new();
        if count == 0 {
            return result;
        }
        let entries = index.entries();
        for e in entries[..index.first_after(span.begin)].iter().rev() {
            if e.span.end > span.begin || Some(e.seq) == exclude {
                continue;
            }
            result.extend(self.slot(e.seq));
            if result.len() == count {
                break;
            }
        }
        result.reverse();
        result
    }

    fn following<'a>(
        &'a self,
        index: &SpanIndex<'a, P>,
        span: Span,
        exclude: Option<usize>,
        count: usize,
    ) -> Vec<&'a Annotation<P>> {
        let mut result = Vec::new();
        if count == 0 {
            return result;
        }
        let entries = index.entries();
        for e in &entries[index.first_at_or_after(span.end)..] {
            if Some(e.seq) == exclude {
                continue;
            }
            result.extend(self.slot(e.seq));
            if result.len() == count {
                break;
            }
        }
        result
    }

    fn single<'a>(
        &self,
        type_id: TypeId,
        matches: Vec<&'a Annotation<P>>,
        detail: &str,
    ) -> SelectResult<&'a Annotation<P>> {
        let type_name = self.type_system().name(type_id).to_string();
        match matches.as_slice() {
            [only] => Ok(*only),
            [] => Err(SelectError::NotFound {
                type_name,
                detail: detail.to_string(),
            }),
            many => Err(SelectError::AmbiguousSelection {
                type_name,
                count: many.len(),
            }),
        }
    }
}

/// Lazily walk the annotations of `index` lying within `span`.
///
/// Stops at the first candidate beginning after the container end.
fn covered<'a, P>(
    index: &SpanIndex<'a, P>,
    span: Span,
    exclude: Option<usize>,
) -> impl Iterator<Item = &'a Annotation<P>> + 'a {
    let store = index.store();
    let entries = index.entries();
    entries[index.first_at_or_after(span.begin)..]
        .iter()
        .take_while(move |e| e.span.begin <= span.end)
        .filter(move |e| e.span.end <= span.end && Some(e.seq) != exclude)
        .filter_map(move |e| store.slot(e.seq))
}
