//! Brute-force reference implementations.
//!
//! Each function scans every annotation of the type and applies the plain
//! positional predicate. They are slow but obviously correct, and serve as
//! oracles for the indexed queries in tests and fixture runs.

use crate::{Annotation, AnnotationId, AnnotationStore, SelectResult, Span, TypeId};
use std::collections::HashMap;

fn all<P>(store: &AnnotationStore<P>, type_id: TypeId) -> SelectResult<Vec<&Annotation<P>>> {
    store.type_system().check(type_id)?;
    let ts = store.type_system();
    let order = store.order();
    let mut found: Vec<_> = store
        .annotations()
        .filter(|a| ts.subsumes(type_id, a.type_id()))
        .collect();
    found.sort_by(|a, b| order.compare(a, b));
    Ok(found)
}

pub fn covered<P>(store: &AnnotationStore<P>, type_id: TypeId, span: Span) -> SelectResult<Vec<&Annotation<P>>> {
    let mut result = all(store, type_id)?;
    result.retain(|a| span.contains(&a.span()));
    Ok(result)
}

pub fn covering<P>(store: &AnnotationStore<P>, type_id: TypeId, span: Span) -> SelectResult<Vec<&Annotation<P>>> {
    let mut result = all(store, type_id)?;
    result.retain(|a| a.span().contains(&span));
    Ok(result)
}

pub fn between<P>(store: &AnnotationStore<P>, type_id: TypeId, a: Span, b: Span) -> SelectResult<Vec<&Annotation<P>>> {
    let mut result = all(store, type_id)?;
    if a.overlaps(&b) {
        return Ok(Vec::new());
    }
    let gap_begin = a.end.min(b.end);
    let gap_end = a.begin.max(b.begin);
    result.retain(|x| x.begin() >= gap_begin && x.end() <= gap_end);
    Ok(result)
}

pub fn at<P>(store: &AnnotationStore<P>, type_id: TypeId, span: Span) -> SelectResult<Vec<&Annotation<P>>> {
    let mut result = all(store, type_id)?;
    result.retain(|a| a.span() == span);
    Ok(result)
}

/// Up to `count` annotations ending at or before `span` begins, skipping
/// `exclude`.
pub fn preceding<P>(
    store: &AnnotationStore<P>,
    type_id: TypeId,
    span: Span,
    exclude: Option<AnnotationId>,
    count: usize,
) -> SelectResult<Vec<&Annotation<P>>> {
    let mut result = all(store, type_id)?;
    result.retain(|a| a.end() <= span.begin && Some(a.id()) != exclude);
    let skip = result.len().saturating_sub(count);
    Ok(result.split_off(skip))
}

/// Up to `count` annotations beginning at or after `span` ends, skipping
/// `exclude`.
pub fn following<P>(
    store: &AnnotationStore<P>,
    type_id: TypeId,
    span: Span,
    exclude: Option<AnnotationId>,
    count: usize,
) -> SelectResult<Vec<&Annotation<P>>> {
    let mut result = all(store, type_id)?;
    result.retain(|a| a.begin() >= span.end && Some(a.id()) != exclude);
    result.truncate(count);
    Ok(result)
}

pub fn index_covered<P>(
    store: &AnnotationStore<P>,
    container_type: TypeId,
    target_type: TypeId,
) -> SelectResult<HashMap<AnnotationId, Vec<AnnotationId>>> {
    let targets = all(store, target_type)?;
    Ok(all(store, container_type)?
        .into_iter()
        .map(|c| {
            let covered = targets
                .iter()
                .filter(|t| t.id() != c.id() && c.span().contains(&t.span()))
                .map(|t| t.id())
                .collect();
            (c.id(), covered)
        })
        .collect())
}

pub fn index_covering<P>(
    store: &AnnotationStore<P>,
    target_type: TypeId,
    container_type: TypeId,
) -> SelectResult<HashMap<AnnotationId, Vec<AnnotationId>>> {
    let containers = all(store, container_type)?;
    Ok(all(store, target_type)?
        .into_iter()
        .map(|t| {
            let covering = containers
                .iter()
                .filter(|c| c.id() != t.id() && c.span().contains(&t.span()))
                .map(|c| c.id())
                .collect();
            (t.id(), covering)
        })
        .collect())
}
