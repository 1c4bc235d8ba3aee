//! Type priorities and the total order over annotations.
//!
//! Priorities only matter when two annotations of different types share a
//! span and are merged into one ordering, e.g. when selecting a supertype.

use crate::{Annotation, SelectError, SelectResult, Span, TypeId, TypeSystem};
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// Rank shared by every type without a listed ancestor. Sorts after all
/// ranked types.
const UNRANKED: u32 = u32::MAX;

/// A strict partial order over types, built from ordered priority lists.
///
/// Earlier types in a list come first in index order when spans coincide.
/// Several lists are merged; a type missing from every list inherits the
/// position of its nearest listed supertype.
#[derive(Debug, Clone, Default)]
pub struct TypePriorities {
    system: Option<u32>,
    /// Nearest listed type (itself or an ancestor) per type index.
    effective: Vec<Option<usize>>,
    /// `before[a][b]`: listed type `a` strictly precedes listed type `b`.
    before: Vec<Vec<bool>>,
    rank: Vec<u32>,
}

impl TypePriorities {
    /// No priorities: coinciding spans of different types keep insertion order.
    pub fn none() -> Self {
        Self::default()
    }

    /// A single priority list.
    pub fn from_names(ts: &TypeSystem, names: &[&str]) -> SelectResult<Self> {
        Self::from_lists(ts, &[names])
    }

    /// Merge several priority lists into one partial order.
    pub fn from_lists<L, S>(ts: &TypeSystem, lists: &[L]) -> SelectResult<Self>
    where
        L: AsRef<[S]>,
        S: AsRef<str>,
    {
        let n = ts.len();
        let mut edges = vec![Vec::new(); n];
        let mut listed = vec![false; n];

        for list in lists {
            let mut previous: Option<usize> = None;
            for name in list.as_ref() {
                let name = name.as_ref();
                let ty = ts.type_named(name)?.index();
                listed[ty] = true;
                if let Some(prev) = previous {
                    if prev == ty {
                        return Err(SelectError::PriorityCycle(name.to_string()));
                    }
                    edges[prev].push(ty);
                }
                previous = Some(ty);
            }
        }

        // Transitive closure by DFS from every listed type.
        let mut before = vec![vec![false; n]; n];
        for start in 0..n {
            if !listed[start] {
                continue;
            }
            let mut stack = edges[start].clone();
            while let Some(next) = stack.pop() {
                if !before[start][next] {
                    before[start][next] = true;
                    stack.extend(edges[next].iter().copied());
                }
            }
            if before[start][start] {
                let ty = ts.types().nth(start).map(|t| ts.name(t).to_string());
                return Err(SelectError::PriorityCycle(ty.unwrap_or_default()));
            }
        }

        // Linearize with Kahn's algorithm, preferring declaration order.
        let mut indegree = vec![0usize; n];
        for targets in &edges {
            for &t in targets {
                indegree[t] += 1;
            }
        }
        let mut ready: BinaryHeap<Reverse<usize>> = (0..n)
            .filter(|&t| listed[t] && indegree[t] == 0)
            .map(Reverse)
            .collect();
        let mut listed_rank = vec![UNRANKED; n];
        let mut next_rank = 0;
        while let Some(Reverse(ty)) = ready.pop() {
            listed_rank[ty] = next_rank;
            next_rank += 1;
            for &t in &edges[ty] {
                indegree[t] -= 1;
                if indegree[t] == 0 {
                    ready.push(Reverse(t));
                }
            }
        }

        let mut effective = vec![None; n];
        let mut rank = vec![UNRANKED; n];
        for ty in ts.types() {
            let mut current = Some(ty);
            while let Some(candidate) = current {
                if listed[candidate.index()] {
                    effective[ty.index()] = Some(candidate.index());
                    rank[ty.index()] = listed_rank[candidate.index()];
                    break;
                }
                current = ts.supertype(candidate);
            }
        }

        Ok(Self {
            system: Some(ts.id()),
            effective,
            before,
            rank,
        })
    }

    /// The partial order between two types; `None` means unordered.
    pub fn compare(&self, a: TypeId, b: TypeId) -> Option<Ordering> {
        if a == b {
            return Some(Ordering::Equal);
        }
        let ea = self.effective.get(a.index()).copied().flatten()?;
        let eb = self.effective.get(b.index()).copied().flatten()?;
        if self.before[ea][eb] {
            Some(Ordering::Less)
        } else if self.before[eb][ea] {
            Some(Ordering::Greater)
        } else {
            None
        }
    }

    /// Position of the type in a linearization of the partial order.
    pub fn rank(&self, ty: TypeId) -> u32 {
        self.rank.get(ty.index()).copied().unwrap_or(UNRANKED)
    }

    pub fn is_empty(&self) -> bool {
        self.system.is_none()
    }

    /// Reject priorities built for another type system.
    pub fn check(&self, ts: &TypeSystem) -> SelectResult<()> {
        match self.system {
            Some(system) if system != ts.id() => Err(SelectError::ForeignType {
                expected: ts.id(),
                found: system,
            }),
            _ => Ok(()),
        }
    }
}

/// Total order over annotations of one store: span order, then type
/// priority rank, then insertion sequence.
///
/// Two distinct annotations never compare equal, so every merged ordering
/// is deterministic.
#[derive(Debug, Clone, Copy)]
pub struct AnnotationOrder<'a> {
    priorities: &'a TypePriorities,
}

impl<'a> AnnotationOrder<'a> {
    pub fn new(priorities: &'a TypePriorities) -> Self {
        Self { priorities }
    }

    pub fn compare<P>(&self, a: &Annotation<P>, b: &Annotation<P>) -> Ordering {
        self.key(a.span(), a.type_id(), a.id().seq())
            .cmp(&self.key(b.span(), b.type_id(), b.id().seq()))
    }

    /// Sort key equivalent to [`compare`](Self::compare).
    pub fn key(&self, span: Span, type_id: TypeId, seq: usize) -> (Span, u32, usize) {
        (span, self.priorities.rank(type_id), seq)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TypeSystem {
        TypeSystem::builder()
            .add_type("Sentence")
            .add_type("Token")
            .add_type("AnalyzedText")
            .add_subtype("Lemma", "Token")
            .build()
            .unwrap()
    }

    #[test]
    fn test_single_list() {
        let ts = sample();
        let p = TypePriorities::from_names(&ts, &["Sentence", "Token"]).unwrap();
        let sentence = ts.type_named("Sentence").unwrap();
        let token = ts.type_named("Token").unwrap();
        let analyzed = ts.type_named("AnalyzedText").unwrap();

        assert_eq!(p.compare(sentence, token), Some(Ordering::Less));
        assert_eq!(p.compare(token, sentence), Some(Ordering::Greater));
        assert_eq!(p.compare(token, analyzed), None);
        assert!(p.rank(sentence) < p.rank(token));
        assert_eq!(p.rank(analyzed), UNRANKED);
    }

    #[test]
    fn test_subtype_inherits_position() {
        let ts = sample();
        let p = TypePriorities::from_names(&ts, &["Sentence", "Token"]).unwrap();
        let sentence = ts.type_named("Sentence").unwrap();
        let token = ts.type_named("Token").unwrap();
        let lemma = ts.type_named("Lemma").unwrap();

        assert_eq!(p.compare(sentence, lemma), Some(Ordering::Less));
        assert_eq!(p.rank(lemma), p.rank(token));
        // Same effective position, different types
        assert_eq!(p.compare(token, lemma), None);
    }

    #[test]
    fn test_merged_lists_are_transitive() {
        let ts = sample();
        let p = TypePriorities::from_lists(
            &ts,
            &[&["Sentence", "Token"], &["Token", "AnalyzedText"]],
        )
        .unwrap();
        let sentence = ts.type_named("Sentence").unwrap();
        let analyzed = ts.type_named("AnalyzedText").unwrap();
        assert_eq!(p.compare(sentence, analyzed), Some(Ordering::Less));
    }

    #[test]
    fn test_cycle_rejected() {
        let ts = sample();
        let result = TypePriorities::from_lists(
            &ts,
            &[&["Sentence", "Token"], &["Token", "AnalyzedText"], &["AnalyzedText", "Sentence"]],
        );
        assert!(matches!(result, Err(SelectError::PriorityCycle(_))));
    }

    #[test]
    fn test_unknown_name_rejected() {
        let ts = sample();
        assert_eq!(
            TypePriorities::from_names(&ts, &["Sentence", "Paragraph"]).unwrap_err(),
            SelectError::UnknownType("Paragraph".into())
        );
    }

    #[test]
    fn test_none_is_unordered() {
        let ts = sample();
        let p = TypePriorities::none();
        let sentence = ts.type_named("Sentence").unwrap();
        let token = ts.type_named("Token").unwrap();
        assert!(p.is_empty());
        assert_eq!(p.compare(sentence, token), None);
        assert_eq!(p.rank(sentence), p.rank(token));
        assert!(p.check(&ts).is_ok());
    }
}
