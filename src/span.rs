//! The span value type and the positional order used everywhere.

use crate::{SelectError, SelectResult};
use std::cmp::Ordering;

/// A half-open range of text offsets.
///
/// Zero-width spans (`begin == end`) are legal. They mark a position and
/// are covered by any span that encloses that position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "RawSpan")]
pub struct Span {
    pub begin: usize,
    pub end: usize,
}

/// Unchecked serde form of [`Span`].
#[derive(serde::Deserialize)]
struct RawSpan {
    begin: usize,
    end: usize,
}

impl TryFrom<RawSpan> for Span {
    type Error = SelectError;

    fn try_from(raw: RawSpan) -> SelectResult<Self> {
        Span::try_new(raw.begin, raw.end)
    }
}

impl Span {
    /// Create a span.
    ///
    /// # Panics
    /// Panics if `end < begin`. Use [`Span::try_new`] for untrusted input.
    pub fn new(begin: usize, end: usize) -> Self {
        assert!(begin <= end, "span end {} before begin {}", end, begin);
        Self { begin, end }
    }

    /// Create a span, rejecting inverted bounds.
    pub fn try_new(begin: usize, end: usize) -> SelectResult<Self> {
        if begin <= end {
            Ok(Self { begin, end })
        } else {
            Err(SelectError::InvalidSpan { begin, end })
        }
    }

    /// A zero-width span at `pos`.
    pub fn point(pos: usize) -> Self {
        Self { begin: pos, end: pos }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.begin)
    }

    /// True for zero-width spans.
    pub fn is_empty(&self) -> bool {
        self.begin == self.end
    }

    /// `other` lies within this span (boundaries included).
    pub fn contains(&self, other: &Span) -> bool {
        self.begin <= other.begin && other.end <= self.end
    }

    /// The two spans share at least one position.
    ///
    /// A zero-width span shares its position with a span that strictly
    /// encloses it, so `[52, 52)` overlaps `[45, 57)` but not `[45, 52)`.
    pub fn overlaps(&self, other: &Span) -> bool {
        self.begin < other.end && other.begin < self.end
    }

    /// This span ends at or before `other` begins.
    pub fn ends_before(&self, other: &Span) -> bool {
        self.end <= other.begin
    }

    /// This span begins at or after `other` ends.
    pub fn starts_after(&self, other: &Span) -> bool {
        self.begin >= other.end
    }
}

/// Index order: ascending begin, then descending end (longer spans first).
impl Ord for Span {
    fn cmp(&self, other: &Self) -> Ordering {
        self.begin
            .cmp(&other.begin)
            .then_with(|| other.end.cmp(&self.end))
    }
}

impl PartialOrd for Span {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}..{})", self.begin, self.end)
    }
}

impl TryFrom<(usize, usize)> for Span {
    type Error = SelectError;

    fn try_from((begin, end): (usize, usize)) -> SelectResult<Self> {
        Span::try_new(begin, end)
    }
}
