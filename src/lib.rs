#![doc(
    html_logo_url = "https://raw.githubusercontent.com/storyscript/layered-nlp/main/assets/layered-nlp.svg",
    issue_tracker_base_url = "https://github.com/storyscript/layered-nlp/issues/"
)]

//! Positional selection and indexing over typed annotation spans.
//!
//! An [`AnnotationStore`] holds a document text and annotations over it.
//! Each annotation has a [`Span`] of byte offsets, a type from a
//! [`TypeSystem`], and an opaque payload. Annotations are kept in index
//! order: begin ascending, end descending, then [`TypePriorities`], then
//! insertion order.
//!
//! ## Queries
//!
//! - [`AnnotationStore::select_covered`] - annotations within a span
//! - [`AnnotationStore::select_covering`] - annotations enclosing a span
//! - [`AnnotationStore::select_between`] - annotations in the gap between two others
//! - [`AnnotationStore::select_at`] - annotations with exactly a span
//! - [`AnnotationStore::select_preceding`] / [`AnnotationStore::select_following`] - nearest neighbours
//! - [`AnnotationStore::select_single_relative`] - the neighbour at an offset
//! - [`AnnotationStore::index_covered`] / [`AnnotationStore::index_covering`] - batch cover maps
//!
//! Selecting a type includes its subtypes.
//!
//! ## Example
//!
//! ```
//! use layered_spans::{AnnotationStore, TokenBuilder, TypeSystem};
//! use std::sync::Arc;
//!
//! let ts = Arc::new(TypeSystem::with_types(&["Token", "Sentence"]).unwrap());
//! let token = ts.type_named("Token").unwrap();
//! let sentence = ts.type_named("Sentence").unwrap();
//!
//! let mut store: AnnotationStore = AnnotationStore::new(ts);
//! TokenBuilder::new(token, sentence)
//!     .build_tokens(&mut store, "Rot wood cheeses dew?")
//!     .unwrap();
//!
//! let first = store.select_single(sentence).unwrap();
//! let tokens = store.select_covered_by(token, first).unwrap();
//! assert_eq!(store.texts(tokens), vec!["Rot", "wood", "cheeses", "dew?"]);
//! ```

mod batch;
mod config;
mod display;
mod error;
mod priority;
mod select;
mod span;
mod span_index;
mod store;
mod token_builder;
mod type_system;

pub mod naive;

pub use batch::CoverIndex;
pub use config::{CoveringScan, SelectConfig};
pub use display::StoreDisplay;
pub use error::{SelectError, SelectResult};
pub use priority::{AnnotationOrder, TypePriorities};
pub use span::Span;
pub use span_index::SpanIndex;
pub use store::{Annotation, AnnotationId, AnnotationStore};
pub use token_builder::{BuiltTokens, TokenBuilder};
pub use type_system::{TypeId, TypeSystem, TypeSystemBuilder, ANNOTATION_TYPE_NAME};

#[cfg(test)]
mod tests {
    mod batch;
    mod equivalence;
    mod relative;
    mod selection;
}
