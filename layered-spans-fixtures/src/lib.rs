#![doc(
    html_logo_url = "https://raw.githubusercontent.com/storyscript/layered-nlp/main/assets/layered-nlp.svg",
    issue_tracker_base_url = "https://github.com/storyscript/layered-nlp/issues/"
)]

//! Fixture-driven testing for layered-spans.
//!
//! Test cases are declared in `.toml` files: a type system, a text, named
//! annotations and queries with their expected results. The runner builds
//! an [`layered_spans::AnnotationStore`] per fixture, runs each query and
//! cross-checks positional queries against the brute-force oracles.
//!
//! ## Modules
//!
//! - [`fixture`] - Fixture file format
//! - [`loader`] - Fixture file loading
//! - [`runner`] - Store building and query execution
//! - [`failures`] - Expected failures tracking via TOML
//! - [`errors`] - Error types

pub mod errors;
pub mod failures;
pub mod fixture;
pub mod loader;
pub mod runner;

pub use errors::{FixtureError, FixtureResult};
pub use failures::{run_harness, ExpectedFailures, FailureEntry, FailureState, HarnessResult};
pub use fixture::{AnnotationDef, QueryDef, QueryOp, SpanFixture, TokenizeDef, TypeDef};
pub use loader::{load_all_fixtures, load_fixture, parse_fixture};
pub use runner::{build_store, error_kind, run_fixture, FixtureReport, FixtureStore, QueryOutcome};
