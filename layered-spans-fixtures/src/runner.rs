//! Runs fixture queries against an [`AnnotationStore`].
//!
//! Every positional query is also answered by the brute-force oracles in
//! [`layered_spans::naive`]; a disagreement fails the query even when the
//! expectation matches.

use crate::fixture::{QueryDef, QueryOp, SpanFixture};
use crate::{FixtureError, FixtureResult};
use layered_spans::{
    naive, Annotation, AnnotationId, AnnotationStore, CoverIndex, SelectConfig, SelectError, Span,
    TokenBuilder, TypeId, TypePriorities, TypeSystem,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// A store built from a fixture, with the fixture's annotation ids.
#[derive(Debug)]
pub struct FixtureStore {
    pub store: AnnotationStore,
    ids: HashMap<String, AnnotationId>,
    names: HashMap<AnnotationId, String>,
}

impl FixtureStore {
    fn register(&mut self, name: String, id: AnnotationId) -> FixtureResult<()> {
        if self.ids.contains_key(&name) {
            return Err(FixtureError::Invalid(format!("annotation id '{}' declared twice", name)));
        }
        self.names.insert(id, name.clone());
        self.ids.insert(name, id);
        Ok(())
    }

    /// The annotation declared under `name`.
    pub fn annotation(&self, name: &str) -> FixtureResult<&Annotation> {
        self.ids
            .get(name)
            .and_then(|&id| self.store.get(id))
            .ok_or_else(|| FixtureError::Invalid(format!("unknown annotation id '{}'", name)))
    }

    pub fn type_named(&self, name: &str) -> FixtureResult<TypeId> {
        Ok(self.store.type_system().type_named(name)?)
    }

    /// Fixture name of a handle.
    pub fn name_of(&self, id: AnnotationId) -> String {
        self.names
            .get(&id)
            .cloned()
            .unwrap_or_else(|| format!("#{}", id.seq()))
    }

    fn names_of(&self, ids: &[AnnotationId]) -> Vec<String> {
        ids.iter().map(|&id| self.name_of(id)).collect()
    }
}

/// Build the type system, store and annotations a fixture declares.
pub fn build_store(fixture: &SpanFixture) -> FixtureResult<FixtureStore> {
    let mut builder = TypeSystem::builder();
    for ty in &fixture.types {
        builder = match &ty.supertype {
            Some(supertype) => builder.add_subtype(ty.name.clone(), supertype.clone()),
            None => builder.add_type(ty.name.clone()),
        };
    }
    let ts = Arc::new(builder.build()?);

    let mut store = AnnotationStore::new(ts.clone()).with_config(SelectConfig {
        covering_scan: fixture.covering_scan.unwrap_or_default(),
    });
    if !fixture.priorities.is_empty() {
        store = store.with_priorities(TypePriorities::from_lists(&ts, &fixture.priorities)?)?;
    }
    store.set_text(fixture.text.as_str());

    let mut loaded = FixtureStore {
        store,
        ids: HashMap::new(),
        names: HashMap::new(),
    };

    if let Some(tokenize) = &fixture.tokenize {
        let token = ts.type_named(&tokenize.token)?;
        let builder = match &tokenize.sentence {
            Some(sentence) => TokenBuilder::new(token, ts.type_named(sentence)?),
            None => TokenBuilder::tokens_only(token),
        };
        let built = builder.build_tokens(&mut loaded.store, &fixture.text)?;
        for (i, id) in built.tokens.into_iter().enumerate() {
            loaded.register(format!("token{}", i), id)?;
        }
        for (i, id) in built.sentences.into_iter().enumerate() {
            loaded.register(format!("sentence{}", i), id)?;
        }
    }

    for annotation in &fixture.annotations {
        let ty = ts.type_named(&annotation.type_name)?;
        let [begin, end] = annotation.span;
        let id = loaded.store.add(ty, Span::try_new(begin, end)?, ())?;
        loaded.register(annotation.id.clone(), id)?;
    }

    Ok(loaded)
}

/// Result of one query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOutcome {
    pub label: String,
    /// `None` when the query passed.
    pub failure: Option<String>,
}

impl QueryOutcome {
    pub fn passed(&self) -> bool {
        self.failure.is_none()
    }
}

/// Results of all queries of one fixture.
#[derive(Debug, Clone, Default)]
pub struct FixtureReport {
    pub title: Option<String>,
    pub outcomes: Vec<QueryOutcome>,
}

impl FixtureReport {
    pub fn passed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.passed()).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &QueryOutcome> {
        self.outcomes.iter().filter(|o| !o.passed())
    }

    pub fn success(&self) -> bool {
        self.failures().next().is_none()
    }

    /// One line per failure under a pass/fail header.
    pub fn summary(&self, fixture_name: &str) -> String {
        let failed = self.outcomes.len() - self.passed();
        let status = if failed > 0 { "FAIL" } else { "PASS" };
        let mut output = format!(
            "{}: {}\n  {} passed, {} failed",
            status,
            fixture_name,
            self.passed(),
            failed
        );
        for outcome in self.failures() {
            output.push_str(&format!(
                "\n  {}: {}",
                outcome.label,
                outcome.failure.as_deref().unwrap_or_default()
            ));
        }
        output
    }
}

/// What a query returned.
#[derive(Debug)]
enum Actual {
    Ids(Vec<AnnotationId>),
    Holds(bool),
    Index(CoverIndex),
}

/// Build the store and run every query of a fixture.
pub fn run_fixture(fixture: &SpanFixture) -> FixtureResult<FixtureReport> {
    let loaded = build_store(fixture)?;
    let mut report = FixtureReport {
        title: fixture.title.clone(),
        outcomes: Vec::new(),
    };

    for (position, query) in fixture.queries.iter().enumerate() {
        let label = query.label(position);
        let failure = check_query(&loaded, query)?;
        if let Some(failure) = &failure {
            tracing::debug!(query = %label, %failure, "fixture query failed");
        }
        report.outcomes.push(QueryOutcome { label, failure });
    }

    tracing::debug!(
        title = fixture.title.as_deref().unwrap_or(""),
        passed = report.passed(),
        total = report.outcomes.len(),
        "ran fixture"
    );
    Ok(report)
}

/// Compare one query against its expectation. `Ok(None)` means it passed.
fn check_query(loaded: &FixtureStore, query: &QueryDef) -> FixtureResult<Option<String>> {
    let actual = execute(loaded, query)?;

    if let Ok(Actual::Ids(ids)) = &actual {
        if let Some(expected) = oracle(loaded, query)? {
            if &expected != ids {
                return Ok(Some(format!(
                    "indexed result {:?} disagrees with brute force {:?}",
                    loaded.names_of(ids),
                    loaded.names_of(&expected)
                )));
            }
        }
    }

    let failure = match (actual, query) {
        (Err(e), QueryDef { error: Some(kind), .. }) => {
            (error_kind(&e) != kind.as_str()).then(|| format!("expected {} error, got {}", kind, e))
        }
        (Ok(_), QueryDef { error: Some(kind), .. }) => Some(format!("expected {} error, got a result", kind)),
        (Err(e), _) => Some(format!("unexpected error: {}", e)),
        (Ok(Actual::Ids(ids)), QueryDef { expect: Some(expected), .. }) => {
            let names = loaded.names_of(&ids);
            (&names != expected).then(|| format!("expected {:?}, got {:?}", expected, names))
        }
        (Ok(Actual::Holds(holds)), QueryDef { holds: Some(expected), .. }) => {
            (holds != *expected).then(|| format!("expected {}, got {}", expected, holds))
        }
        (Ok(Actual::Index(index)), QueryDef { expect_index: Some(expected), .. }) => {
            let names: BTreeMap<String, Vec<String>> = index
                .iter()
                .map(|(key, values)| (loaded.name_of(key), loaded.names_of(values)))
                .collect();
            (&names != expected).then(|| format!("expected {:?}, got {:?}", expected, names))
        }
        (Ok(_), _) => Some("query has no matching expectation".to_string()),
    };
    Ok(failure)
}

/// Run the query. Fixture mistakes are the outer error, engine errors the
/// inner one.
fn execute(loaded: &FixtureStore, query: &QueryDef) -> FixtureResult<Result<Actual, SelectError>> {
    let store = &loaded.store;
    let ty = loaded.type_named(&query.type_name)?;
    let ids = |annotations: Vec<&Annotation>| Actual::Ids(annotations.iter().map(|a| a.id()).collect());

    let result = match query.op {
        QueryOp::Select => store.select(ty).map(|all| ids(all.collect())),
        QueryOp::ByIndex => {
            let index = required(query.index, "index")?;
            store.select_by_index(ty, index).map(|found| ids(found.into_iter().collect()))
        }
        QueryOp::Single => store.select_single(ty).map(|one| ids(vec![one])),
        QueryOp::Exists => store.exists(ty).map(Actual::Holds),
        QueryOp::Covered => store.select_covered(ty, span(query)?).map(ids),
        QueryOp::CoveredBy => store.select_covered_by(ty, reference(loaded, query)?).map(ids),
        QueryOp::Contains => store.contains(reference(loaded, query)?, ty).map(Actual::Holds),
        QueryOp::Covering => store.select_covering(ty, span(query)?).map(ids),
        QueryOp::CoveringOf => store.select_covering_of(ty, reference(loaded, query)?).map(ids),
        QueryOp::Between => {
            let other = loaded.annotation(required(query.other.as_deref(), "other")?)?;
            store.select_between(ty, reference(loaded, query)?, other).map(ids)
        }
        QueryOp::At => store.select_at(ty, span(query)?).map(ids),
        QueryOp::SingleAt => store.select_single_at(ty, span(query)?).map(|one| ids(vec![one])),
        QueryOp::Preceding => {
            let count = required(query.count, "count")?;
            let found = match &query.reference {
                Some(name) => store.select_preceding(ty, loaded.annotation(name)?, count),
                None => store.select_preceding_span(ty, span(query)?, count),
            };
            found.map(ids)
        }
        QueryOp::Following => {
            let count = required(query.count, "count")?;
            let found = match &query.reference {
                Some(name) => store.select_following(ty, loaded.annotation(name)?, count),
                None => store.select_following_span(ty, span(query)?, count),
            };
            found.map(ids)
        }
        QueryOp::SingleRelative => {
            let offset = required(query.offset, "offset")?;
            store
                .select_single_relative(ty, reference(loaded, query)?, offset)
                .map(|one| ids(vec![one]))
        }
        QueryOp::IndexCovered => {
            let other = loaded.type_named(required(query.other_type.as_deref(), "other_type")?)?;
            store.index_covered(ty, other).map(Actual::Index)
        }
        QueryOp::IndexCovering => {
            let other = loaded.type_named(required(query.other_type.as_deref(), "other_type")?)?;
            store.index_covering(ty, other).map(Actual::Index)
        }
    };
    Ok(result)
}

/// Brute-force answer for positional list queries.
fn oracle(loaded: &FixtureStore, query: &QueryDef) -> FixtureResult<Option<Vec<AnnotationId>>> {
    let store = &loaded.store;
    let ty = loaded.type_named(&query.type_name)?;
    let reference = match &query.reference {
        Some(name) => Some(loaded.annotation(name)?),
        None => None,
    };

    let found = match query.op {
        QueryOp::Covered => naive::covered(store, ty, span(query)?)?,
        QueryOp::Covering => naive::covering(store, ty, span(query)?)?,
        QueryOp::At => naive::at(store, ty, span(query)?)?,
        QueryOp::Between => {
            let other = loaded.annotation(required(query.other.as_deref(), "other")?)?;
            let left = required(reference, "reference")?;
            naive::between(store, ty, left.span(), other.span())?
        }
        QueryOp::Preceding | QueryOp::Following => {
            let count = required(query.count, "count")?;
            let (anchor, exclude) = match reference {
                Some(r) => (r.span(), Some(r.id())),
                None => (span(query)?, None),
            };
            if query.op == QueryOp::Preceding {
                naive::preceding(store, ty, anchor, exclude, count)?
            } else {
                naive::following(store, ty, anchor, exclude, count)?
            }
        }
        _ => return Ok(None),
    };
    Ok(Some(found.iter().map(|a| a.id()).collect()))
}

fn required<T>(value: Option<T>, field: &str) -> FixtureResult<T> {
    value.ok_or_else(|| FixtureError::Invalid(format!("query is missing '{}'", field)))
}

fn span(query: &QueryDef) -> FixtureResult<Span> {
    let [begin, end] = required(query.span, "span")?;
    Ok(Span::try_new(begin, end)?)
}

fn reference<'a>(loaded: &'a FixtureStore, query: &QueryDef) -> FixtureResult<&'a Annotation> {
    loaded.annotation(required(query.reference.as_deref(), "reference")?)
}

/// Variant name of an engine error, as written in fixtures.
pub fn error_kind(error: &SelectError) -> &'static str {
    match error {
        SelectError::AmbiguousSelection { .. } => "AmbiguousSelection",
        SelectError::NotFound { .. } => "NotFound",
        SelectError::InvalidBoundary { .. } => "InvalidBoundary",
        SelectError::InvalidSpan { .. } => "InvalidSpan",
        SelectError::ForeignAnnotation { .. } => "ForeignAnnotation",
        SelectError::ForeignType { .. } => "ForeignType",
        SelectError::UnknownType(_) => "UnknownType",
        SelectError::InvalidTypeSystem(_) => "InvalidTypeSystem",
        SelectError::PriorityCycle(_) => "PriorityCycle",
        SelectError::Config(_) => "Config",
    }
}
