use std::sync::Arc;

use crate::{
    AnnotationStore, SelectConfig, SelectError, Span, TokenBuilder, TypeId, TypePriorities,
    TypeSystem,
};

fn sample_types() -> Arc<TypeSystem> {
    Arc::new(
        TypeSystem::builder()
            .add_type("Token")
            .add_type("Sentence")
            .add_type("AnalyzedText")
            .add_subtype("Lemma", "Token")
            .build()
            .unwrap(),
    )
}

fn tokenized(text: &str) -> (AnnotationStore, TypeId, TypeId) {
    let ts = sample_types();
    let token = ts.type_named("Token").unwrap();
    let sentence = ts.type_named("Sentence").unwrap();
    let mut store = AnnotationStore::new(ts);
    TokenBuilder::new(token, sentence)
        .build_tokens(&mut store, text)
        .unwrap();
    (store, token, sentence)
}

#[test]
fn covered_tokens_per_sentence() {
    let (mut store, token, sentence) =
        tokenized("Will you come home today ? \n No , tomorrow !");

    let sentences: Vec<_> = store.select(sentence).unwrap().map(|s| s.id()).collect();
    assert_eq!(sentences.len(), 2);

    let first = store.get(sentences[0]).unwrap();
    let second = store.get(sentences[1]).unwrap();
    let first_tokens = store.select_covered_by(token, first).unwrap();
    assert_eq!(
        store.texts(first_tokens.iter().copied()),
        vec!["Will", "you", "come", "home", "today", "?"]
    );
    assert_eq!(
        store.texts(store.select_covered_by(token, second).unwrap()),
        vec!["No", ",", "tomorrow", "!"]
    );
    assert!(store.contains(first, token).unwrap());

    let doomed: Vec<_> = first_tokens.iter().map(|t| t.id()).collect();
    for id in doomed {
        store.remove(id).unwrap();
    }
    let first = store.get(sentences[0]).unwrap();
    assert!(!store.contains(first, token).unwrap());
    assert_eq!(store.select(token).unwrap().count(), 4);
}

#[test]
fn select_by_index_from_both_ends() {
    let (store, token, _) = tokenized("Rot wood cheeses dew?");
    let text_at = |i: isize| {
        store
            .select_by_index(token, i)
            .unwrap()
            .and_then(|a| store.covered_text(a))
    };

    assert_eq!(text_at(-1), Some("dew?"));
    assert_eq!(text_at(3), Some("dew?"));
    assert_eq!(text_at(0), Some("Rot"));
    assert_eq!(text_at(-4), Some("Rot"));
    assert_eq!(text_at(-5), None);
    assert_eq!(text_at(4), None);
}

#[test]
fn exists_and_select_single() {
    let ts = sample_types();
    let token = ts.type_named("Token").unwrap();
    let mut store: AnnotationStore = AnnotationStore::new(ts);

    assert!(!store.exists(token).unwrap());
    assert!(matches!(
        store.select_single(token),
        Err(SelectError::NotFound { .. })
    ));

    let only = store.add(token, Span::new(0, 3), ()).unwrap();
    assert!(store.exists(token).unwrap());
    assert_eq!(store.select_single(token).unwrap().id(), only);

    store.add(token, Span::new(4, 8), ()).unwrap();
    assert_eq!(
        store.select_single(token).unwrap_err(),
        SelectError::AmbiguousSelection {
            type_name: "Token".into(),
            count: 2
        }
    );
}

#[test]
fn between_overlapping_boundaries_is_empty() {
    let ts = sample_types();
    let token = ts.type_named("Token").unwrap();
    let sentence = ts.type_named("Sentence").unwrap();
    let mut store: AnnotationStore = AnnotationStore::new(ts);
    let t1 = store.add(token, Span::new(45, 57), ()).unwrap();
    let t2 = store.add(token, Span::point(52), ()).unwrap();
    store.add(sentence, Span::point(52), ()).unwrap();

    let t1 = store.get(t1).unwrap();
    let t2 = store.get(t2).unwrap();
    assert!(store.select_between(sentence, t1, t2).unwrap().is_empty());
    assert!(store.select_between(sentence, t2, t1).unwrap().is_empty());
}

#[test]
fn between_tokens_in_either_order() {
    let (store, token, _) = tokenized("one two three four");
    let one = store.select_by_index(token, 0).unwrap().unwrap();
    let four = store.select_by_index(token, -1).unwrap().unwrap();

    let inner = store.select_between(token, one, four).unwrap();
    assert_eq!(store.texts(inner.iter().copied()), vec!["two", "three"]);
    assert_eq!(store.select_between(token, four, one).unwrap(), inner);

    let two = store.select_by_index(token, 1).unwrap().unwrap();
    let three = store.select_by_index(token, 2).unwrap().unwrap();
    assert!(store.select_between(token, two, three).unwrap().is_empty());
}

#[test]
fn selecting_a_type_includes_subtypes() {
    let ts = sample_types();
    let token = ts.type_named("Token").unwrap();
    let lemma = ts.type_named("Lemma").unwrap();
    let sentence = ts.type_named("Sentence").unwrap();
    let mut store: AnnotationStore = AnnotationStore::new(ts);
    store.add(token, Span::new(0, 3), ()).unwrap();
    store.add(lemma, Span::new(4, 8), ()).unwrap();
    store.add(sentence, Span::new(0, 8), ()).unwrap();

    let covered = store.select_covered(token, Span::new(0, 8)).unwrap();
    assert_eq!(covered.len(), 2);
    assert_eq!(covered[1].type_id(), lemma);
    assert_eq!(store.select_covered(lemma, Span::new(0, 8)).unwrap().len(), 1);

    let root = store.type_system().annotation_type();
    assert_eq!(store.select(root).unwrap().count(), 3);
    assert_eq!(store.select_covering(root, Span::new(5, 6)).unwrap().len(), 2);
}

#[test]
fn priorities_order_coinciding_spans() {
    let ts = sample_types();
    let token = ts.type_named("Token").unwrap();
    let sentence = ts.type_named("Sentence").unwrap();
    let root = ts.annotation_type();

    let priorities = TypePriorities::from_names(&ts, &["Sentence", "Token"]).unwrap();
    let mut ordered: AnnotationStore = AnnotationStore::new(ts.clone())
        .with_priorities(priorities)
        .unwrap();
    let mut plain: AnnotationStore = AnnotationStore::new(ts);
    for store in [&mut ordered, &mut plain] {
        store.add(token, Span::new(0, 4), ()).unwrap();
        store.add(sentence, Span::new(0, 4), ()).unwrap();
    }

    let names = |store: &AnnotationStore| -> Vec<String> {
        store
            .select_at(root, Span::new(0, 4))
            .unwrap()
            .iter()
            .map(|a| store.type_system().name(a.type_id()).to_string())
            .collect()
    };
    assert_eq!(names(&ordered), vec!["Sentence", "Token"]);
    assert_eq!(names(&plain), vec!["Token", "Sentence"]);
    assert!(matches!(
        ordered.select_single_at(root, Span::new(0, 4)),
        Err(SelectError::AmbiguousSelection { count: 2, .. })
    ));
}

#[test]
fn priorities_from_another_type_system_rejected() {
    let ts = sample_types();
    let other = sample_types();
    let priorities = TypePriorities::from_names(&other, &["Sentence", "Token"]).unwrap();
    let store: crate::SelectResult<AnnotationStore> =
        AnnotationStore::new(ts).with_priorities(priorities);
    assert!(matches!(store, Err(SelectError::ForeignType { .. })));
}

#[test]
fn covering_scan_strategies_agree() {
    let ts = sample_types();
    let token = ts.type_named("Token").unwrap();
    let spans = [(3, 16), (37, 61), (49, 75), (54, 58), (66, 84), (0, 90), (50, 51)];

    let mut bounded: AnnotationStore = AnnotationStore::new(ts.clone());
    let mut full: AnnotationStore =
        AnnotationStore::new(ts).with_config(SelectConfig::full_scan());
    for store in [&mut bounded, &mut full] {
        for &(b, e) in &spans {
            store.add(token, Span::new(b, e), ()).unwrap();
        }
    }

    for query in [Span::new(36, 52), Span::new(37, 52), Span::new(49, 52), Span::point(50), Span::new(70, 80)] {
        let a: Vec<_> = bounded.select_covering(token, query).unwrap().iter().map(|a| a.span()).collect();
        let b: Vec<_> = full.select_covering(token, query).unwrap().iter().map(|a| a.span()).collect();
        assert_eq!(a, b, "covering {}", query);
    }

    let spans_of = |q| -> Vec<Span> {
        bounded.select_covering(token, q).unwrap().iter().map(|a| a.span()).collect()
    };
    assert_eq!(spans_of(Span::new(36, 52)), vec![Span::new(0, 90)]);
    assert_eq!(spans_of(Span::new(49, 52)), vec![Span::new(0, 90), Span::new(37, 61), Span::new(49, 75)]);
}

#[test]
fn covering_of_excludes_the_annotation() {
    let (store, token, sentence) = tokenized("Rot wood");
    let wood = store.select_by_index(token, 1).unwrap().unwrap();
    let root = store.type_system().annotation_type();

    let covering = store.select_covering_of(root, wood).unwrap();
    assert_eq!(covering.len(), 1);
    assert_eq!(covering[0].type_id(), sentence);
    assert_eq!(store.select_covering(root, wood.span()).unwrap().len(), 2);
}

#[test]
fn single_at_requires_exactly_one() {
    let ts = sample_types();
    let token = ts.type_named("Token").unwrap();
    let mut store: AnnotationStore = AnnotationStore::new(ts);
    for (b, e) in [(0, 1), (2, 3), (2, 5), (4, 5), (4, 5), (4, 7), (6, 7), (8, 9)] {
        store.add(token, Span::new(b, e), ()).unwrap();
    }

    assert_eq!(store.select_at(token, Span::new(4, 5)).unwrap().len(), 2);
    assert!(store.select_single_at(token, Span::new(4, 5)).is_err());
    assert!(store.select_single_at(token, Span::new(1, 4)).is_err());
    assert_eq!(
        store.select_single_at(token, Span::new(2, 3)).unwrap().span(),
        Span::new(2, 3)
    );
}

#[test]
fn unknown_type_from_other_system() {
    let (store, _, _) = tokenized("Rot wood");
    let other = sample_types();
    let foreign = other.type_named("Token").unwrap();
    assert!(matches!(
        store.select_covered(foreign, Span::new(0, 8)),
        Err(SelectError::ForeignType { .. })
    ));
    assert_eq!(
        store.type_system().type_named("Paragraph").unwrap_err(),
        SelectError::UnknownType("Paragraph".into())
    );
}
