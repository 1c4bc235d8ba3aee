//! Build token and sentence annotations from plain text.
//!
//! Tokens are whitespace-separated runs of text; each non-blank line becomes
//! one sentence. Offsets are byte offsets into the text.

use crate::{AnnotationId, AnnotationStore, SelectResult, Span, TypeId};
use unicode_segmentation::UnicodeSegmentation;

/// Handles created by [`TokenBuilder::build_tokens`], in text order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuiltTokens {
    pub tokens: Vec<AnnotationId>,
    pub sentences: Vec<AnnotationId>,
}

#[derive(Debug, Clone, Copy)]
pub struct TokenBuilder {
    token_type: TypeId,
    sentence_type: Option<TypeId>,
}

impl TokenBuilder {
    pub fn new(token_type: TypeId, sentence_type: TypeId) -> Self {
        Self {
            token_type,
            sentence_type: Some(sentence_type),
        }
    }

    /// Only create tokens.
    pub fn tokens_only(token_type: TypeId) -> Self {
        Self {
            token_type,
            sentence_type: None,
        }
    }

    /// Set the store text and annotate it.
    pub fn build_tokens<P: Default>(
        &self,
        store: &mut AnnotationStore<P>,
        text: &str,
    ) -> SelectResult<BuiltTokens> {
        store.set_text(text);
        let mut built = BuiltTokens::default();

        let mut line_start = 0;
        for line in text.split_inclusive('\n') {
            let spans = token_spans(line, line_start);
            for span in &spans {
                built.tokens.push(store.add(self.token_type, *span, P::default())?);
            }
            if let (Some(sentence_type), Some(first), Some(last)) =
                (self.sentence_type, spans.first(), spans.last())
            {
                let sentence = Span::new(first.begin, last.end);
                built.sentences.push(store.add(sentence_type, sentence, P::default())?);
            }
            line_start += line.len();
        }

        tracing::debug!(
            store = store.id(),
            tokens = built.tokens.len(),
            sentences = built.sentences.len(),
            "built tokens"
        );
        Ok(built)
    }
}

/// Whitespace-separated runs, joining adjacent word-boundary segments.
fn token_spans(line: &str, offset: usize) -> Vec<Span> {
    let mut spans: Vec<Span> = Vec::new();
    let mut open = false;
    for (start, segment) in line.split_word_bound_indices() {
        if segment.chars().all(char::is_whitespace) {
            open = false;
            continue;
        }
        let end = offset + start + segment.len();
        match spans.last_mut() {
            Some(last) if open => last.end = end,
            _ => spans.push(Span::new(offset + start, end)),
        }
        open = true;
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TypeSystem;
    use std::sync::Arc;

    #[test]
    fn test_token_spans() {
        let spans = token_spans("Rot wood, cheeses", 10);
        assert_eq!(
            spans,
            vec![Span::new(10, 13), Span::new(14, 19), Span::new(20, 27)]
        );
    }

    #[test]
    fn test_sentences_per_line() {
        let ts = Arc::new(TypeSystem::with_types(&["Token", "Sentence"]).unwrap());
        let token = ts.type_named("Token").unwrap();
        let sentence = ts.type_named("Sentence").unwrap();
        let mut store: AnnotationStore = AnnotationStore::new(ts);

        let built = TokenBuilder::new(token, sentence)
            .build_tokens(&mut store, "one two\n\n  three \n")
            .unwrap();
        assert_eq!(built.tokens.len(), 3);
        assert_eq!(built.sentences.len(), 2);

        let sentences: Vec<_> = store.resolve(&built.sentences).collect();
        assert_eq!(store.texts(sentences), vec!["one two", "three"]);
    }

    #[test]
    fn test_tokens_only() {
        let ts = Arc::new(TypeSystem::with_types(&["Token"]).unwrap());
        let token = ts.type_named("Token").unwrap();
        let mut store: AnnotationStore = AnnotationStore::new(ts);

        let built = TokenBuilder::tokens_only(token)
            .build_tokens(&mut store, "naïve café")
            .unwrap();
        assert!(built.sentences.is_empty());
        let texts = store.texts(store.resolve(&built.tokens));
        assert_eq!(texts, vec!["naïve", "café"]);
    }
}
