use crate::{AnnotationStore, SelectResult, Span, TypeId};
use std::fmt::Write;
use unicode_width::UnicodeWidthStr;

/// Internal representation of an included annotation for display.
struct IncludedAnnotation {
    span: Span,
    label: String,
}

/// Renders the store text with one underline per included annotation.
///
/// ```text
/// Rot wood
/// ╰─╯Token
///     ╰──╯Token
/// ╰──────╯Sentence
/// ```
pub struct StoreDisplay<'a, P = ()> {
    store: &'a AnnotationStore<P>,
    include_annotations: Vec<IncludedAnnotation>,
}

/// Control characters would break the single text line.
fn display_text(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect()
}

/// Display column of a byte offset into the store text.
fn column(text: &str, pos: usize) -> usize {
    match text.get(..pos) {
        Some(prefix) => UnicodeWidthStr::width(display_text(prefix).as_str()),
        None if pos > text.len() => {
            UnicodeWidthStr::width(display_text(text).as_str()) + (pos - text.len())
        }
        // Inside a multi-byte character: round down to its start.
        None => column(text, (0..pos).rev().find(|&p| text.is_char_boundary(p)).unwrap_or(0)),
    }
}

impl<'a, P> std::fmt::Display for StoreDisplay<'a, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = self.store.text();
        f.write_str(&display_text(text))?;

        for included in self.include_annotations.iter() {
            f.write_char('\n')?;

            let start_char_idx = column(text, included.span.begin);
            for _ in 0..start_char_idx {
                f.write_char(' ')?;
            }

            f.write_char('╰')?;

            let end_char_idx = column(text, included.span.end).max(start_char_idx);
            let char_len = end_char_idx - start_char_idx;
            for _ in (start_char_idx + 1)..end_char_idx.saturating_sub(1) {
                f.write_char('─')?;
            }

            if char_len > 1 {
                f.write_char('╯')?;
            }

            f.write_str(&included.label)?;
        }

        Ok(())
    }
}

impl<'a, P> StoreDisplay<'a, P> {
    pub fn new(store: &'a AnnotationStore<P>) -> Self {
        StoreDisplay {
            store,
            include_annotations: Vec::new(),
        }
    }

    /// Include every annotation of a type (and its subtypes), labelled with
    /// its type name.
    pub fn include(&mut self, type_id: TypeId) -> SelectResult<()> {
        let store = self.store;
        let ts = store.type_system();
        for annotation in store.select(type_id)? {
            self.include_annotations.push(IncludedAnnotation {
                span: annotation.span(),
                label: ts.name(annotation.type_id()).to_string(),
            });
        }
        Ok(())
    }

    /// Takes self
    pub fn with(mut self, type_id: TypeId) -> SelectResult<Self> {
        self.include(type_id)?;
        Ok(self)
    }
}

impl<'a, P: std::fmt::Debug> StoreDisplay<'a, P> {
    /// Like [`include`](Self::include), with the payload's debug output
    /// after the type name.
    pub fn include_payloads(&mut self, type_id: TypeId) -> SelectResult<()> {
        let store = self.store;
        let ts = store.type_system();
        for annotation in store.select(type_id)? {
            self.include_annotations.push(IncludedAnnotation {
                span: annotation.span(),
                label: format!("{}({:?})", ts.name(annotation.type_id()), annotation.payload()),
            });
        }
        Ok(())
    }

    /// Takes self, includes payloads
    pub fn with_payloads(mut self, type_id: TypeId) -> SelectResult<Self> {
        self.include_payloads(type_id)?;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{TokenBuilder, TypeSystem};
    use std::sync::Arc;

    fn sample() -> (AnnotationStore, TypeId, TypeId) {
        let ts = Arc::new(TypeSystem::with_types(&["Token", "Sentence"]).unwrap());
        let token = ts.type_named("Token").unwrap();
        let sentence = ts.type_named("Sentence").unwrap();
        let mut store = AnnotationStore::new(ts);
        TokenBuilder::new(token, sentence)
            .build_tokens(&mut store, "Rot wood")
            .unwrap();
        (store, token, sentence)
    }

    #[test]
    fn test_tokens_and_sentence() {
        let (store, token, sentence) = sample();
        let display = StoreDisplay::new(&store)
            .with(token)
            .unwrap()
            .with(sentence)
            .unwrap();

        insta::assert_snapshot!(display, @r###"
        Rot wood
        ╰─╯Token
            ╰──╯Token
        ╰──────╯Sentence
        "###);
    }

    #[test]
    fn test_supertype_includes_all() {
        let (store, _, _) = sample();
        let root = store.type_system().annotation_type();
        let display = StoreDisplay::new(&store).with(root).unwrap();

        insta::assert_snapshot!(display, @r###"
        Rot wood
        ╰──────╯Sentence
        ╰─╯Token
            ╰──╯Token
        "###);
    }

    #[test]
    fn test_payloads_and_points() {
        let ts = Arc::new(TypeSystem::with_types(&["Mark"]).unwrap());
        let mark = ts.type_named("Mark").unwrap();
        let mut store = AnnotationStore::new(ts).with_text("a\tb");
        store.add(mark, Span::point(1), 'x').unwrap();
        store.add(mark, Span::new(2, 3), 'y').unwrap();

        let display = StoreDisplay::new(&store).with_payloads(mark).unwrap();

        insta::assert_snapshot!(display, @r###"
        a b
         ╰Mark('x')
          ╰Mark('y')
        "###);
    }
}
