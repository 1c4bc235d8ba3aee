//! Core types for `.toml` query fixtures.
//!
//! A fixture declares a type system, a text, annotations with named ids and
//! a list of queries with their expected results:
//!
//! ```toml
//! title = "Covering tokens"
//! types = [{ name = "Token" }]
//!
//! [[annotations]]
//! id = "a"
//! type = "Token"
//! span = [3, 16]
//!
//! [[queries]]
//! op = "covering"
//! type = "Token"
//! span = [4, 5]
//! expect = ["a"]
//! ```

use layered_spans::CoveringScan;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpanFixture {
    #[serde(default)]
    pub title: Option<String>,
    /// Document text; annotation spans are byte offsets into it.
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub types: Vec<TypeDef>,
    /// Priority lists, earlier types first.
    #[serde(default)]
    pub priorities: Vec<Vec<String>>,
    #[serde(default)]
    pub covering_scan: Option<CoveringScan>,
    /// Whitespace tokens and line sentences generated from `text`.
    #[serde(default)]
    pub tokenize: Option<TokenizeDef>,
    #[serde(default)]
    pub annotations: Vec<AnnotationDef>,
    #[serde(default)]
    pub queries: Vec<QueryDef>,
}

/// A declared type; without a supertype it derives from the root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeDef {
    pub name: String,
    #[serde(default)]
    pub supertype: Option<String>,
}

/// Generated tokens get ids `token0`, `token1`, ... and sentences
/// `sentence0`, `sentence1`, ... in text order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenizeDef {
    pub token: String,
    #[serde(default)]
    pub sentence: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotationDef {
    pub id: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub span: [usize; 2],
}

/// Query operations a fixture can run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum QueryOp {
    Select,
    ByIndex,
    Single,
    Exists,
    Covered,
    CoveredBy,
    Contains,
    Covering,
    CoveringOf,
    Between,
    At,
    SingleAt,
    Preceding,
    Following,
    SingleRelative,
    IndexCovered,
    IndexCovering,
}

/// One query and its expectation.
///
/// Exactly one of `expect`, `holds`, `expect_index` or `error` should be
/// set, matching the kind of result the operation returns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryDef {
    #[serde(default)]
    pub name: Option<String>,
    pub op: QueryOp,
    #[serde(rename = "type")]
    pub type_name: String,
    /// Second type of a batch index: targets for `index_covered`,
    /// containers for `index_covering`.
    #[serde(default)]
    pub other_type: Option<String>,
    #[serde(default)]
    pub span: Option<[usize; 2]>,
    /// Annotation id the query is relative to.
    #[serde(default)]
    pub reference: Option<String>,
    /// Second boundary of `between`.
    #[serde(default)]
    pub other: Option<String>,
    #[serde(default)]
    pub count: Option<usize>,
    #[serde(default)]
    pub offset: Option<isize>,
    #[serde(default)]
    pub index: Option<isize>,
    /// Expected annotation ids, in index order.
    #[serde(default)]
    pub expect: Option<Vec<String>>,
    /// Expected answer of `exists` and `contains`.
    #[serde(default)]
    pub holds: Option<bool>,
    /// Expected batch index: key id to value ids.
    #[serde(default)]
    pub expect_index: Option<BTreeMap<String, Vec<String>>>,
    /// Expected error kind, e.g. `"NotFound"`.
    #[serde(default)]
    pub error: Option<String>,
}

impl QueryDef {
    /// Name used in reports: the explicit name or the query position.
    pub fn label(&self, position: usize) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("#{} {:?}", position, self.op),
        }
    }
}
