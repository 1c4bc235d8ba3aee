//! Engine configuration.

use crate::{SelectError, SelectResult};
use serde::{Deserialize, Serialize};

/// How far back `select_covering` scans for candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoveringScan {
    /// Stop once no earlier annotation can reach the query end, using the
    /// longest annotation ever inserted for the type as the bound.
    MaxLength,
    /// Scan every candidate that begins at or before the query.
    Full,
}

impl Default for CoveringScan {
    fn default() -> Self {
        CoveringScan::MaxLength
    }
}

/// Configuration for an [`AnnotationStore`](crate::AnnotationStore).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectConfig {
    #[serde(default)]
    pub covering_scan: CoveringScan,
}

impl SelectConfig {
    /// Always scan the full candidate range for covering queries.
    pub fn full_scan() -> Self {
        Self {
            covering_scan: CoveringScan::Full,
        }
    }

    /// Parse a configuration from RON, e.g. `(covering_scan: Full)`.
    pub fn from_ron(source: &str) -> SelectResult<Self> {
        ron::from_str(source).map_err(|e| SelectError::Config(e.to_string()))
    }

    pub fn to_ron(&self) -> SelectResult<String> {
        ron::to_string(self).map_err(|e| SelectError::Config(e.to_string()))
    }
}
