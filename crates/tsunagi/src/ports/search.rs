//! Search Backend Port
//!
//! Pluggable fast path for line search over a workspace file.

use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;

/// A matching line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// 1-based line number
    pub line_number: usize,
    pub content: String,
    /// The matched text as it appears in the line
    pub matched_text: String,
}

/// Caps and matching mode for a search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchOptions {
    pub max_results: usize,
    /// Cumulative budget over the `content` of returned lines
    pub max_chars: usize,
    pub case_insensitive: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            max_results: 50,
            max_chars: 8000,
            case_insensitive: true,
        }
    }
}

/// Fast-path line search (e.g. ripgrep)
///
/// Any error makes the caller fall back to an in-process scan, so
/// implementations need not be complete, only correct when they succeed.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    fn name(&self) -> &str;

    /// Return every line of `path` containing `query`, in line order.
    /// Caps are applied by the caller.
    async fn search(
        &self,
        path: &Path,
        query: &str,
        case_insensitive: bool,
    ) -> Result<Vec<SearchResult>, DomainError>;
}
