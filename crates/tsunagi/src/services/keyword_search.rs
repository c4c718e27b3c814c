//! Keyword Search
//!
//! Best-effort substring search over the lines of one file. An optional
//! fast-path backend is tried first; any backend error falls back to an
//! in-process scan that always works.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use tokio::fs;

use crate::adapters::RipgrepBackend;
use crate::config::SearchConfig;
use crate::domain::errors::DomainError;
use crate::ports::{SearchBackend, SearchOptions, SearchResult};

/// Line search with a pluggable fast path
#[derive(Clone, Default)]
pub struct KeywordSearch {
    backend: Option<Arc<dyn SearchBackend>>,
}

impl KeywordSearch {
    /// In-process scanning only
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_backend(backend: Arc<dyn SearchBackend>) -> Self {
        Self {
            backend: Some(backend),
        }
    }

    /// Ripgrep fast path when enabled, plain scanning otherwise
    pub fn from_config(config: &SearchConfig) -> Self {
        if config.fast_path {
            Self::with_backend(Arc::new(RipgrepBackend::with_binary(&config.ripgrep_bin)))
        } else {
            Self::new()
        }
    }

    pub fn backend_name(&self) -> Option<&str> {
        self.backend.as_deref().map(|backend| backend.name())
    }

    /// Lines of `path` containing `query`, capped by `options`.
    ///
    /// A missing file yields no results.
    pub async fn search_in_file(
        &self,
        path: &Path,
        query: &str,
        options: &SearchOptions,
    ) -> Result<Vec<SearchResult>, DomainError> {
        let results = self
            .search_uncapped(path, query, options.case_insensitive)
            .await?;
        Ok(apply_caps(results, options))
    }

    /// OR across `keywords`: merged, one result per line, ascending by line
    /// number, then capped.
    pub async fn search_multiple_keywords(
        &self,
        path: &Path,
        keywords: &[String],
        options: &SearchOptions,
    ) -> Result<Vec<SearchResult>, DomainError> {
        let mut merged: BTreeMap<usize, SearchResult> = BTreeMap::new();
        for keyword in keywords {
            for result in self
                .search_uncapped(path, keyword, options.case_insensitive)
                .await?
            {
                merged.entry(result.line_number).or_insert(result);
            }
        }
        Ok(apply_caps(merged.into_values().collect(), options))
    }

    async fn search_uncapped(
        &self,
        path: &Path,
        query: &str,
        case_insensitive: bool,
    ) -> Result<Vec<SearchResult>, DomainError> {
        if query.is_empty() {
            return Ok(Vec::new());
        }
        match fs::metadata(path).await {
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        }

        if let Some(backend) = &self.backend {
            match backend.search(path, query, case_insensitive).await {
                Ok(results) => return Ok(results),
                Err(e) => {
                    tracing::debug!(
                        backend = backend.name(),
                        error = %e,
                        "Search fast path failed, scanning in process"
                    );
                }
            }
        }

        let content = match fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        Ok(scan_lines(&content, query, case_insensitive))
    }
}

/// Scan every line of `content` for `query`
pub fn scan_lines(content: &str, query: &str, case_insensitive: bool) -> Vec<SearchResult> {
    content
        .lines()
        .enumerate()
        .filter_map(|(index, line)| {
            find_match(line, query, case_insensitive).map(|matched| SearchResult {
                line_number: index + 1,
                content: line.to_string(),
                matched_text: matched.to_string(),
            })
        })
        .collect()
}

/// The first occurrence of `query` in `line`, as written in `line`
pub fn find_match<'a>(line: &'a str, query: &str, case_insensitive: bool) -> Option<&'a str> {
    if query.is_empty() {
        return None;
    }
    if !case_insensitive {
        return line
            .find(query)
            .map(|start| &line[start..start + query.len()]);
    }

    let needle: Vec<char> = query.chars().flat_map(char::to_lowercase).collect();
    for (start, _) in line.char_indices() {
        let mut matched = 0;
        let mut end = start;
        'chars: for (offset, ch) in line[start..].char_indices() {
            if matched == needle.len() {
                break;
            }
            for lower in ch.to_lowercase() {
                if matched < needle.len() && needle[matched] == lower {
                    matched += 1;
                } else {
                    break 'chars;
                }
            }
            end = start + offset + ch.len_utf8();
        }
        if matched == needle.len() {
            return Some(&line[start..end]);
        }
    }
    None
}

/// Stop at whichever cap is hit first; a result that would overrun the
/// character budget ends the list.
fn apply_caps(results: Vec<SearchResult>, options: &SearchOptions) -> Vec<SearchResult> {
    let mut capped = Vec::new();
    let mut chars = 0usize;
    for result in results {
        if capped.len() >= options.max_results {
            break;
        }
        let len = result.content.chars().count();
        if chars + len > options.max_chars {
            break;
        }
        chars += len;
        capped.push(result);
    }
    capped
}
