//! Ripgrep Search Backend
//!
//! Fast path for keyword search using the `rg` binary.

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use crate::domain::errors::DomainError;
use crate::ports::{SearchBackend, SearchResult};
use crate::services::keyword_search::find_match;

/// Ripgrep implementation of SearchBackend
#[derive(Debug, Clone)]
pub struct RipgrepBackend {
    binary: String,
}

impl RipgrepBackend {
    pub fn new() -> Self {
        Self::with_binary("rg")
    }

    pub fn with_binary(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl Default for RipgrepBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SearchBackend for RipgrepBackend {
    fn name(&self) -> &str {
        "ripgrep"
    }

    async fn search(
        &self,
        path: &Path,
        query: &str,
        case_insensitive: bool,
    ) -> Result<Vec<SearchResult>, DomainError> {
        let mut command = Command::new(&self.binary);
        command
            .arg("--no-config")
            .arg("--no-heading")
            .arg("--no-filename")
            .arg("--line-number")
            .arg("--color=never")
            .arg("--fixed-strings");
        if case_insensitive {
            command.arg("--ignore-case");
        }
        command
            .arg("--")
            .arg(query)
            .arg(path)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        let output = command
            .output()
            .await
            .map_err(|e| DomainError::ExternalService(format!("{} unavailable: {}", self.binary, e)))?;

        match output.status.code() {
            Some(0) => Ok(parse_output(
                &String::from_utf8_lossy(&output.stdout),
                query,
                case_insensitive,
            )),
            // no matches
            Some(1) => Ok(Vec::new()),
            _ => Err(DomainError::ExternalService(format!(
                "{} failed ({}): {}",
                self.binary,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ))),
        }
    }
}

/// Parse `<line>:<content>` records
fn parse_output(stdout: &str, query: &str, case_insensitive: bool) -> Vec<SearchResult> {
    stdout
        .lines()
        .filter_map(|record| {
            let (number, content) = record.split_once(':')?;
            let line_number = number.parse().ok()?;
            let matched_text = find_match(content, query, case_insensitive)
                .unwrap_or(query)
                .to_string();
            Some(SearchResult {
                line_number,
                content: content.to_string(),
                matched_text,
            })
        })
        .collect()
}
