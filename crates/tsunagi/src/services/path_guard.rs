//! Path boundary guard
//!
//! Lexical path checks. Symlinks are not resolved; `..` is folded before
//! comparing against the boundary.

use std::path::{Component, Path, PathBuf};

use crate::domain::errors::DomainError;

/// Fold `.` and `..` segments without touching the filesystem.
///
/// `..` at the root of an absolute path stays at the root; leading `..`
/// of a relative path is kept.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(prefix) => normalized.push(prefix.as_os_str()),
            Component::RootDir => normalized.push(Component::RootDir.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                let last = normalized.components().next_back();
                match last {
                    Some(Component::Normal(_)) => {
                        normalized.pop();
                    }
                    Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                    _ => normalized.push(".."),
                }
            }
            Component::Normal(segment) => normalized.push(segment),
        }
    }
    normalized
}

/// Absolute, normalized form of `path`, relative paths taken from the
/// current directory.
pub fn absolutize(path: &Path) -> Result<PathBuf, DomainError> {
    if path.is_absolute() {
        Ok(normalize_path(path))
    } else {
        let cwd = std::env::current_dir()?;
        Ok(normalize_path(&cwd.join(path)))
    }
}

/// Check that `target` resolves inside `boundary`.
///
/// Returns the absolute target on success. The boundary itself counts as
/// inside.
pub fn validate_within_boundary(target: &Path, boundary: &Path) -> Result<PathBuf, DomainError> {
    let target = absolutize(target)?;
    let boundary = absolutize(boundary)?;

    match target.strip_prefix(&boundary) {
        Ok(relative)
            if !relative
                .components()
                .any(|c| matches!(c, Component::ParentDir | Component::RootDir)) =>
        {
            Ok(target)
        }
        _ => {
            tracing::warn!(
                target = %target.display(),
                boundary = %boundary.display(),
                "Rejected path outside of boundary"
            );
            Err(DomainError::access_denied(&target, &boundary))
        }
    }
}

/// True when a caller-supplied relative path is acceptable at all: not
/// absolute and free of `..` segments.
pub fn is_plain_relative(path: &Path) -> bool {
    !path.as_os_str().is_empty()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

/// Map an untrusted identifier to a single safe path segment.
///
/// Only for deriving workspace keys; arbitrary relative paths go through
/// [`validate_within_boundary`] instead.
pub fn sanitize_component(raw: &str) -> String {
    let replaced = raw.replace(['/', '\\', '\0'], "_").replace("..", "_");
    let trimmed = replaced.trim_start_matches('.');
    if trimmed.is_empty() {
        "_".to_string()
    } else {
        trimmed.to_string()
    }
}
