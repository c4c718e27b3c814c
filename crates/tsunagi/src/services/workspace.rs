//! Workspace Manager
//!
//! Single owner of "where may this conversation read and write files".
//! Layout: `<root>/<platform>/<user>/<channel>/`, each segment sanitized.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::config::BridgeConfig;
use crate::domain::entities::{NormalizedEvent, WorkspaceInfo, WorkspaceKeyComponents};
use crate::domain::errors::DomainError;
use crate::domain::value_objects::{Platform, Visibility};
use crate::services::path_guard::{
    absolutize, is_plain_relative, sanitize_component, validate_within_boundary,
};

/// Resolves conversations to sandboxed directories
#[derive(Debug, Clone)]
pub struct WorkspaceManager {
    root: PathBuf,
}

impl WorkspaceManager {
    /// Create a manager rooted at `root` (made absolute, not created yet)
    pub fn new(root: impl AsRef<Path>) -> Result<Self, DomainError> {
        Ok(Self {
            root: absolutize(root.as_ref())?,
        })
    }

    pub fn from_config(config: &BridgeConfig) -> Result<Self, DomainError> {
        Self::new(config.workspaces_root())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `platform/sanitize(userId)/sanitize(channelId)`
    pub fn compute_workspace_key(components: &WorkspaceKeyComponents) -> String {
        format!(
            "{}/{}/{}",
            components.platform,
            sanitize_component(&components.user_id),
            sanitize_component(&components.channel_id)
        )
    }

    /// Absolute directory for a workspace, checked against the root
    pub fn workspace_path(&self, components: &WorkspaceKeyComponents) -> Result<PathBuf, DomainError> {
        let path = self
            .root
            .join(components.platform.as_str())
            .join(sanitize_component(&components.user_id))
            .join(sanitize_component(&components.channel_id));
        validate_within_boundary(&path, &self.root)
    }

    /// Resolve the workspace of an inbound event, creating it if needed
    pub async fn get_or_create_workspace(
        &self,
        event: &NormalizedEvent,
    ) -> Result<WorkspaceInfo, DomainError> {
        self.get_or_create(event.workspace_components(), event.is_dm)
            .await
    }

    /// Idempotent: concurrent calls for one key converge on the same state.
    ///
    /// A new workspace gets the public memory log, plus the private one for
    /// DMs. Once the public log exists the DM status is fixed: it is the
    /// presence of the private log, and a request claiming the other status
    /// is denied.
    pub async fn get_or_create(
        &self,
        components: WorkspaceKeyComponents,
        is_dm: bool,
    ) -> Result<WorkspaceInfo, DomainError> {
        let key = Self::compute_workspace_key(&components);
        let path = self.workspace_path(&components)?;
        let public_log = path.join(Visibility::Public.file_name());
        let private_log = path.join(Visibility::Private.file_name());

        let existed = fs::try_exists(&public_log).await.unwrap_or(false);
        if existed {
            let stored_dm = fs::try_exists(&private_log).await.unwrap_or(false);
            if stored_dm != is_dm {
                tracing::warn!(
                    workspace = %key,
                    is_dm,
                    stored_dm,
                    "Rejected workspace with mismatched DM status"
                );
                return Err(DomainError::access_denied(private_log, &path));
            }
        }
        fs::create_dir_all(&path).await?;

        let workspace = WorkspaceInfo {
            key,
            components,
            path,
            is_dm,
            created_at: None,
        };

        // private first: an existing public log marks a fully created workspace
        if is_dm {
            self.touch(&workspace, Visibility::Private).await?;
        }
        self.touch(&workspace, Visibility::Public).await?;

        if !existed {
            tracing::info!(workspace = %workspace.key, is_dm, "Created workspace");
        }

        let created_at = directory_created_at(&workspace.path).await;
        Ok(WorkspaceInfo {
            created_at,
            ..workspace
        })
    }

    /// Path of a memory log, or `None` when private memory is requested
    /// for a non-DM workspace. That is policy, not a fault.
    pub fn get_memory_file_path(
        &self,
        workspace: &WorkspaceInfo,
        file_type: Visibility,
    ) -> Option<PathBuf> {
        match file_type {
            Visibility::Private if !workspace.is_dm => None,
            _ => Some(workspace.path.join(file_type.file_name())),
        }
    }

    /// Resolve a caller-supplied relative path inside the workspace
    fn resolve_file(
        &self,
        workspace: &WorkspaceInfo,
        relative: &Path,
    ) -> Result<PathBuf, DomainError> {
        let candidate = workspace.path.join(relative);
        if !is_plain_relative(relative) {
            tracing::warn!(
                workspace = %workspace.key,
                path = %relative.display(),
                "Rejected workspace path"
            );
            return Err(DomainError::access_denied(candidate, &workspace.path));
        }
        // the workspace itself must still sit under the root
        validate_within_boundary(&workspace.path, &self.root)?;
        validate_within_boundary(&candidate, &workspace.path)
    }

    pub async fn read_workspace_file(
        &self,
        workspace: &WorkspaceInfo,
        relative: impl AsRef<Path>,
    ) -> Result<String, DomainError> {
        let path = self.resolve_file(workspace, relative.as_ref())?;
        match fs::read_to_string(&path).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(DomainError::not_found(path)),
            Err(e) => Err(e.into()),
        }
    }

    /// Replace a file, creating parent directories as needed
    pub async fn write_workspace_file(
        &self,
        workspace: &WorkspaceInfo,
        relative: impl AsRef<Path>,
        content: &str,
    ) -> Result<(), DomainError> {
        let path = self.resolve_file(workspace, relative.as_ref())?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&path, content).await?;
        Ok(())
    }

    pub async fn append_workspace_file(
        &self,
        workspace: &WorkspaceInfo,
        relative: impl AsRef<Path>,
        content: &str,
    ) -> Result<(), DomainError> {
        let path = self.resolve_file(workspace, relative.as_ref())?;
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        file.write_all(content.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }

    async fn touch(&self, workspace: &WorkspaceInfo, file_type: Visibility) -> Result<(), DomainError> {
        self.append_workspace_file(workspace, file_type.file_name(), "")
            .await
    }

    /// Every workspace currently on disk, sorted by key
    ///
    /// Directory names are already sanitized, so the reported components
    /// are the sanitized ids. `is_dm` is inferred from the private log.
    pub async fn list_workspaces(&self) -> Result<Vec<WorkspaceInfo>, DomainError> {
        let mut workspaces = Vec::new();

        for platform in Platform::ALL {
            let platform_dir = self.root.join(platform.as_str());
            for user in list_dirs(&platform_dir).await? {
                let user_dir = platform_dir.join(&user);
                for channel in list_dirs(&user_dir).await? {
                    let path = user_dir.join(&channel);
                    let is_dm = fs::try_exists(path.join(Visibility::Private.file_name()))
                        .await
                        .unwrap_or(false);
                    let components = WorkspaceKeyComponents::new(platform, user.clone(), channel);
                    workspaces.push(WorkspaceInfo {
                        key: Self::compute_workspace_key(&components),
                        created_at: directory_created_at(&path).await,
                        components,
                        path,
                        is_dm,
                    });
                }
            }
        }

        workspaces.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(workspaces)
    }
}

async fn list_dirs(dir: &Path) -> Result<Vec<String>, DomainError> {
    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut names = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_dir() {
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
    }
    names.sort();
    Ok(names)
}

async fn directory_created_at(path: &Path) -> Option<DateTime<Utc>> {
    let metadata = fs::metadata(path).await.ok()?;
    metadata
        .created()
        .or_else(|_| metadata.modified())
        .ok()
        .map(DateTime::<Utc>::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn components(user: &str, channel: &str) -> WorkspaceKeyComponents {
        WorkspaceKeyComponents::new(Platform::Discord, user, channel)
    }

    #[test]
    fn test_workspace_key_is_sanitized() {
        assert_eq!(
            WorkspaceManager::compute_workspace_key(&components("u1", "c1")),
            "discord/u1/c1"
        );
        assert_eq!(
            WorkspaceManager::compute_workspace_key(&components("../../etc", "c/1")),
            "discord/____etc/c_1"
        );
    }

    #[tokio::test]
    async fn test_get_or_create_is_idempotent() {
        let temp = tempfile::tempdir().unwrap();
        let manager = WorkspaceManager::new(temp.path()).unwrap();

        let first = manager.get_or_create(components("u1", "c1"), false).await.unwrap();
        let second = manager.get_or_create(components("u1", "c1"), false).await.unwrap();

        assert_eq!(first.path, second.path);
        assert_eq!(first.key, "discord/u1/c1");
        assert!(first.path.starts_with(manager.root()));
        assert!(first.path.join("memory.public.jsonl").exists());
        assert!(!first.path.join("memory.private.jsonl").exists());
        assert!(second.created_at.is_some());
    }

    #[tokio::test]
    async fn test_concurrent_creation_does_not_fail() {
        let temp = tempfile::tempdir().unwrap();
        let manager = WorkspaceManager::new(temp.path()).unwrap();

        let (a, b) = tokio::join!(
            manager.get_or_create(components("u1", "c1"), true),
            manager.get_or_create(components("u1", "c1"), true),
        );
        assert_eq!(a.unwrap().path, b.unwrap().path);
    }

    #[tokio::test]
    async fn test_dm_status_is_fixed_at_creation() {
        let temp = tempfile::tempdir().unwrap();
        let manager = WorkspaceManager::new(temp.path()).unwrap();

        let guild = manager.get_or_create(components("u1", "c1"), false).await.unwrap();
        let err = manager
            .get_or_create(components("u1", "c1"), true)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::WorkspaceAccessDenied { .. }));
        assert!(!guild.path.join("memory.private.jsonl").exists());

        manager.get_or_create(components("u1", "dm"), true).await.unwrap();
        let err = manager
            .get_or_create(components("u1", "dm"), false)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::WorkspaceAccessDenied { .. }));

        let listed = manager.list_workspaces().await.unwrap();
        let dms: Vec<bool> = listed.iter().map(|w| w.is_dm).collect();
        assert_eq!(dms, vec![false, true]);
    }

    #[tokio::test]
    async fn test_dm_workspace_has_private_log() {
        let temp = tempfile::tempdir().unwrap();
        let manager = WorkspaceManager::new(temp.path()).unwrap();
        let event = NormalizedEvent::new(Platform::Discord, "dm1", "u1", "m1", "hi").with_dm(true);

        let workspace = manager.get_or_create_workspace(&event).await.unwrap();
        assert!(workspace.is_dm);
        assert!(workspace.path.join("memory.private.jsonl").exists());
        assert!(manager
            .get_memory_file_path(&workspace, Visibility::Private)
            .is_some());
    }

    #[tokio::test]
    async fn test_private_path_is_none_outside_dm() {
        let temp = tempfile::tempdir().unwrap();
        let manager = WorkspaceManager::new(temp.path()).unwrap();
        let workspace = manager.get_or_create(components("u1", "c1"), false).await.unwrap();

        assert!(manager
            .get_memory_file_path(&workspace, Visibility::Private)
            .is_none());
        assert_eq!(
            manager.get_memory_file_path(&workspace, Visibility::Public),
            Some(workspace.path.join("memory.public.jsonl"))
        );
    }

    #[tokio::test]
    async fn test_file_operations_stay_inside() {
        let temp = tempfile::tempdir().unwrap();
        let manager = WorkspaceManager::new(temp.path()).unwrap();
        let workspace = manager.get_or_create(components("u1", "c1"), false).await.unwrap();

        manager
            .write_workspace_file(&workspace, "notes/today.md", "first")
            .await
            .unwrap();
        manager
            .append_workspace_file(&workspace, "notes/today.md", "\nsecond")
            .await
            .unwrap();
        let content = manager
            .read_workspace_file(&workspace, "notes/today.md")
            .await
            .unwrap();
        assert_eq!(content, "first\nsecond");

        for bad in ["../c2/memory.public.jsonl", "a/../../x", "/etc/passwd", ".."] {
            let err = manager.read_workspace_file(&workspace, bad).await.unwrap_err();
            assert!(
                matches!(err, DomainError::WorkspaceAccessDenied { .. }),
                "{bad} should be denied"
            );
            let err = manager
                .write_workspace_file(&workspace, bad, "x")
                .await
                .unwrap_err();
            assert!(matches!(err, DomainError::WorkspaceAccessDenied { .. }));
        }
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let temp = tempfile::tempdir().unwrap();
        let manager = WorkspaceManager::new(temp.path()).unwrap();
        let workspace = manager.get_or_create(components("u1", "c1"), false).await.unwrap();

        let err = manager
            .read_workspace_file(&workspace, "missing.txt")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::WorkspaceNotFound { .. }));
    }

    #[tokio::test]
    async fn test_list_workspaces() {
        let temp = tempfile::tempdir().unwrap();
        let manager = WorkspaceManager::new(temp.path()).unwrap();
        assert!(manager.list_workspaces().await.unwrap().is_empty());

        manager.get_or_create(components("u2", "c1"), false).await.unwrap();
        manager.get_or_create(components("u1", "dm"), true).await.unwrap();
        manager
            .get_or_create(WorkspaceKeyComponents::new(Platform::Misskey, "u3", "n1"), false)
            .await
            .unwrap();

        let listed = manager.list_workspaces().await.unwrap();
        let keys: Vec<&str> = listed.iter().map(|w| w.key.as_str()).collect();
        assert_eq!(keys, vec!["discord/u1/dm", "discord/u2/c1", "misskey/u3/n1"]);
        assert!(listed[0].is_dm);
        assert!(!listed[1].is_dm);
    }
}
