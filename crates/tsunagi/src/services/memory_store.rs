//! Memory Store
//!
//! Durable, append-only record of facts per workspace. Every read re-parses
//! the whole log and folds patches onto creation events; nothing is cached.
//!
//! Mutations of one workspace are serialized by a per-workspace lock so the
//! read-resolve-append sequence of a patch cannot interleave with another
//! append, whichever inbound event drives it.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tokio::sync::OwnedMutexGuard;

use crate::config::{BridgeConfig, MemoryConfig};
use crate::domain::entities::{
    resolve_memories, MemoryChanges, MemoryEntry, MemoryEvent, MemoryPatch, ResolvedMemory,
    WorkspaceInfo,
};
use crate::domain::errors::DomainError;
use crate::domain::value_objects::{Importance, Visibility};
use crate::ports::SearchOptions;
use crate::services::clock::{generate_memory_id, MonotonicClock};
use crate::services::keyword_search::{find_match, KeywordSearch};
use crate::services::workspace::WorkspaceManager;

/// Options for [`MemoryStore::add_memory`]
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct AddMemoryOptions {
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub importance: Importance,
}

/// Options for [`MemoryStore::search_memories`]
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SearchMemoriesOptions {
    /// Overrides the configured result limit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

/// Keyed async locks, one per workspace
#[derive(Default)]
struct WorkspaceLocks {
    inner: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl WorkspaceLocks {
    async fn lock(&self, key: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock().unwrap_or_else(|e| e.into_inner());
            Arc::clone(map.entry(key.to_string()).or_default())
        };
        lock.lock_owned().await
    }
}

/// Append-only memory log per workspace
pub struct MemoryStore {
    workspaces: Arc<WorkspaceManager>,
    search: KeywordSearch,
    clock: MonotonicClock,
    locks: WorkspaceLocks,
    config: MemoryConfig,
}

impl MemoryStore {
    pub fn new(workspaces: Arc<WorkspaceManager>, search: KeywordSearch, config: MemoryConfig) -> Self {
        Self {
            workspaces,
            search,
            clock: MonotonicClock::new(),
            locks: WorkspaceLocks::default(),
            config,
        }
    }

    /// Search fast path and limits taken from `config`
    pub fn from_config(workspaces: Arc<WorkspaceManager>, config: &BridgeConfig) -> Self {
        Self::new(
            workspaces,
            KeywordSearch::from_config(&config.search),
            config.memory.clone(),
        )
    }

    pub fn workspaces(&self) -> &Arc<WorkspaceManager> {
        &self.workspaces
    }

    /// Record a new memory in the log matching its visibility
    pub async fn add_memory(
        &self,
        workspace: &WorkspaceInfo,
        content: &str,
        options: AddMemoryOptions,
    ) -> Result<MemoryEntry, DomainError> {
        if content.trim().is_empty() {
            return Err(DomainError::Validation("memory content is empty".into()));
        }
        if self
            .workspaces
            .get_memory_file_path(workspace, options.visibility)
            .is_none()
        {
            return Err(DomainError::MemoryWriteFailed(format!(
                "{} memory is only available in direct messages ({})",
                options.visibility, workspace.key
            )));
        }

        let _guard = self.locks.lock(&workspace.key).await;
        let (millis, ts) = self.clock.stamp();
        let entry = MemoryEntry {
            id: generate_memory_id(millis),
            ts,
            enabled: true,
            visibility: options.visibility,
            importance: options.importance,
            content: content.to_string(),
        };

        self.append_event(workspace, options.visibility, MemoryEvent::Memory(entry.clone()))
            .await?;

        tracing::info!(
            workspace = %workspace.key,
            memory_id = %entry.id,
            visibility = %entry.visibility,
            importance = %entry.importance,
            "Added memory"
        );
        Ok(entry)
    }

    /// Append a patch to the log holding the target's creation event.
    ///
    /// The patch goes to that file even when it changes `visibility`: the
    /// resolved label changes, the event's file does not.
    pub async fn patch_memory(
        &self,
        workspace: &WorkspaceInfo,
        target_id: &str,
        changes: MemoryChanges,
    ) -> Result<MemoryPatch, DomainError> {
        let _guard = self.locks.lock(&workspace.key).await;

        let mut home = None;
        for visibility in self.visibilities(workspace) {
            let memories = self.load_all_memories(workspace, visibility).await?;
            if memories.iter().any(|m| m.id == target_id) {
                home = Some(visibility);
                break;
            }
        }
        let home = home.ok_or_else(|| {
            DomainError::MemoryReadFailed(format!(
                "memory {} not found in {}",
                target_id, workspace.key
            ))
        })?;

        let (millis, ts) = self.clock.stamp();
        let patch = MemoryPatch {
            id: generate_memory_id(millis),
            ts,
            target_id: target_id.to_string(),
            enabled: changes.enabled,
            visibility: changes.visibility,
            importance: changes.importance,
        };

        self.append_event(workspace, home, MemoryEvent::Patch(patch.clone()))
            .await?;

        tracing::info!(
            workspace = %workspace.key,
            memory_id = %target_id,
            file = %home,
            "Patched memory"
        );
        Ok(patch)
    }

    pub async fn disable_memory(
        &self,
        workspace: &WorkspaceInfo,
        id: &str,
    ) -> Result<MemoryPatch, DomainError> {
        self.patch_memory(workspace, id, MemoryChanges::disable()).await
    }

    pub async fn enable_memory(
        &self,
        workspace: &WorkspaceInfo,
        id: &str,
    ) -> Result<MemoryPatch, DomainError> {
        self.patch_memory(workspace, id, MemoryChanges::enable()).await
    }

    /// Resolve every memory of one log. Private on a non-DM workspace is
    /// simply empty; malformed lines are skipped.
    pub async fn load_all_memories(
        &self,
        workspace: &WorkspaceInfo,
        visibility: Visibility,
    ) -> Result<Vec<ResolvedMemory>, DomainError> {
        if self
            .workspaces
            .get_memory_file_path(workspace, visibility)
            .is_none()
        {
            return Ok(Vec::new());
        }

        let content = match self
            .workspaces
            .read_workspace_file(workspace, visibility.file_name())
            .await
        {
            Ok(content) => content,
            Err(DomainError::WorkspaceNotFound { .. }) => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        Ok(resolve_memories(parse_events(&workspace.key, visibility, &content)))
    }

    /// Enabled high-importance memories, public plus private for DMs,
    /// oldest first. No size cap here; callers budget their context.
    pub async fn get_important_memories(
        &self,
        workspace: &WorkspaceInfo,
    ) -> Result<Vec<ResolvedMemory>, DomainError> {
        let mut important: Vec<ResolvedMemory> = self
            .list_memories(workspace, false)
            .await?
            .into_iter()
            .filter(ResolvedMemory::is_important)
            .collect();
        important.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(important)
    }

    /// Memories from both logs, oldest first
    pub async fn list_memories(
        &self,
        workspace: &WorkspaceInfo,
        include_disabled: bool,
    ) -> Result<Vec<ResolvedMemory>, DomainError> {
        let mut all = Vec::new();
        for visibility in self.visibilities(workspace) {
            all.extend(self.load_all_memories(workspace, visibility).await?);
        }
        all.retain(|m| include_disabled || m.enabled);
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(all)
    }

    /// Current state of one memory, if it exists in either log
    pub async fn get_memory(
        &self,
        workspace: &WorkspaceInfo,
        id: &str,
    ) -> Result<Option<ResolvedMemory>, DomainError> {
        for visibility in self.visibilities(workspace) {
            if let Some(found) = self
                .load_all_memories(workspace, visibility)
                .await?
                .into_iter()
                .find(|m| m.id == id)
            {
                return Ok(Some(found));
            }
        }
        Ok(None)
    }

    /// Keyword recall (OR across keywords).
    ///
    /// Raw line matches only nominate ids; each is re-resolved to its
    /// current state and dropped if disabled, so stale text never
    /// resurfaces a disabled memory. The result limit and the character
    /// budget count verified memories only, never raw lines.
    pub async fn search_memories(
        &self,
        workspace: &WorkspaceInfo,
        keywords: &[String],
        options: SearchMemoriesOptions,
    ) -> Result<Vec<ResolvedMemory>, DomainError> {
        let keywords: Vec<String> = keywords
            .iter()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();
        let limit = options.limit.unwrap_or(self.config.search_limit);
        if keywords.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let raw_options = SearchOptions {
            max_results: usize::MAX,
            max_chars: usize::MAX,
            case_insensitive: true,
        };

        let mut found = Vec::new();
        let mut seen = HashSet::new();
        let mut chars = 0usize;

        for visibility in self.visibilities(workspace) {
            let Some(path) = self.workspaces.get_memory_file_path(workspace, visibility) else {
                continue;
            };
            let lines = self
                .search
                .search_multiple_keywords(&path, &keywords, &raw_options)
                .await?;
            if lines.is_empty() {
                continue;
            }

            let current: HashMap<String, ResolvedMemory> = self
                .load_all_memories(workspace, visibility)
                .await?
                .into_iter()
                .map(|m| (m.id.clone(), m))
                .collect();

            for line in lines {
                let Some(id) = matching_memory_id(&line.content, &keywords) else {
                    continue;
                };
                if !seen.insert(id.clone()) {
                    continue;
                }
                let Some(memory) = current.get(&id).filter(|m| m.enabled) else {
                    continue;
                };
                let len = memory.content.chars().count();
                if chars + len > self.config.max_search_chars {
                    return Ok(found);
                }
                chars += len;
                found.push(memory.clone());
                if found.len() >= limit {
                    return Ok(found);
                }
            }
        }

        Ok(found)
    }

    fn visibilities(&self, workspace: &WorkspaceInfo) -> Vec<Visibility> {
        if workspace.is_dm {
            vec![Visibility::Public, Visibility::Private]
        } else {
            vec![Visibility::Public]
        }
    }

    async fn append_event(
        &self,
        workspace: &WorkspaceInfo,
        file: Visibility,
        event: MemoryEvent,
    ) -> Result<(), DomainError> {
        let mut line = serde_json::to_string(&event)
            .map_err(|e| DomainError::MemoryWriteFailed(format!("serialize event: {}", e)))?;
        line.push('\n');
        self.workspaces
            .append_workspace_file(workspace, file.file_name(), &line)
            .await
    }
}

/// Parse a log line by line; a bad line is logged and skipped.
fn parse_events(workspace: &str, visibility: Visibility, content: &str) -> Vec<MemoryEvent> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .filter_map(|(index, line)| match serde_json::from_str::<MemoryEvent>(line) {
            Ok(event) => Some(event),
            Err(e) => {
                tracing::warn!(
                    workspace = %workspace,
                    file = %visibility.file_name(),
                    line = index + 1,
                    error = %e,
                    "Skipping malformed memory log line"
                );
                None
            }
        })
        .collect()
}

/// Id of a creation event whose content itself contains a keyword.
/// Matches on JSON keys or on patch lines nominate nothing.
fn matching_memory_id(line: &str, keywords: &[String]) -> Option<String> {
    match serde_json::from_str::<MemoryEvent>(line).ok()? {
        MemoryEvent::Memory(entry)
            if keywords
                .iter()
                .any(|k| find_match(&entry.content, k, true).is_some()) =>
        {
            Some(entry.id)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::WorkspaceKeyComponents;
    use crate::domain::value_objects::Platform;

    struct Fixture {
        _temp: tempfile::TempDir,
        store: MemoryStore,
    }

    fn fixture() -> Fixture {
        let temp = tempfile::tempdir().unwrap();
        let workspaces = Arc::new(WorkspaceManager::new(temp.path()).unwrap());
        let store = MemoryStore::new(workspaces, KeywordSearch::new(), MemoryConfig::default());
        Fixture { _temp: temp, store }
    }

    async fn workspace(store: &MemoryStore, channel: &str, is_dm: bool) -> WorkspaceInfo {
        store
            .workspaces()
            .get_or_create(
                WorkspaceKeyComponents::new(Platform::Discord, "u1", channel),
                is_dm,
            )
            .await
            .unwrap()
    }

    fn high() -> AddMemoryOptions {
        AddMemoryOptions {
            importance: Importance::High,
            ..AddMemoryOptions::default()
        }
    }

    fn private() -> AddMemoryOptions {
        AddMemoryOptions {
            visibility: Visibility::Private,
            ..AddMemoryOptions::default()
        }
    }

    fn kw(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[tokio::test]
    async fn test_end_to_end_hiking() {
        let f = fixture();
        let ws = workspace(&f.store, "c1", false).await;

        let entry = f.store.add_memory(&ws, "loves hiking", high()).await.unwrap();
        assert!(entry.id.starts_with("mem_"));

        let important = f.store.get_important_memories(&ws).await.unwrap();
        assert_eq!(important.len(), 1);
        assert_eq!(important[0].content, "loves hiking");

        let found = f
            .store
            .search_memories(&ws, &kw(&["hiking"]), SearchMemoriesOptions::default())
            .await
            .unwrap();
        assert_eq!(found, important);

        f.store.disable_memory(&ws, &entry.id).await.unwrap();
        let found = f
            .store
            .search_memories(&ws, &kw(&["hiking"]), SearchMemoriesOptions::default())
            .await
            .unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_disable_round_trip() {
        let f = fixture();
        let ws = workspace(&f.store, "c1", false).await;
        let entry = f.store.add_memory(&ws, "allergic to peanuts", high()).await.unwrap();

        f.store.disable_memory(&ws, &entry.id).await.unwrap();
        assert!(f.store.get_important_memories(&ws).await.unwrap().is_empty());

        f.store
            .patch_memory(&ws, &entry.id, MemoryChanges::enable())
            .await
            .unwrap();
        let important = f.store.get_important_memories(&ws).await.unwrap();
        assert_eq!(important.len(), 1);
        assert_eq!(important[0].id, entry.id);
    }

    #[tokio::test]
    async fn test_content_survives_patches() {
        let f = fixture();
        let ws = workspace(&f.store, "c1", false).await;
        let entry = f
            .store
            .add_memory(&ws, "X", AddMemoryOptions::default())
            .await
            .unwrap();

        let changes = [
            MemoryChanges::disable(),
            MemoryChanges {
                importance: Some(Importance::High),
                ..MemoryChanges::default()
            },
            MemoryChanges::enable(),
            MemoryChanges::default(),
        ];
        for change in changes {
            f.store.patch_memory(&ws, &entry.id, change).await.unwrap();
            let memory = f.store.get_memory(&ws, &entry.id).await.unwrap().unwrap();
            assert_eq!(memory.content, "X");
        }

        let memory = f.store.get_memory(&ws, &entry.id).await.unwrap().unwrap();
        assert!(memory.enabled);
        assert_eq!(memory.importance, Importance::High);
        assert!(memory.last_modified_at > memory.created_at);
    }

    #[tokio::test]
    async fn test_private_rejected_outside_dm() {
        let f = fixture();
        let ws = workspace(&f.store, "c1", false).await;

        let err = f.store.add_memory(&ws, "secret", private()).await.unwrap_err();
        assert!(matches!(err, DomainError::MemoryWriteFailed(_)));
        assert!(f
            .store
            .load_all_memories(&ws, Visibility::Private)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_private_isolated_in_dm() {
        let f = fixture();
        let ws = workspace(&f.store, "dm", true).await;

        let entry = f.store.add_memory(&ws, "secret birthday", private()).await.unwrap();

        assert!(f
            .store
            .load_all_memories(&ws, Visibility::Public)
            .await
            .unwrap()
            .is_empty());
        let private = f
            .store
            .load_all_memories(&ws, Visibility::Private)
            .await
            .unwrap();
        assert_eq!(private.len(), 1);
        assert_eq!(private[0].id, entry.id);

        let found = f
            .store
            .search_memories(&ws, &kw(&["birthday"]), SearchMemoriesOptions::default())
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
    }

    #[tokio::test]
    async fn test_patch_stays_in_creation_file() {
        let f = fixture();
        let ws = workspace(&f.store, "dm", true).await;
        let entry = f
            .store
            .add_memory(&ws, "plays chess", AddMemoryOptions::default())
            .await
            .unwrap();

        f.store
            .patch_memory(
                &ws,
                &entry.id,
                MemoryChanges {
                    visibility: Some(Visibility::Private),
                    ..MemoryChanges::default()
                },
            )
            .await
            .unwrap();

        let public = f
            .store
            .load_all_memories(&ws, Visibility::Public)
            .await
            .unwrap();
        assert_eq!(public.len(), 1);
        assert_eq!(public[0].visibility, Visibility::Private);

        let raw_private = std::fs::read_to_string(ws.path.join("memory.private.jsonl")).unwrap();
        assert!(raw_private.is_empty());
    }

    #[tokio::test]
    async fn test_patch_unknown_target_fails() {
        let f = fixture();
        let ws = workspace(&f.store, "c1", false).await;

        let err = f
            .store
            .patch_memory(&ws, "mem_nope_000000", MemoryChanges::disable())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::MemoryReadFailed(_)));
    }

    #[tokio::test]
    async fn test_malformed_lines_are_skipped() {
        let f = fixture();
        let ws = workspace(&f.store, "c1", false).await;
        f.store
            .add_memory(&ws, "first", AddMemoryOptions::default())
            .await
            .unwrap();
        f.store
            .workspaces()
            .append_workspace_file(&ws, "memory.public.jsonl", "{not json\n\n{\"type\":\"memory\"}\n")
            .await
            .unwrap();
        f.store
            .add_memory(&ws, "second", AddMemoryOptions::default())
            .await
            .unwrap();

        let memories = f
            .store
            .load_all_memories(&ws, Visibility::Public)
            .await
            .unwrap();
        let contents: Vec<&str> = memories.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_search_ignores_json_keys_and_dedups() {
        let f = fixture();
        let ws = workspace(&f.store, "c1", false).await;
        f.store
            .add_memory(&ws, "likes green tea", AddMemoryOptions::default())
            .await
            .unwrap();
        f.store
            .add_memory(&ws, "drinks tea at night", AddMemoryOptions::default())
            .await
            .unwrap();

        let by_key = f
            .store
            .search_memories(&ws, &kw(&["visibility"]), SearchMemoriesOptions::default())
            .await
            .unwrap();
        assert!(by_key.is_empty());

        let found = f
            .store
            .search_memories(&ws, &kw(&["TEA", "green"]), SearchMemoriesOptions::default())
            .await
            .unwrap();
        assert_eq!(found.len(), 2);

        let limited = f
            .store
            .search_memories(&ws, &kw(&["tea"]), SearchMemoriesOptions { limit: Some(1) })
            .await
            .unwrap();
        assert_eq!(limited.len(), 1);
        assert_eq!(limited[0].content, "likes green tea");
    }

    #[tokio::test]
    async fn test_search_looks_past_disabled_history() {
        let f = fixture();
        let ws = workspace(&f.store, "c1", false).await;
        for i in 0..80 {
            let old = f
                .store
                .add_memory(&ws, &format!("old tea note {i}"), AddMemoryOptions::default())
                .await
                .unwrap();
            f.store.disable_memory(&ws, &old.id).await.unwrap();
        }
        f.store
            .add_memory(&ws, "current tea preference", AddMemoryOptions::default())
            .await
            .unwrap();

        let raw = std::fs::read_to_string(ws.path.join("memory.public.jsonl")).unwrap();
        assert!(raw.chars().count() > MemoryConfig::default().max_search_chars);

        let found = f
            .store
            .search_memories(&ws, &kw(&["tea"]), SearchMemoriesOptions::default())
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].content, "current tea preference");
    }

    #[tokio::test]
    async fn test_search_keyword_matching_json_keys_finds_late_memory() {
        let f = fixture();
        let ws = workspace(&f.store, "c1", false).await;
        for i in 0..80 {
            f.store
                .add_memory(&ws, &format!("fact {i}"), AddMemoryOptions::default())
                .await
                .unwrap();
        }
        f.store
            .add_memory(&ws, "goes to public school", AddMemoryOptions::default())
            .await
            .unwrap();

        let found = f
            .store
            .search_memories(&ws, &kw(&["public"]), SearchMemoriesOptions::default())
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].content, "goes to public school");
    }

    #[tokio::test]
    async fn test_search_budget_counts_verified_memories() {
        let temp = tempfile::tempdir().unwrap();
        let workspaces = Arc::new(WorkspaceManager::new(temp.path()).unwrap());
        let config = MemoryConfig {
            search_limit: 10,
            max_search_chars: 30,
        };
        let store = MemoryStore::new(workspaces, KeywordSearch::new(), config);
        let ws = workspace(&store, "c1", false).await;
        for content in ["tea one", "tea two", "tea three", "tea four", "tea five"] {
            store
                .add_memory(&ws, content, AddMemoryOptions::default())
                .await
                .unwrap();
        }

        let found = store
            .search_memories(&ws, &kw(&["tea"]), SearchMemoriesOptions::default())
            .await
            .unwrap();
        let contents: Vec<&str> = found.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["tea one", "tea two", "tea three"]);
    }

    #[tokio::test]
    async fn test_important_sorted_across_files() {
        let f = fixture();
        let ws = workspace(&f.store, "dm", true).await;
        let a = f
            .store
            .add_memory(
                &ws,
                "private fact",
                AddMemoryOptions {
                    visibility: Visibility::Private,
                    importance: Importance::High,
                },
            )
            .await
            .unwrap();
        let b = f.store.add_memory(&ws, "public fact", high()).await.unwrap();
        f.store
            .add_memory(&ws, "not important", AddMemoryOptions::default())
            .await
            .unwrap();

        let important = f.store.get_important_memories(&ws).await.unwrap();
        let ids: Vec<&str> = important.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec![a.id.as_str(), b.id.as_str()]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_mutations_do_not_interleave() {
        let temp = tempfile::tempdir().unwrap();
        let workspaces = Arc::new(WorkspaceManager::new(temp.path()).unwrap());
        let store = Arc::new(MemoryStore::new(
            workspaces,
            KeywordSearch::new(),
            MemoryConfig::default(),
        ));
        let ws = workspace(&store, "c1", false).await;
        let seed = store
            .add_memory(&ws, "seed", AddMemoryOptions::default())
            .await
            .unwrap();

        let mut tasks = tokio::task::JoinSet::new();
        for i in 0..20 {
            let store = Arc::clone(&store);
            let ws = ws.clone();
            let seed_id = seed.id.clone();
            tasks.spawn(async move {
                store
                    .add_memory(&ws, &format!("fact number {i}"), AddMemoryOptions::default())
                    .await
                    .unwrap();
                let change = if i % 2 == 0 {
                    MemoryChanges::disable()
                } else {
                    MemoryChanges::enable()
                };
                store.patch_memory(&ws, &seed_id, change).await.unwrap();
            });
        }
        while let Some(joined) = tasks.join_next().await {
            joined.unwrap();
        }

        let raw = std::fs::read_to_string(ws.path.join("memory.public.jsonl")).unwrap();
        assert_eq!(raw.lines().count(), 41);
        assert!(raw
            .lines()
            .all(|line| serde_json::from_str::<MemoryEvent>(line).is_ok()));
        assert_eq!(store.list_memories(&ws, true).await.unwrap().len(), 21);
    }

    #[tokio::test]
    async fn test_empty_content_rejected() {
        let f = fixture();
        let ws = workspace(&f.store, "c1", false).await;
        let err = f
            .store
            .add_memory(&ws, "   ", AddMemoryOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }
}
