//! Memory - Append-only log events and their resolved projection
//!
//! A memory is written once as a creation event and changed only by patch
//! events. Nothing is ever removed; "deleted" means `enabled = false`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{Importance, Visibility};

/// One line of a memory log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MemoryEvent {
    Memory(MemoryEntry),
    Patch(MemoryPatch),
}

/// Creation event. `content` never changes for the lifetime of the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryEntry {
    pub id: String,
    /// UTC millisecond ISO-8601 timestamp
    pub ts: String,
    pub enabled: bool,
    pub visibility: Visibility,
    pub importance: Importance,
    pub content: String,
}

/// Patch event targeting an existing memory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryPatch {
    pub id: String,
    pub ts: String,
    pub target_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub importance: Option<Importance>,
}

/// Fields a patch may change
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryChanges {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub importance: Option<Importance>,
}

impl MemoryChanges {
    pub fn disable() -> Self {
        Self {
            enabled: Some(false),
            ..Self::default()
        }
    }

    pub fn enable() -> Self {
        Self {
            enabled: Some(true),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.enabled.is_none() && self.visibility.is_none() && self.importance.is_none()
    }
}

/// Current state of a memory after folding its patches
///
/// Derived in memory only; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedMemory {
    pub id: String,
    pub enabled: bool,
    pub visibility: Visibility,
    pub importance: Importance,
    pub content: String,
    pub created_at: String,
    pub last_modified_at: String,
}

impl ResolvedMemory {
    fn apply(&mut self, patch: &MemoryPatch) {
        if let Some(enabled) = patch.enabled {
            self.enabled = enabled;
        }
        if let Some(visibility) = patch.visibility {
            self.visibility = visibility;
        }
        if let Some(importance) = patch.importance {
            self.importance = importance;
        }
        self.last_modified_at = patch.ts.clone();
    }

    pub fn is_important(&self) -> bool {
        self.enabled && self.importance == Importance::High
    }
}

impl From<MemoryEntry> for ResolvedMemory {
    fn from(entry: MemoryEntry) -> Self {
        Self {
            id: entry.id,
            enabled: entry.enabled,
            visibility: entry.visibility,
            importance: entry.importance,
            content: entry.content,
            last_modified_at: entry.ts.clone(),
            created_at: entry.ts,
        }
    }
}

/// Fold a log into the current state of every memory it creates.
///
/// Patches apply in timestamp string order, ties in log order. Patches
/// whose target never appears are dropped. Output keeps creation order.
pub fn resolve_memories(events: impl IntoIterator<Item = MemoryEvent>) -> Vec<ResolvedMemory> {
    let mut order: Vec<String> = Vec::new();
    let mut creations: HashMap<String, MemoryEntry> = HashMap::new();
    let mut patches: HashMap<String, Vec<MemoryPatch>> = HashMap::new();

    for event in events {
        match event {
            MemoryEvent::Memory(entry) => {
                if creations.contains_key(&entry.id) {
                    tracing::warn!(memory_id = %entry.id, "Ignoring duplicate memory creation event");
                    continue;
                }
                order.push(entry.id.clone());
                creations.insert(entry.id.clone(), entry);
            }
            MemoryEvent::Patch(patch) => {
                patches.entry(patch.target_id.clone()).or_default().push(patch);
            }
        }
    }

    let resolved: Vec<ResolvedMemory> = order
        .into_iter()
        .filter_map(|id| {
            let entry = creations.remove(&id)?;
            let mut memory = ResolvedMemory::from(entry);
            if let Some(mut targeted) = patches.remove(&id) {
                // stable: equal timestamps keep log order
                targeted.sort_by(|a, b| a.ts.cmp(&b.ts));
                for patch in &targeted {
                    memory.apply(patch);
                }
            }
            Some(memory)
        })
        .collect();

    if !patches.is_empty() {
        tracing::debug!(orphans = patches.len(), "Dropped patches without a creation event");
    }

    resolved
}
