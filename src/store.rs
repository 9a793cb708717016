// Task list store with key-value persistence

use crate::id::{IdGenerator, UuidIdGenerator};
use crate::storage::KeyValueStore;
use crate::task::{Task, TaskCounts};
use chrono::Utc;
use tracing::{debug, error, warn};

/// Default storage slot for the task list snapshot
pub const DEFAULT_STORAGE_KEY: &str = "tasklist.tasks";

/// In-memory task list mirrored to one key-value storage slot
///
/// The list starts empty until `load` is called. Every mutation persists
/// immediately; a failed write leaves the in-memory list intact and is
/// reported through the log and `save`'s return value, so the caller keeps
/// working in memory even when persistence is broken.
pub struct TaskStore {
    tasks: Vec<Task>,
    storage: Box<dyn KeyValueStore>,
    key: String,
    ids: Box<dyn IdGenerator>,
}

impl TaskStore {
    /// Create a store over the given backend and slot key, with UUID v7 ids
    pub fn new(storage: Box<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self::with_id_generator(storage, key, Box::new(UuidIdGenerator))
    }

    /// Create a store with an injected id generator
    pub fn with_id_generator(
        storage: Box<dyn KeyValueStore>,
        key: impl Into<String>,
        ids: Box<dyn IdGenerator>,
    ) -> Self {
        Self {
            tasks: Vec::new(),
            storage,
            key: key.into(),
            ids,
        }
    }

    /// Load the persisted snapshot into memory
    ///
    /// A missing snapshot yields an empty list. A snapshot that cannot be
    /// read, or that does not parse as an array of tasks, also yields an
    /// empty list; the condition is logged and never surfaced to the caller.
    pub fn load(&mut self) -> &[Task] {
        self.tasks = match self.storage.get(&self.key) {
            Ok(None) => Vec::new(),
            Ok(Some(snapshot)) => match serde_json::from_str(&snapshot) {
                Ok(tasks) => tasks,
                Err(e) => {
                    warn!(key = %self.key, error = ?e, "Malformed snapshot, resetting to empty list");
                    Vec::new()
                }
            },
            Err(e) => {
                warn!(key = %self.key, error = ?e, "Failed to read snapshot, resetting to empty list");
                Vec::new()
            }
        };

        debug!(key = %self.key, count = self.tasks.len(), "Loaded task list");
        &self.tasks
    }

    /// Persist the current list under the configured key
    ///
    /// Returns false on serialization or write failure; in-memory state is
    /// never altered either way.
    pub fn save(&mut self) -> bool {
        let snapshot = match serde_json::to_string(&self.tasks) {
            Ok(s) => s,
            Err(e) => {
                error!(key = %self.key, error = ?e, "Failed to serialize task list");
                return false;
            }
        };

        match self.storage.set(&self.key, &snapshot) {
            Ok(()) => true,
            Err(e) => {
                error!(key = %self.key, error = ?e, "Failed to persist task list");
                false
            }
        }
    }

    /// Append a task with the trimmed text
    ///
    /// Empty or whitespace-only text is rejected with None: no mutation, no
    /// persistence call. The created task is returned even if persisting it
    /// failed (the failure is visible in the log).
    pub fn add_task(&mut self, text: &str) -> Option<Task> {
        let text = text.trim();
        if text.is_empty() {
            debug!("Rejected empty task text");
            return None;
        }

        let task = Task {
            id: self.ids.next_id(),
            text: text.to_string(),
            completed: false,
            created_at: Utc::now(),
        };

        self.tasks.push(task.clone());
        self.save();
        Some(task)
    }

    /// Remove the task with the given id; true if one was removed
    pub fn delete_task(&mut self, id: &str) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);

        if self.tasks.len() < before {
            self.save();
            true
        } else {
            false
        }
    }

    /// Flip the completion flag of the task with the given id
    ///
    /// The task keeps its position and every other field. Returns None when
    /// no task matches, without touching storage.
    pub fn toggle_complete(&mut self, id: &str) -> Option<Task> {
        let task = self.tasks.iter_mut().find(|t| t.id == id)?;
        task.completed = !task.completed;
        let updated = task.clone();

        self.save();
        Some(updated)
    }

    /// Current in-memory list, no storage access
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Completion summary over the current list
    pub fn counts(&self) -> TaskCounts {
        let total = self.tasks.len();
        let completed = self.tasks.iter().filter(|t| t.completed).count();

        TaskCounts {
            total,
            pending: total - completed,
            completed,
        }
    }

    /// Drop every completed task, preserving the order of the remainder
    ///
    /// Persists only when at least one task was removed. Returns the count
    /// removed, possibly zero.
    pub fn clear_completed(&mut self) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|t| !t.completed);

        let removed = before - self.tasks.len();
        if removed > 0 {
            self.save();
        }
        removed
    }
}
