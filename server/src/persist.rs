use log::{error, warn};
use thiserror::Error;

use worldcore_shared::{ContentId, EntityId};

use crate::world::QuestState;

/// Downstream store failure during a script-triggered save.
///
/// Surfaced to the caller as a failure result; the engine never retries on
/// its own — retry policy is decided by the task handler's [`TaskOutcome`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersistenceError {
    /// The store could not be reached; the operation may succeed later
    #[error("Realm store unavailable: {reason}")]
    Unavailable { reason: String },

    /// The store rejected the write; retrying will not help
    #[error("Realm store rejected the write: {reason}")]
    Rejected { reason: String },
}

/// Persistence collaborator: character/account/world stores, consulted
/// only at cast/script boundaries and treated as fallible remote calls.
pub trait RealmStore {
    /// Records a granted reward (loot, title, currency) for an entity.
    fn grant_reward(
        &mut self,
        entity: EntityId,
        reward_table: ContentId,
        roll: u32,
    ) -> Result<(), PersistenceError>;

    /// Persists a quest state transition.
    fn save_quest_state(
        &mut self,
        entity: EntityId,
        quest_id: ContentId,
        state: QuestState,
    ) -> Result<(), PersistenceError>;
}

/// Explicit status returned by a deferred task handler: the engine marks
/// the task retryable versus permanently failed based on this, nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    Complete,
    Retry,
    Failed,
}

type TaskHandler = Box<dyn FnMut(&mut dyn RealmStore) -> TaskOutcome>;

/// One deferred unit of store work originated by game logic.
pub struct DeferredTask {
    description: &'static str,
    attempts: u32,
    handler: TaskHandler,
}

impl DeferredTask {
    pub fn new(
        description: &'static str,
        handler: impl FnMut(&mut dyn RealmStore) -> TaskOutcome + 'static,
    ) -> Self {
        Self {
            description,
            attempts: 0,
            handler: Box::new(handler),
        }
    }

    pub fn description(&self) -> &'static str {
        self.description
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }
}

/// Queue of deferred realm tasks, drained once per tick.
///
/// `Retry` re-queues for the next drain; `Failed` is logged and dropped.
pub struct DeferredTaskQueue {
    tasks: Vec<DeferredTask>,
}

impl DeferredTaskQueue {
    pub fn new() -> Self {
        Self { tasks: Vec::new() }
    }

    pub fn push(&mut self, task: DeferredTask) {
        self.tasks.push(task);
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn run(&mut self, store: &mut dyn RealmStore) {
        let tasks = std::mem::take(&mut self.tasks);
        for mut task in tasks {
            task.attempts += 1;
            match (task.handler)(store) {
                TaskOutcome::Complete => {}
                TaskOutcome::Retry => {
                    warn!(
                        "deferred realm task `{}` will retry (attempt {})",
                        task.description, task.attempts
                    );
                    self.tasks.push(task);
                }
                TaskOutcome::Failed => {
                    error!(
                        "deferred realm task `{}` permanently failed after {} attempts",
                        task.description, task.attempts
                    );
                }
            }
        }
    }
}

impl Default for DeferredTaskQueue {
    fn default() -> Self {
        Self::new()
    }
}
