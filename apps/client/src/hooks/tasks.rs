//! Task list hook.

use std::sync::Arc;

use uuid::Uuid;

use lumi_core::api::{CreateTaskRequest, StatsEventRequest, StatsSnapshot};
use lumi_core::{CoreError, Priority, StatsTrigger, Task, ViewMode};

use super::HookState;
use crate::error::{ClientError, Result};
use crate::store::RemoteStore;

/// Result of flipping a task's completion.
#[derive(Debug, Clone, PartialEq)]
pub struct ToggleOutcome {
    pub task: Task,
    /// New stats row when the toggle completed the task and the trigger landed.
    pub stats: Option<StatsSnapshot>,
}

pub struct TaskHook {
    store: Arc<dyn RemoteStore>,
    state: HookState<Vec<Task>>,
}

impl TaskHook {
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        Self {
            store,
            state: HookState::default(),
        }
    }

    pub fn state(&self) -> &HookState<Vec<Task>> {
        &self.state
    }

    /// Tasks, newest first.
    pub fn tasks(&self) -> &[Task] {
        &self.state.items
    }

    pub fn get(&self, task_id: Uuid) -> Option<&Task> {
        self.state.items.iter().find(|t| t.id == task_id)
    }

    pub fn incomplete(&self) -> Vec<&Task> {
        ViewMode::All.filter(&self.state.items)
    }

    pub fn visible(&self, mode: ViewMode) -> Vec<&Task> {
        mode.filter(&self.state.items)
    }

    pub async fn load(&mut self) -> Result<()> {
        self.state.begin();
        match self.store.list_tasks().await {
            Ok(tasks) => {
                self.state.items = tasks;
                self.state.finish();
                Ok(())
            }
            Err(e) => Err(self.state.fail("load tasks", e)),
        }
    }

    pub async fn add(&mut self, title: &str, priority: Priority) -> Result<Task> {
        self.add_request(CreateTaskRequest {
            title: title.trim().to_string(),
            priority,
            steps: None,
        })
        .await
    }

    /// Add a task broken into steps.
    pub async fn add_with_steps(
        &mut self,
        title: &str,
        priority: Priority,
        steps: Vec<String>,
    ) -> Result<Task> {
        self.add_request(CreateTaskRequest {
            title: title.trim().to_string(),
            priority,
            steps: Some(steps),
        })
        .await
    }

    async fn add_request(&mut self, request: CreateTaskRequest) -> Result<Task> {
        if request.title.is_empty() {
            return Err(self.state.fail("add task", CoreError::EmptyContent.into()));
        }
        self.state.error = None;
        match self.store.create_task(&request).await {
            Ok(task) => {
                self.state.items.insert(0, task.clone());
                Ok(task)
            }
            Err(e) => Err(self.state.fail("add task", e)),
        }
    }

    /// Flip completion remotely, then locally; completing fires the
    /// `task_completed` trigger.
    ///
    /// A failed trigger leaves the task toggled and is reported through
    /// `state().error` with `stats: None`.
    pub async fn toggle(&mut self, task_id: Uuid) -> Result<ToggleOutcome> {
        let completed = match self.get(task_id) {
            Some(task) => !task.completed,
            None => {
                let error = ClientError::NotFound(format!("Task {}", task_id));
                return Err(self.state.fail("toggle task", error));
            }
        };

        self.state.error = None;
        let task = match self.store.set_task_completed(task_id, completed).await {
            Ok(task) => task,
            Err(e) => return Err(self.state.fail("toggle task", e)),
        };
        self.replace(task.clone());

        let mut stats = None;
        if task.completed {
            let request = StatsEventRequest {
                trigger: StatsTrigger::TaskCompleted,
                event_id: Some(Uuid::new_v4()),
            };
            match self.store.record_stats_event(request).await {
                Ok(response) => stats = Some(response.snapshot),
                Err(e) => {
                    self.state.fail("record task completion", e);
                }
            }
        }

        Ok(ToggleOutcome { task, stats })
    }

    pub async fn advance_step(&mut self, task_id: Uuid) -> Result<Task> {
        self.state.error = None;
        match self.store.advance_task_step(task_id).await {
            Ok(task) => {
                self.replace(task.clone());
                Ok(task)
            }
            Err(e) => Err(self.state.fail("advance step", e)),
        }
    }

    pub async fn delete(&mut self, task_id: Uuid) -> Result<()> {
        self.state.error = None;
        match self.store.delete_task(task_id).await {
            Ok(_) => {
                self.state.items.retain(|t| t.id != task_id);
                Ok(())
            }
            Err(e) => Err(self.state.fail("delete task", e)),
        }
    }

    fn replace(&mut self, task: Task) {
        if let Some(slot) = self.state.items.iter_mut().find(|t| t.id == task.id) {
            *slot = task;
        }
    }
}
