//! Persisting a machine through after-exit hooks and restoring it from the
//! saved snapshot.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use smoothstate::prelude::*;
use smoothstate::{event_enum, state_enum};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

state_enum! {
    enum TaskState {
        Inactive = "inactive",
        Active = "active",
        Completed = "completed",
    }
}

event_enum! {
    enum TaskEvent {
        Activate = "activate",
        Complete = "complete",
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
struct Task {
    title: String,
    tags: Vec<String>,
    completed_at: Option<DateTime<Utc>>,
}

/// Rows keyed by machine id, holding the JSON of the latest snapshot.
#[derive(Default)]
struct Store {
    rows: Mutex<HashMap<String, String>>,
    read_only: AtomicBool,
}

impl Store {
    fn save(&self, key: &str, json: String) -> anyhow::Result<()> {
        if self.read_only.load(Ordering::SeqCst) {
            anyhow::bail!("store is read-only");
        }
        self.rows.lock().unwrap().insert(key.to_string(), json);
        Ok(())
    }

    fn load(&self, key: &str) -> Option<Snapshot<TaskState, Task>> {
        let rows = self.rows.lock().unwrap();
        rows.get(key).map(|json| Snapshot::from_json(json).unwrap())
    }
}

type Tags = Vec<String>;
type TaskMachine = StateMachine<TaskState, TaskEvent, Task, Tags, Arc<Store>>;
type TaskScope = Scope<TaskState, TaskEvent, Task, Tags, Arc<Store>>;
type TaskCallback = Callback<TaskState, TaskEvent, Task, Tags, Arc<Store>>;
type TaskTransition = Transition<TaskState, TaskEvent, Task, Tags, Arc<Store>>;

fn completion_date() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap()
}

fn task_transitions() -> Vec<TaskTransition> {
    vec![
        t(TaskState::Inactive, TaskEvent::Activate, TaskState::Active)
            .on_enter(Callback::new(|task: &mut Task, tags: &Tags| task.tags = tags.clone())),
        t(TaskState::Active, TaskEvent::Complete, TaskState::Completed)
            .on_enter(Callback::new(|task: &mut Task, _: &Tags| {
                task.completed_at = Some(completion_date())
            }))
            .on_exit(Callback::new(|task: &mut Task, _: &Tags| {
                for tag in &mut task.tags {
                    *tag = format!("{}-completed", tag.to_uppercase());
                }
            })),
    ]
}

fn save_after_transition() -> TaskCallback {
    Callback::from_fn(|scope: TaskScope| async move {
        let json = scope.machine.snapshot().await.to_json()?;
        scope.receiver.save(scope.machine.id(), json)
    })
}

fn new_task(store: &Arc<Store>) -> TaskMachine {
    let task = Task {
        title: "My Task".to_string(),
        ..Task::default()
    };

    StateMachineBuilder::with_receiver(task, Arc::clone(store))
        .id("task-1")
        .initial(TaskState::Inactive)
        .transitions(task_transitions())
        .after_exit(save_after_transition())
        .build()
        .unwrap()
}

fn resume_task(store: &Arc<Store>) -> TaskMachine {
    let snapshot = store.load("task-1").unwrap();

    StateMachineBuilder::with_receiver(Task::default(), Arc::clone(store))
        .restore(snapshot)
        .unwrap()
        .transitions(task_transitions())
        .after_exit(save_after_transition())
        .build()
        .unwrap()
}

#[tokio::test]
async fn task_survives_restart_between_transitions() {
    let store = Arc::new(Store::default());

    let task = new_task(&store);
    task.trigger("activate", vec!["Tag One".to_string(), "Tag Two".to_string()])
        .await
        .unwrap();
    assert!(task.is(&TaskState::Active));

    let saved = store.load("task-1").unwrap();
    assert_eq!(saved.state, TaskState::Active);
    assert_eq!(saved.context.tags, vec!["Tag One", "Tag Two"]);
    drop(task);

    let resumed = resume_task(&store);
    assert_eq!(resumed.id(), "task-1");
    assert!(resumed.check("isActive").unwrap());

    resumed.fire(TaskEvent::Complete).await.unwrap();

    let saved = store.load("task-1").unwrap();
    assert_eq!(saved.state, TaskState::Completed);
    assert_eq!(saved.context.title, "My Task");
    assert_eq!(saved.context.tags, vec!["TAG ONE-completed", "TAG TWO-completed"]);
    assert_eq!(saved.context.completed_at, Some(completion_date()));
    assert!(resumed.is_final().await.unwrap());
}

#[tokio::test]
async fn failed_save_reports_error_but_keeps_new_state() {
    let store = Arc::new(Store::default());
    let task = new_task(&store);
    store.read_only.store(true, Ordering::SeqCst);

    let err = task.fire(TaskEvent::Activate).await.unwrap_err();

    assert_eq!(
        err,
        StateMachineError::CallbackFailure {
            id: "task-1".into(),
            event: "activate".into(),
            from: "inactive".into(),
            to: "active".into(),
            message: "store is read-only".into(),
        }
    );
    assert!(task.is(&TaskState::Active));
    assert!(store.load("task-1").is_none());
}

#[tokio::test]
async fn rejected_transition_saves_nothing() {
    let store = Arc::new(Store::default());
    let task = new_task(&store);

    let err = task.fire(TaskEvent::Complete).await.unwrap_err();

    assert!(err.is_not_allowed());
    assert!(store.load("task-1").is_none());
}

#[tokio::test]
async fn binary_snapshots_restore_too() {
    let store = Arc::new(Store::default());
    let task = new_task(&store);
    task.trigger("activate", vec!["urgent".to_string()]).await.unwrap();

    let bytes = task.snapshot().await.to_bytes().unwrap();
    let snapshot: Snapshot<TaskState, Task> = Snapshot::from_bytes(&bytes).unwrap();

    let elsewhere = Arc::new(Store::default());
    let copy: TaskMachine = StateMachineBuilder::with_receiver(Task::default(), elsewhere)
        .restore(snapshot)
        .unwrap()
        .transitions(task_transitions())
        .build()
        .unwrap();

    assert!(copy.is(&TaskState::Active));
    assert_eq!(copy.context().lock().await.tags, vec!["urgent"]);
    assert!(!copy.context().ptr_eq(&task.context()));
}
