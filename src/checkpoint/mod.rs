//! Checkpoint and resume functionality for state machines.
//!
//! A [`Snapshot`] captures the active state and the context value of a
//! machine. Transition declarations and callbacks are code, not data, and are
//! never serialized: a host restores a snapshot by declaring the same
//! transitions again on a [`StateMachineBuilder`](crate::builder::StateMachineBuilder)
//! and calling [`restore`](crate::builder::StateMachineBuilder::restore).
//!
//! Saving after every transition is done with an after-exit hook:
//!
//! ```rust
//! use smoothstate::builder::{t, StateMachineBuilder};
//! use smoothstate::checkpoint::Snapshot;
//! use smoothstate::core::{Callback, Scope};
//! use smoothstate::effects::StateMachine;
//! use std::sync::{Arc, Mutex};
//!
//! type Store = Arc<Mutex<Vec<String>>>;
//! type Loader = StateMachine<String, String, u32, (), Store>;
//!
//! # let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
//! # rt.block_on(async {
//! let store = Store::default();
//! let save = Callback::from_fn(|scope: Scope<String, String, u32, (), Store>| async move {
//!     let json = scope.machine.snapshot().await.to_json()?;
//!     scope.receiver.lock().unwrap().push(json);
//!     Ok::<(), anyhow::Error>(())
//! });
//!
//! let machine: Loader = StateMachineBuilder::with_receiver(0, store.clone())
//!     .initial("idle".to_string())
//!     .transition(t("idle".to_string(), "fetch".to_string(), "pending".to_string()))
//!     .after_exit(save)
//!     .build()
//!     .unwrap();
//! machine.fire("fetch".to_string()).await.unwrap();
//!
//! let saved = store.lock().unwrap().pop().unwrap();
//! let snapshot: Snapshot<String, u32> = Snapshot::from_json(&saved).unwrap();
//! assert_eq!(snapshot.state, "pending");
//! # });
//! ```

use crate::core::{Event, Payload, State};
use crate::effects::StateMachine;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod error;

pub use error::CheckpointError;

/// Version identifier for the snapshot format.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Serializable `(state, context)` pair of a machine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot<S, C> {
    /// Snapshot format version
    pub version: u32,

    /// Unique snapshot identifier
    pub id: Uuid,

    /// Id of the machine the snapshot was taken from
    pub machine_id: String,

    /// When the snapshot was taken
    pub taken_at: DateTime<Utc>,

    /// Active state at the time of the snapshot
    pub state: S,

    /// Context value at the time of the snapshot
    pub context: C,
}

impl<S, C> Snapshot<S, C> {
    /// Fresh snapshot with a new id and the current time.
    pub fn new(machine_id: impl Into<String>, state: S, context: C) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            id: Uuid::new_v4(),
            machine_id: machine_id.into(),
            taken_at: Utc::now(),
            state,
            context,
        }
    }

    /// Reject snapshots this version cannot restore.
    pub fn validate(&self) -> Result<(), CheckpointError> {
        if self.version != SNAPSHOT_VERSION {
            return Err(CheckpointError::UnsupportedVersion {
                found: self.version,
                supported: SNAPSHOT_VERSION,
            });
        }
        if self.machine_id.is_empty() {
            return Err(CheckpointError::ValidationFailed("machine id is empty".to_string()));
        }
        Ok(())
    }
}

impl<S: Serialize, C: Serialize> Snapshot<S, C> {
    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, CheckpointError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| CheckpointError::SerializationFailed(e.to_string()))
    }

    /// Serialize to the compact binary format.
    pub fn to_bytes(&self) -> Result<Vec<u8>, CheckpointError> {
        bincode::serialize(self).map_err(|e| CheckpointError::SerializationFailed(e.to_string()))
    }
}

impl<S: DeserializeOwned, C: DeserializeOwned> Snapshot<S, C> {
    /// Deserialize from JSON and validate.
    pub fn from_json(json: &str) -> Result<Self, CheckpointError> {
        let snapshot: Self = serde_json::from_str(json)
            .map_err(|e| CheckpointError::DeserializationFailed(e.to_string()))?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Deserialize from the binary format and validate.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CheckpointError> {
        let snapshot: Self = bincode::deserialize(bytes)
            .map_err(|e| CheckpointError::DeserializationFailed(e.to_string()))?;
        snapshot.validate()?;
        Ok(snapshot)
    }
}

impl<S, E, C, A, R> StateMachine<S, E, C, A, R>
where
    S: State,
    E: Event,
    C: Clone + Send + 'static,
    A: Payload,
    R: Payload,
{
    /// Capture the current state and a copy of the context.
    pub async fn snapshot(&self) -> Snapshot<S, C> {
        let context = self.context().lock().await.clone();
        let snapshot = Snapshot::new(self.id(), self.current(), context);
        tracing::trace!(machine = %self.id(), snapshot = %snapshot.id, "snapshot taken");
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{t, StateMachineBuilder};

    crate::state_enum! {
        enum Door {
            Open = "open",
            Closed = "closed",
        }
    }

    #[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Usage {
        closes: u32,
    }

    #[test]
    fn json_round_trip_preserves_fields() {
        let snapshot = Snapshot::new("door", Door::Closed, Usage { closes: 4 });

        let json = snapshot.to_json().unwrap();
        assert!(json.contains("\"closed\""));

        let restored: Snapshot<Door, Usage> = Snapshot::from_json(&json).unwrap();
        assert_eq!(restored, snapshot);
    }

    #[test]
    fn binary_round_trip_preserves_fields() {
        let snapshot = Snapshot::new("door", Door::Open, Usage { closes: 1 });

        let bytes = snapshot.to_bytes().unwrap();
        let restored: Snapshot<Door, Usage> = Snapshot::from_bytes(&bytes).unwrap();

        assert_eq!(restored, snapshot);
    }

    #[test]
    fn rejects_future_versions() {
        let mut snapshot = Snapshot::new("door", Door::Open, Usage::default());
        snapshot.version = SNAPSHOT_VERSION + 1;
        let json = snapshot.to_json().unwrap();

        let result = Snapshot::<Door, Usage>::from_json(&json);

        assert!(matches!(
            result,
            Err(CheckpointError::UnsupportedVersion { found: 2, supported: 1 })
        ));
    }

    #[test]
    fn rejects_garbage() {
        let result = Snapshot::<Door, Usage>::from_json("{\"version\": 1");
        assert!(matches!(result, Err(CheckpointError::DeserializationFailed(_))));

        let result = Snapshot::<Door, Usage>::from_bytes(&[1, 2, 3]);
        assert!(matches!(result, Err(CheckpointError::DeserializationFailed(_))));
    }

    #[test]
    fn rejects_anonymous_snapshots() {
        let snapshot = Snapshot::new("", Door::Open, Usage::default());
        assert!(matches!(snapshot.validate(), Err(CheckpointError::ValidationFailed(_))));
    }

    #[tokio::test]
    async fn snapshot_captures_state_and_context_copy() {
        let machine: StateMachine<Door, &'static str, Usage> = StateMachineBuilder::new()
            .id("front door")
            .initial(Door::Open)
            .transition(t(Door::Open, "close", Door::Closed).on_enter(crate::core::Callback::new(
                |usage: &mut Usage, _: &()| usage.closes += 1,
            )))
            .build()
            .unwrap();
        machine.fire("close").await.unwrap();

        let snapshot = machine.snapshot().await;
        machine.context().lock().await.closes = 10;

        assert_eq!(snapshot.machine_id, "front door");
        assert_eq!(snapshot.state, Door::Closed);
        assert_eq!(snapshot.context, Usage { closes: 1 });
        assert_eq!(snapshot.version, SNAPSHOT_VERSION);
    }
}
