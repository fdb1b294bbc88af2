//! Snapshot replacement protocol integration tests
//!
//! Drives the verify → confirm → commit state machine against a recording
//! store and checks that no commit is ever issued without a verified
//! snapshot and an explicit confirmation.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use drawdock::document::{DrawingPayload, DrawingRecord};
use drawdock::errors::{ImportError, ImportResult, SnapshotError, SnapshotResult};
use drawdock::services::{SnapshotProtocol, SnapshotState};
use drawdock::store::RemoteStore;

#[derive(Default)]
struct SnapshotStore {
    verify_error: Option<SnapshotError>,
    commit_error: Option<SnapshotError>,
    verify_calls: AtomicUsize,
    commit_calls: AtomicUsize,
}

impl SnapshotStore {
    fn rejecting_verify(message: &str) -> Self {
        Self {
            verify_error: Some(SnapshotError::Rejected(message.to_string())),
            ..Self::default()
        }
    }

    fn failing_verify_transport() -> Self {
        Self {
            verify_error: Some(SnapshotError::Transport("connection reset".to_string())),
            ..Self::default()
        }
    }

    fn rejecting_commit(message: &str) -> Self {
        Self {
            commit_error: Some(SnapshotError::Rejected(message.to_string())),
            ..Self::default()
        }
    }
}

#[async_trait]
impl RemoteStore for SnapshotStore {
    async fn create_drawing(&self, _payload: &DrawingPayload) -> ImportResult<DrawingRecord> {
        Err(ImportError::RemoteRejection(
            "not used by snapshot tests".to_string(),
        ))
    }

    async fn fetch_library(&self) -> ImportResult<Vec<Value>> {
        Ok(Vec::new())
    }

    async fn save_library(&self, _items: &[Value]) -> ImportResult<()> {
        Ok(())
    }

    async fn verify_snapshot(&self, _snapshot: &[u8]) -> SnapshotResult<()> {
        self.verify_calls.fetch_add(1, Ordering::SeqCst);
        match &self.verify_error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    async fn commit_snapshot(&self, _snapshot: &[u8]) -> SnapshotResult<()> {
        self.commit_calls.fetch_add(1, Ordering::SeqCst);
        match &self.commit_error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

fn snapshot() -> Vec<u8> {
    b"SQLite format 3\0".to_vec()
}

#[tokio::test]
async fn verified_and_confirmed_snapshot_is_applied() {
    let store = Arc::new(SnapshotStore::default());
    let mut protocol = SnapshotProtocol::new(store.clone());

    assert_eq!(*protocol.state(), SnapshotState::Idle);
    protocol.begin(snapshot()).await.unwrap();
    assert_eq!(*protocol.state(), SnapshotState::AwaitingConfirmation);

    protocol.confirm().await.unwrap();
    assert_eq!(*protocol.state(), SnapshotState::Applied);
    assert_eq!(store.verify_calls.load(Ordering::SeqCst), 1);
    assert_eq!(store.commit_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn verification_rejection_surfaces_the_endpoint_message() {
    let store = Arc::new(SnapshotStore::rejecting_verify("Incompatible schema version"));
    let mut protocol = SnapshotProtocol::new(store.clone());

    protocol.begin(snapshot()).await.unwrap();
    assert_eq!(
        *protocol.state(),
        SnapshotState::Rejected {
            message: "Incompatible schema version".to_string()
        }
    );
    assert_eq!(store.commit_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn verification_transport_failure_surfaces_a_generic_message() {
    let store = Arc::new(SnapshotStore::failing_verify_transport());
    let mut protocol = SnapshotProtocol::new(store.clone());

    protocol.begin(snapshot()).await.unwrap();
    assert_eq!(
        *protocol.state(),
        SnapshotState::Rejected {
            message: "Failed to verify database file.".to_string()
        }
    );
    assert_eq!(store.commit_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn failed_verification_never_allows_a_commit() {
    let store = Arc::new(SnapshotStore::rejecting_verify("corrupt"));
    let mut protocol = SnapshotProtocol::new(store.clone());

    protocol.begin(snapshot()).await.unwrap();
    let err = protocol.confirm().await.unwrap_err();
    assert_eq!(err, SnapshotError::InvalidState("rejected"));
    assert_eq!(store.commit_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn declining_makes_no_commit_call() {
    let store = Arc::new(SnapshotStore::default());
    let mut protocol = SnapshotProtocol::new(store.clone());

    protocol.begin(snapshot()).await.unwrap();
    protocol.decline().unwrap();
    assert_eq!(*protocol.state(), SnapshotState::Cancelled);
    assert_eq!(store.commit_calls.load(Ordering::SeqCst), 0);

    // Cancelled is terminal; a later confirmation is a state error.
    assert!(protocol.confirm().await.is_err());
    assert_eq!(store.commit_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn commit_rejection_surfaces_the_import_failure_message() {
    let store = Arc::new(SnapshotStore::rejecting_commit("checksum mismatch"));
    let mut protocol = SnapshotProtocol::new(store.clone());

    protocol.begin(snapshot()).await.unwrap();
    protocol.confirm().await.unwrap();
    assert_eq!(
        *protocol.state(),
        SnapshotState::Rejected {
            message: "Failed to import database: checksum mismatch".to_string()
        }
    );
}

#[tokio::test]
async fn applied_protocol_rejects_reconfirmation() {
    let store = Arc::new(SnapshotStore::default());
    let mut protocol = SnapshotProtocol::new(store.clone());

    protocol.begin(snapshot()).await.unwrap();
    protocol.confirm().await.unwrap();
    assert_eq!(*protocol.state(), SnapshotState::Applied);

    let err = protocol.confirm().await.unwrap_err();
    assert_eq!(err, SnapshotError::InvalidState("applied"));
    assert_eq!(store.commit_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn protocol_runs_once_per_instance() {
    let store = Arc::new(SnapshotStore::default());
    let mut protocol = SnapshotProtocol::new(store.clone());

    protocol.begin(snapshot()).await.unwrap();
    let err = protocol.begin(snapshot()).await.unwrap_err();
    assert_eq!(err, SnapshotError::InvalidState("awaiting-confirmation"));
    assert_eq!(store.verify_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn declining_before_verification_is_a_state_error() {
    let store = Arc::new(SnapshotStore::default());
    let mut protocol = SnapshotProtocol::new(store);

    let err = protocol.decline().unwrap_err();
    assert_eq!(err, SnapshotError::InvalidState("idle"));
}
