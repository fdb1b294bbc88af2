//! Two-phase replacement of the whole remote store
//!
//! Whole-database replacement is irreversible, so it runs as an explicit
//! state machine: verify against a read-only endpoint, hold for operator
//! confirmation, then commit. The protocol never auto-commits after
//! verification, and rollback of a failed commit is the remote store's
//! responsibility.

use std::sync::Arc;

use tracing::{info, warn};

use crate::errors::{SnapshotError, SnapshotResult};
use crate::store::RemoteStore;

#[derive(Debug, Clone, PartialEq)]
pub enum SnapshotState {
    Idle,
    Verifying,
    AwaitingConfirmation,
    Committing,
    Applied,
    Rejected { message: String },
    Cancelled,
}

impl SnapshotState {
    pub fn name(&self) -> &'static str {
        match self {
            SnapshotState::Idle => "idle",
            SnapshotState::Verifying => "verifying",
            SnapshotState::AwaitingConfirmation => "awaiting-confirmation",
            SnapshotState::Committing => "committing",
            SnapshotState::Applied => "applied",
            SnapshotState::Rejected { .. } => "rejected",
            SnapshotState::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SnapshotState::Applied | SnapshotState::Rejected { .. } | SnapshotState::Cancelled
        )
    }
}

/// One verify-then-commit run. The snapshot bytes are held only between a
/// successful verification and the operator's decision; every terminal
/// state releases them.
pub struct SnapshotProtocol {
    store: Arc<dyn RemoteStore>,
    state: SnapshotState,
    upload: Option<Vec<u8>>,
}

impl SnapshotProtocol {
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        Self {
            store,
            state: SnapshotState::Idle,
            upload: None,
        }
    }

    pub fn state(&self) -> &SnapshotState {
        &self.state
    }

    /// Verify the snapshot against the read-only endpoint.
    ///
    /// On success the protocol holds in `AwaitingConfirmation` until the
    /// operator confirms or declines. A structured rejection surfaces the
    /// endpoint's message verbatim; a transport failure surfaces a generic
    /// verification failure. Both reject the run without any mutation.
    pub async fn begin(&mut self, snapshot: Vec<u8>) -> SnapshotResult<&SnapshotState> {
        if self.state != SnapshotState::Idle {
            return Err(SnapshotError::InvalidState(self.state.name()));
        }
        self.state = SnapshotState::Verifying;
        match self.store.verify_snapshot(&snapshot).await {
            Ok(()) => {
                info!("snapshot verified, awaiting confirmation");
                self.upload = Some(snapshot);
                self.state = SnapshotState::AwaitingConfirmation;
            }
            Err(SnapshotError::Rejected(message)) => {
                warn!(message = %message, "snapshot rejected by verification endpoint");
                self.state = SnapshotState::Rejected { message };
            }
            Err(err) => {
                warn!(error = %err, "snapshot verification failed");
                self.state = SnapshotState::Rejected {
                    message: "Failed to verify database file.".to_string(),
                };
            }
        }
        Ok(&self.state)
    }

    /// Commit the verified snapshot, replacing the entire store contents.
    ///
    /// Only legal in `AwaitingConfirmation`; the state check also blocks a
    /// second confirmation while a commit is in flight.
    pub async fn confirm(&mut self) -> SnapshotResult<&SnapshotState> {
        if self.state != SnapshotState::AwaitingConfirmation {
            return Err(SnapshotError::InvalidState(self.state.name()));
        }
        let snapshot = self
            .upload
            .take()
            .ok_or(SnapshotError::InvalidState("awaiting-confirmation"))?;
        self.state = SnapshotState::Committing;
        match self.store.commit_snapshot(&snapshot).await {
            Ok(()) => {
                info!("snapshot applied");
                self.state = SnapshotState::Applied;
            }
            Err(err) => {
                let message = match err {
                    SnapshotError::Rejected(message) | SnapshotError::Transport(message) => message,
                    other => other.to_string(),
                };
                warn!(message = %message, "snapshot commit failed");
                self.state = SnapshotState::Rejected {
                    message: format!("Failed to import database: {}", message),
                };
            }
        }
        Ok(&self.state)
    }

    /// Decline the replacement; no commit call is made and the snapshot is
    /// discarded.
    pub fn decline(&mut self) -> SnapshotResult<&SnapshotState> {
        if self.state != SnapshotState::AwaitingConfirmation {
            return Err(SnapshotError::InvalidState(self.state.name()));
        }
        self.upload = None;
        info!("snapshot import declined, no commit issued");
        self.state = SnapshotState::Cancelled;
        Ok(&self.state)
    }
}
