//! Mutation orchestrator.
//!
//! Every state-changing operation runs through [`MutationOrchestrator::execute`]:
//!
//! 1. validate the request (no storage access)
//! 2. open a transaction
//! 3. apply the mutation (lock checks and writes)
//! 4. commit, or roll back on the first error
//! 5. notify connected clients, only after a successful commit
//!
//! A failed mutation therefore never produces a notification, and a
//! notification failure never undoes a commit.

use std::sync::Arc;

use async_trait::async_trait;

use super::errors::TaskboardError;
use crate::domain::foundation::{DomainError, ValidationError};
use crate::ports::{ChangeMessage, ChangeNotifier, ClientIdentity, StoreTransaction, TaskboardStore};

/// Result of a mutation that is ready to commit.
#[derive(Debug, Clone)]
pub struct Committed<T> {
    pub output: T,
    /// Notifications to send once the commit succeeds, in order.
    pub changes: Vec<ChangeMessage>,
}

impl<T> Committed<T> {
    pub fn new(output: T, changes: Vec<ChangeMessage>) -> Self {
        Self { output, changes }
    }
}

/// A single state-changing operation.
#[async_trait]
pub trait Mutation: Send {
    type Output: Send;

    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Input checks that need no storage access.
    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }

    /// Perform the reads, lock checks, and writes inside `tx`.
    async fn apply(
        self,
        tx: &mut dyn StoreTransaction,
    ) -> Result<Committed<Self::Output>, DomainError>;
}

/// Runs mutations with transactional and notification guarantees.
pub struct MutationOrchestrator {
    store: Arc<dyn TaskboardStore>,
    notifier: Arc<dyn ChangeNotifier>,
}

impl MutationOrchestrator {
    pub fn new(store: Arc<dyn TaskboardStore>, notifier: Arc<dyn ChangeNotifier>) -> Self {
        Self { store, notifier }
    }

    pub async fn execute<M: Mutation>(
        &self,
        origin: Option<&ClientIdentity>,
        mutation: M,
    ) -> Result<M::Output, TaskboardError> {
        let name = mutation.name();
        mutation.validate()?;

        let mut tx = self.store.begin().await?;
        let committed = match mutation.apply(&mut *tx).await {
            Ok(committed) => committed,
            Err(err) => {
                tracing::debug!(mutation = name, error = %err, "mutation rejected");
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::warn!(mutation = name, error = %rollback_err, "rollback failed");
                }
                return Err(err.into());
            }
        };

        if let Err(err) = tx.commit().await {
            if err.code.is_conflict() {
                tracing::debug!(mutation = name, error = %err, "commit lost a race");
                return Err(err.into());
            }
            tracing::error!(mutation = name, error = %err, "commit failed");
            return Err(TaskboardError::infrastructure(err.message));
        }

        tracing::info!(
            mutation = name,
            origin = origin.map(ClientIdentity::as_str),
            changes = committed.changes.len(),
            "mutation committed"
        );

        for change in &committed.changes {
            self.notifier.notify(origin, change).await;
        }

        Ok(committed.output)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryTaskboardStore;
    use crate::domain::board::SystemBoard;
    use crate::domain::foundation::{BoardId, ErrorCode};
    use crate::domain::optimistic_lock::Versioned;
    use std::sync::Mutex;

    /// Records every notification for assertions.
    #[derive(Default)]
    pub(crate) struct RecordingNotifier {
        sent: Mutex<Vec<(Option<String>, String)>>,
    }

    impl RecordingNotifier {
        pub(crate) fn sent(&self) -> Vec<(Option<String>, String)> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ChangeNotifier for RecordingNotifier {
        async fn notify(&self, origin: Option<&ClientIdentity>, change: &ChangeMessage) {
            self.sent
                .lock()
                .unwrap()
                .push((origin.map(|o| o.as_str().to_string()), change.to_string()));
        }
    }

    struct TouchBoard {
        board_id: BoardId,
        fail: bool,
    }

    #[async_trait]
    impl Mutation for TouchBoard {
        type Output = ();

        fn name(&self) -> &'static str {
            "touch_board"
        }

        async fn apply(self, tx: &mut dyn StoreTransaction) -> Result<Committed<()>, DomainError> {
            let board = tx
                .find_board(&self.board_id)
                .await?
                .ok_or_else(|| DomainError::new(ErrorCode::BoardNotFound, "Board not found"))?;
            tx.update_board(&board, board.version()).await?;
            if self.fail {
                return Err(DomainError::new(ErrorCode::StaleOrder, "forced"));
            }
            Ok(Committed::new((), vec![ChangeMessage::boards([&self.board_id])]))
        }
    }

    fn setup() -> (Arc<InMemoryTaskboardStore>, Arc<RecordingNotifier>, MutationOrchestrator) {
        let store = Arc::new(InMemoryTaskboardStore::with_system_boards());
        let notifier = Arc::new(RecordingNotifier::default());
        let orchestrator = MutationOrchestrator::new(store.clone(), notifier.clone());
        (store, notifier, orchestrator)
    }

    #[tokio::test]
    async fn notifies_after_commit_with_origin() {
        let (_store, notifier, orchestrator) = setup();
        let origin = ClientIdentity::parse(Some("client-a"));

        orchestrator
            .execute(
                origin.as_ref(),
                TouchBoard {
                    board_id: SystemBoard::icebox(),
                    fail: false,
                },
            )
            .await
            .unwrap();

        assert_eq!(
            notifier.sent(),
            vec![(Some("client-a".to_string()), "UPDATE_BOARDS icebox".to_string())]
        );
    }

    #[tokio::test]
    async fn failed_mutation_sends_nothing() {
        let (_store, notifier, orchestrator) = setup();

        let err = orchestrator
            .execute(
                None,
                TouchBoard {
                    board_id: SystemBoard::icebox(),
                    fail: true,
                },
            )
            .await
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::StaleOrder);
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn commit_failure_is_internal_and_silent() {
        let (store, notifier, orchestrator) = setup();
        store.fail_next_commit();

        let err = orchestrator
            .execute(
                None,
                TouchBoard {
                    board_id: SystemBoard::icebox(),
                    fail: false,
                },
            )
            .await
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::InternalError);
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn commit_lost_to_a_racing_writer_is_a_conflict() {
        let (store, notifier, orchestrator) = setup();
        store.fail_next_commit_with(DomainError::concurrent_update("deadlock detected"));

        let err = orchestrator
            .execute(
                None,
                TouchBoard {
                    board_id: SystemBoard::icebox(),
                    fail: false,
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, TaskboardError::Conflict { .. }));
        assert_eq!(err.code(), ErrorCode::ConcurrentUpdate);
        assert!(notifier.sent().is_empty());
    }
}
