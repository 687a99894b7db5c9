// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Query lifecycle state machine
//!
//! Transitions are monotonic: once a query reaches a terminal state no
//! further transition is accepted. Observers wait on a `watch` channel.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::watch;

use super::error::ExecutionError;
use crate::coordinator::QueryId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QueryState {
    Queued,
    Planning,
    Starting,
    Running,
    Finishing,
    Finished,
    Failed,
    Canceled,
}

impl QueryState {
    pub fn is_done(&self) -> bool {
        matches!(
            self,
            QueryState::Finished | QueryState::Failed | QueryState::Canceled
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QueryState::Queued => "QUEUED",
            QueryState::Planning => "PLANNING",
            QueryState::Starting => "STARTING",
            QueryState::Running => "RUNNING",
            QueryState::Finishing => "FINISHING",
            QueryState::Finished => "FINISHED",
            QueryState::Failed => "FAILED",
            QueryState::Canceled => "CANCELED",
        }
    }
}

impl fmt::Display for QueryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub struct QueryStateMachine {
    query_id: QueryId,
    state: watch::Sender<QueryState>,
    failure: Mutex<Option<ExecutionError>>,
    created_at: chrono::DateTime<chrono::Utc>,
    end_time: Mutex<Option<chrono::DateTime<chrono::Utc>>>,
}

impl QueryStateMachine {
    pub fn new(query_id: QueryId) -> Self {
        let (state, _) = watch::channel(QueryState::Queued);
        Self {
            query_id,
            state,
            failure: Mutex::new(None),
            created_at: chrono::Utc::now(),
            end_time: Mutex::new(None),
        }
    }

    pub fn query_id(&self) -> &QueryId {
        &self.query_id
    }

    pub fn state(&self) -> QueryState {
        *self.state.borrow()
    }

    pub fn created_at(&self) -> chrono::DateTime<chrono::Utc> {
        self.created_at
    }

    pub fn end_time(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        *self.end_time.lock()
    }

    pub fn failure(&self) -> Option<ExecutionError> {
        self.failure.lock().clone()
    }

    /// Move to a non-terminal state. Returns false if the query is already done.
    pub fn transition_to(&self, next: QueryState) -> bool {
        debug_assert!(!next.is_done(), "use finish/fail/cancel for terminal states");
        let changed = self.state.send_if_modified(|current| {
            if current.is_done() || *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
        if changed {
            log::debug!("Query {} is {}", self.query_id, next);
        }
        changed
    }

    pub fn finish(&self) -> bool {
        self.terminate(QueryState::Finished, None)
    }

    /// Record `error` and move to Failed. The first terminal transition wins.
    pub fn fail(&self, error: ExecutionError) -> bool {
        self.terminate(QueryState::Failed, Some(error))
    }

    pub fn cancel(&self, reason: ExecutionError) -> bool {
        self.terminate(QueryState::Canceled, Some(reason))
    }

    fn terminate(&self, terminal: QueryState, error: Option<ExecutionError>) -> bool {
        let mut failure = self.failure.lock();
        let changed = self.state.send_if_modified(|current| {
            if current.is_done() {
                false
            } else {
                *current = terminal;
                true
            }
        });
        if changed {
            *failure = error;
            *self.end_time.lock() = Some(chrono::Utc::now());
            log::debug!("Query {} is {}", self.query_id, terminal);
        }
        changed
    }

    pub fn subscribe(&self) -> watch::Receiver<QueryState> {
        self.state.subscribe()
    }

    /// Wait until the query reaches a terminal state and return it
    pub async fn wait_for_done(&self) -> QueryState {
        let mut receiver = self.subscribe();
        loop {
            let current = *receiver.borrow_and_update();
            if current.is_done() {
                return current;
            }
            if receiver.changed().await.is_err() {
                return self.state();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_state_is_final() {
        let machine = QueryStateMachine::new(QueryId::from("q1"));
        assert!(machine.transition_to(QueryState::Planning));
        assert!(machine.transition_to(QueryState::Running));
        assert!(machine.fail(ExecutionError::Internal("boom".to_string())));

        assert!(!machine.finish());
        assert!(!machine.transition_to(QueryState::Running));
        assert!(!machine.cancel(ExecutionError::Canceled("late".to_string())));
        assert_eq!(machine.state(), QueryState::Failed);
        assert_eq!(
            machine.failure().map(|e| e.to_string()),
            Some("Internal error: boom".to_string())
        );
        assert!(machine.end_time().is_some());
    }

    #[tokio::test]
    async fn test_wait_for_done() {
        let machine = std::sync::Arc::new(QueryStateMachine::new(QueryId::from("q2")));
        let waiter = {
            let machine = machine.clone();
            tokio::spawn(async move { machine.wait_for_done().await })
        };
        machine.transition_to(QueryState::Running);
        machine.finish();
        assert_eq!(waiter.await.unwrap(), QueryState::Finished);
        assert!(machine.failure().is_none());
    }
}
