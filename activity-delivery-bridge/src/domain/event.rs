use crate::infrastructure::error::{BridgeError, Result};
use activity_delivery_core::{AttemptGuid, BridgeEventKind, BridgeResult};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::sync::oneshot;

type Slot = Arc<Mutex<Option<oneshot::Sender<BridgeResult>>>>;

/// One-shot completion handle attached to an inbound event.
///
/// Clones share the same slot; the first `settle` wins.
#[derive(Clone)]
pub struct Continuation {
    slot: Slot,
}

impl Continuation {
    pub fn settle(&self, result: BridgeResult) -> Result<()> {
        let sender = self
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .ok_or(BridgeError::AlreadySettled)?;

        sender
            .send(result)
            .map_err(|_| BridgeError::ContinuationDropped)
    }

    pub fn is_settled(&self) -> bool {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }
}

impl fmt::Debug for Continuation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Continuation")
            .field("settled", &self.is_settled())
            .finish()
    }
}

/// Caller side of a [`Continuation`].
///
/// Keeps the continuation alive, so an event that no bridge claims stays
/// pending instead of failing. Use [`PendingResult::timeout`] to bound the wait.
pub struct PendingResult {
    receiver: oneshot::Receiver<BridgeResult>,
    _slot: Slot,
}

impl PendingResult {
    /// Wait at most `duration`; `None` when nothing settled in time
    pub async fn timeout(self, duration: Duration) -> Option<Result<BridgeResult>> {
        tokio::time::timeout(duration, self).await.ok()
    }

    /// Non-blocking check
    pub fn try_result(&mut self) -> Option<BridgeResult> {
        self.receiver.try_recv().ok()
    }
}

impl Future for PendingResult {
    type Output = Result<BridgeResult>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.receiver)
            .poll(cx)
            .map(|r| r.map_err(|_| BridgeError::ContinuationDropped))
    }
}

/// Inbound lifecycle call raised by an activity element
#[derive(Debug, Clone)]
pub struct BridgeEvent {
    pub kind: BridgeEventKind,
    pub attempt_guid: AttemptGuid,
    pub part_attempt_guid: Option<AttemptGuid>,
    pub payload: serde_json::Value,
    pub continuation: Option<Continuation>,
}

impl BridgeEvent {
    /// Fire-and-forget event
    pub fn new(kind: BridgeEventKind, attempt_guid: impl Into<AttemptGuid>) -> Self {
        Self {
            kind,
            attempt_guid: attempt_guid.into(),
            part_attempt_guid: None,
            payload: serde_json::Value::Null,
            continuation: None,
        }
    }

    pub fn for_part(mut self, part_attempt_guid: impl Into<AttemptGuid>) -> Self {
        self.part_attempt_guid = Some(part_attempt_guid.into());
        self
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }

    /// Attach a continuation and return the handle that receives its result
    pub fn with_continuation(mut self) -> (Self, PendingResult) {
        let (sender, receiver) = oneshot::channel();
        let slot: Slot = Arc::new(Mutex::new(Some(sender)));

        self.continuation = Some(Continuation { slot: slot.clone() });
        (
            self,
            PendingResult {
                receiver,
                _slot: slot,
            },
        )
    }
}
