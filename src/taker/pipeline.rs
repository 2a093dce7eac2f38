//! # Polling Pipeline
//!
//! Drives a [`PollOperation`] against the command transport until it resolves. The loop
//! mirrors an actor's message loop: issue one call, fold the answer into a new snapshot,
//! pause as the snapshot dictates, repeat.

use crate::clients::TransportCommandPort;
use crate::framework::{CommandKind, DelayScheduler};
use crate::model::OrderId;
use crate::taker::state::{Outcome, PollOperation};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Submits a take and polls until the venue gives a terminal answer.
pub struct PollingPipeline {
    transport: Arc<dyn TransportCommandPort>,
    operation: PollOperation,
}

impl PollingPipeline {
    pub fn new(transport: Arc<dyn TransportCommandPort>, operation: PollOperation) -> Self {
        Self {
            transport,
            operation,
        }
    }

    pub fn order_id(&self) -> OrderId {
        self.operation.order().id
    }

    /// Runs until resolved.
    ///
    /// Returns `None` if `cancel` fires first. Once cancelled no further call is issued
    /// and any armed pause is disarmed. A call already in flight is abandoned and its
    /// answer is discarded.
    pub async fn run(self, cancel: CancellationToken) -> Option<Outcome> {
        let delays = DelayScheduler::new(cancel.clone());
        let order_id = self.order_id();
        let Self {
            transport,
            mut operation,
        } = self;
        let mut attempt: u64 = 0;

        loop {
            let command = match operation.next_command() {
                Some(command) => command,
                None => return operation.outcome().cloned(),
            };
            attempt += 1;
            debug!(%order_id, ?command, attempt, "Issuing command");

            let call = async {
                match command {
                    CommandKind::SubmitTake => transport.submit_take(order_id).await,
                    _ => transport.poll_status(order_id).await,
                }
            };
            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => return None,
                result = call => result,
            };

            if let Err(failure) = &result {
                if failure.is_transient() {
                    warn!(%order_id, ?command, attempt, %failure, "Transient transport failure");
                }
            }

            let previous = operation.state().clone();
            operation = operation.absorb(result);
            debug!(%order_id, from = ?previous, to = ?operation.state(), "Poll state");

            if operation.state().is_resolved() {
                continue;
            }
            if delays.pause(operation.pause_before_next(&previous)).await.is_err() {
                return None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::TransportFailure;
    use crate::framework::mock::MockTransport;
    use crate::model::{Order, TakeResponse};
    use std::time::Duration;

    fn pipeline(mock: &MockTransport, id: OrderId) -> PollingPipeline {
        PollingPipeline::new(
            mock.port(),
            PollOperation::start(
                Order::new(id),
                Duration::from_millis(10),
                Duration::from_millis(50),
            ),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_processing_then_accepted() {
        let id = OrderId::new();
        let mock = MockTransport::new();
        mock.expect_submit().return_ok(TakeResponse::Processing);
        mock.expect_poll().return_ok(TakeResponse::Processing);
        mock.expect_poll().return_ok(TakeResponse::Accepted);

        let outcome = pipeline(&mock, id).run(CancellationToken::new()).await;

        assert_eq!(outcome, Some(Outcome::AcceptedPending));
        mock.verify();
    }

    #[tokio::test(start_paused = true)]
    async fn test_declined_submit_stops_immediately() {
        let id = OrderId::new();
        let mock = MockTransport::new();
        mock.expect_submit()
            .return_err(TransportFailure::declined("order_cancelled"));

        let outcome = pipeline(&mock, id).run(CancellationToken::new()).await;

        assert_eq!(outcome, Some(Outcome::Declined("order_cancelled".into())));
        assert_eq!(mock.call_count(CommandKind::SubmitTake), 1);
        assert_eq!(mock.call_count(CommandKind::PollStatus), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_pause_issues_nothing_more() {
        let id = OrderId::new();
        let mock = MockTransport::new();
        mock.expect_submit().return_ok(TakeResponse::Processing);

        let cancel = CancellationToken::new();
        let run = tokio::spawn(pipeline(&mock, id).run(cancel.clone()));
        tokio::time::sleep(Duration::from_millis(20)).await;
        cancel.cancel();

        assert_eq!(run.await.unwrap(), None);
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(mock.call_count(CommandKind::PollStatus), 0);
        mock.verify();
    }

    #[tokio::test(start_paused = true)]
    async fn test_long_transient_streak_still_settles() {
        let id = OrderId::new();
        let mock = MockTransport::new();
        for _ in 0..1_000 {
            mock.expect_submit()
                .return_err(TransportFailure::transient("connection reset"));
        }
        mock.expect_submit().return_ok(TakeResponse::Accepted);

        let outcome = pipeline(&mock, id).run(CancellationToken::new()).await;

        assert_eq!(outcome, Some(Outcome::AcceptedPending));
        assert_eq!(mock.call_count(CommandKind::SubmitTake), 1_001);
        mock.verify();
    }

    #[tokio::test]
    async fn test_already_cancelled_issues_no_call() {
        let mock = MockTransport::new();
        let cancel = CancellationToken::new();
        cancel.cancel();

        assert_eq!(pipeline(&mock, OrderId::new()).run(cancel).await, None);
        assert!(mock.calls().is_empty());
    }
}
