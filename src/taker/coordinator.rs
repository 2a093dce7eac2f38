//! # Order Taker
//!
//! The public entry point. A take runs the [`RaceCoordinator`] and, on acceptance, hands
//! off to the [`DetailsRetriever`]. Everything an operation does happens on the caller's
//! task, so concurrent takes for different orders never share state beyond the two ports.

use crate::clients::{PushEventPort, TransportCommandPort};
use crate::model::{AcceptedOrder, Order};
use crate::taker::details::DetailsRetriever;
use crate::taker::error::OrderTakingFailure;
use crate::taker::pipeline::PollingPipeline;
use crate::taker::race::RaceCoordinator;
use crate::taker::state::{Outcome, PollOperation};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

/// Default pause between polls and between details retries.
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_millis(1);

/// Default pause between a `Processing` submit answer and the first poll.
pub const DEFAULT_INITIAL_POLL_DELAY: Duration = Duration::from_millis(1);

/// Pacing of one take operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TakeOptions {
    pub retry_interval: Duration,
    pub initial_poll_delay: Duration,
}

impl Default for TakeOptions {
    fn default() -> Self {
        Self {
            retry_interval: DEFAULT_RETRY_INTERVAL,
            initial_poll_delay: DEFAULT_INITIAL_POLL_DELAY,
        }
    }
}

impl TakeOptions {
    pub fn with_retry_interval(mut self, retry_interval: Duration) -> Self {
        self.retry_interval = retry_interval;
        self
    }

    pub fn with_initial_poll_delay(mut self, initial_poll_delay: Duration) -> Self {
        self.initial_poll_delay = initial_poll_delay;
        self
    }
}

/// Takes orders from a venue reachable through a command port and a push port.
///
/// Cheap to clone; both ports are shared by every operation.
#[derive(Clone)]
pub struct OrderTaker {
    transport: Arc<dyn TransportCommandPort>,
    push: Arc<dyn PushEventPort>,
}

impl OrderTaker {
    pub fn new(transport: Arc<dyn TransportCommandPort>, push: Arc<dyn PushEventPort>) -> Self {
        Self { transport, push }
    }

    /// Takes `order`, settling on exactly one result.
    ///
    /// Dropping the returned future cancels the whole operation: pending calls are
    /// abandoned, pauses are disarmed and push subscriptions are released.
    pub async fn take(
        &self,
        order: &Order,
        options: TakeOptions,
    ) -> Result<AcceptedOrder, OrderTakingFailure> {
        let cancel = CancellationToken::new();
        match self.take_cancellable(order, options, cancel).await {
            Some(result) => result,
            // a cancelled take never settles
            None => std::future::pending().await,
        }
    }

    /// Takes `order` unless `cancel` fires first, in which case `None` is returned and no
    /// result is ever produced.
    #[instrument(skip(self, order, options, cancel), fields(order_id = %order.id))]
    pub async fn take_cancellable(
        &self,
        order: &Order,
        options: TakeOptions,
        cancel: CancellationToken,
    ) -> Option<Result<AcceptedOrder, OrderTakingFailure>> {
        info!(?options, "Taking order");

        let operation = PollOperation::start(
            order.clone(),
            options.retry_interval,
            options.initial_poll_delay,
        );
        let pipeline = PollingPipeline::new(self.transport.clone(), operation);
        let race = RaceCoordinator::new(pipeline, self.push.as_ref());

        match race.run(cancel.clone()).await? {
            Outcome::Declined(reason) => {
                info!(%reason, "Order declined");
                Some(Err(OrderTakingFailure::new(reason)))
            }
            Outcome::AcceptedPending => {
                let retriever =
                    DetailsRetriever::new(self.transport.clone(), order.id, options.retry_interval);
                let accepted = retriever.run(cancel).await?;
                info!("Order taken");
                Some(Ok(accepted))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::PushHub;
    use crate::framework::mock::MockTransport;
    use crate::model::{OrderDetails, OrderId, TakeResponse};

    #[test]
    fn test_default_options() {
        let options = TakeOptions::default();
        assert_eq!(options.retry_interval, Duration::from_millis(1));
        assert_eq!(options.initial_poll_delay, Duration::from_millis(1));

        let tuned = options
            .with_retry_interval(Duration::from_millis(200))
            .with_initial_poll_delay(Duration::from_secs(1));
        assert_eq!(tuned.retry_interval, Duration::from_millis(200));
        assert_eq!(tuned.initial_poll_delay, Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_take_accepted_then_details() {
        let id = OrderId::new();
        let mock = MockTransport::new();
        mock.expect_submit().return_ok(TakeResponse::Accepted);
        mock.expect_details().return_ok(OrderDetails::new(id));

        let taker = OrderTaker::new(mock.port(), Arc::new(PushHub::default()));
        let accepted = taker
            .take(&Order::new(id), TakeOptions::default())
            .await
            .unwrap();

        assert_eq!(accepted.id, id);
        mock.verify();
    }

    #[tokio::test(start_paused = true)]
    async fn test_take_declined_settles_with_reason() {
        let id = OrderId::new();
        let mock = MockTransport::new();
        mock.expect_submit()
            .return_ok(TakeResponse::Declined("sold_out".into()));

        let taker = OrderTaker::new(mock.port(), Arc::new(PushHub::default()));
        let failure = taker
            .take(&Order::new(id), TakeOptions::default())
            .await
            .unwrap_err();

        assert_eq!(failure.reason, "sold_out");
        mock.verify();
    }

    #[tokio::test(start_paused = true)]
    async fn test_take_cancellable_returns_none_on_cancel() {
        let id = OrderId::new();
        let mock = MockTransport::new();
        mock.expect_submit()
            .after(Duration::from_secs(60))
            .return_ok(TakeResponse::Accepted);

        let taker = OrderTaker::new(mock.port(), Arc::new(PushHub::default()));
        let cancel = CancellationToken::new();
        let pending = {
            let taker = taker.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move {
                taker
                    .take_cancellable(&Order::new(id), TakeOptions::default(), cancel)
                    .await
            })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        cancel.cancel();

        assert_eq!(pending.await.unwrap(), None);
    }
}
