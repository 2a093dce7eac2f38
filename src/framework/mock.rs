//! # Mock Transport & Testing Guide
//!
//! [`MockTransport`] answers the command channel from a script instead of a venue. It lets
//! tests decide, call by call, what the venue says and *when* it says it, and it records
//! every call with a timestamp so pacing can be asserted exactly.
//!
//! ## When to use which tool
//!
//! | Tool | Use Case |
//! |------|----------|
//! | [`MockTransport`] | Scripted scenarios: "submit fails, then is accepted" |
//! | [`create_mock_transport`] + `expect_*` helpers | Hand-timed races where the test must hold a responder and decide the exact moment it answers |
//! | [`SimulatedVenue`](crate::lifecycle::venue::SimulatedVenue) | Full-system tests |
//!
//! ## Scripted example
//!
//! ```rust
//! use order_taker::framework::mock::MockTransport;
//! use order_taker::model::{OrderDetails, OrderId, TakeResponse};
//! use order_taker::clients::{TransportCommandPort, TransportFailure};
//!
//! #[tokio::main]
//! async fn main() {
//!     let id = OrderId::new();
//!     let mock = MockTransport::new();
//!     mock.expect_submit().return_err(TransportFailure::transient("502"));
//!     mock.expect_submit().return_ok(TakeResponse::Accepted);
//!     mock.expect_details().return_ok(OrderDetails::new(id));
//!
//!     let port = mock.port();
//!     assert!(port.submit_take(id).await.is_err());
//!     assert_eq!(port.submit_take(id).await, Ok(TakeResponse::Accepted));
//!     assert!(port.fetch_details(id).await.is_ok());
//!
//!     mock.verify();
//! }
//! ```
//!
//! ## Timing
//!
//! Combine with `#[tokio::test(start_paused = true)]`: the clock only moves when every task
//! is idle, so [`MockTransport::call_times`] reports exact virtual instants and
//! [`TakeExpectationBuilder::after`] delays are honoured to the tick.
//!
//! ## Unexpected calls
//!
//! A call with no scripted answer is parked: it is recorded and never answered. The caller
//! therefore hangs instead of spinning on retries, and [`MockTransport::verify`] reports it.

use crate::clients::{TransportCommandPort, TransportFailure};
use crate::framework::client::CommandClient;
use crate::framework::message::{CommandKind, CommandRequest, Response};
use crate::model::{OrderDetails, OrderId, TakeResponse};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::warn;

// =============================================================================
// EXPECTATION BUILDER API
// =============================================================================

/// A scripted answer waiting in a per-command queue.
enum Scripted {
    Take {
        response: Result<TakeResponse, TransportFailure>,
        after: Duration,
    },
    Details {
        response: Result<OrderDetails, TransportFailure>,
        after: Duration,
    },
}

type Queues = Arc<Mutex<HashMap<CommandKind, VecDeque<Scripted>>>>;

/// One call observed by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub kind: CommandKind,
    pub order_id: OrderId,
    pub at: Instant,
}

/// A scripted transport with expectation tracking.
///
/// Each command kind has its own FIFO of answers; calls consume them in order.
pub struct MockTransport {
    client: CommandClient,
    queues: Queues,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    unexpected: Arc<Mutex<Vec<CommandRequest>>>,
    discarded: Arc<AtomicUsize>,
    _handle: tokio::task::JoinHandle<()>,
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTransport {
    /// Creates a mock with no expectations. Must be called inside a Tokio runtime.
    pub fn new() -> Self {
        let (client, mut receiver) = CommandClient::channel(100);
        let queues: Queues = Arc::new(Mutex::new(HashMap::new()));
        let calls = Arc::new(Mutex::new(Vec::new()));
        let unexpected = Arc::new(Mutex::new(Vec::new()));
        let discarded = Arc::new(AtomicUsize::new(0));

        let handle = {
            let queues = queues.clone();
            let calls = calls.clone();
            let unexpected = unexpected.clone();
            let discarded = discarded.clone();

            tokio::spawn(async move {
                while let Some(request) = receiver.recv().await {
                    let kind = request.kind();
                    calls.lock().unwrap().push(RecordedCall {
                        kind,
                        order_id: request.order_id(),
                        at: Instant::now(),
                    });

                    let scripted = queues
                        .lock()
                        .unwrap()
                        .get_mut(&kind)
                        .and_then(VecDeque::pop_front);

                    match (request, scripted) {
                        (
                            CommandRequest::SubmitTake { respond_to, .. }
                            | CommandRequest::PollStatus { respond_to, .. },
                            Some(Scripted::Take { response, after }),
                        ) => reply(respond_to, response, after, discarded.clone()),
                        (
                            CommandRequest::FetchDetails { respond_to, .. },
                            Some(Scripted::Details { response, after }),
                        ) => reply(respond_to, response, after, discarded.clone()),
                        (request, _) => {
                            warn!(?kind, order_id = %request.order_id(), "Unexpected command, parking it");
                            unexpected.lock().unwrap().push(request);
                        }
                    }
                }
            })
        };

        Self {
            client,
            queues,
            calls,
            unexpected,
            discarded,
            _handle: handle,
        }
    }

    /// Returns the channel client.
    pub fn client(&self) -> CommandClient {
        self.client.clone()
    }

    /// Returns the client as a shareable port.
    pub fn port(&self) -> Arc<dyn TransportCommandPort> {
        Arc::new(self.client.clone())
    }

    /// Queues an answer for the next unanswered submit-take.
    pub fn expect_submit(&self) -> TakeExpectationBuilder {
        TakeExpectationBuilder {
            kind: CommandKind::SubmitTake,
            after: Duration::ZERO,
            queues: self.queues.clone(),
        }
    }

    /// Queues an answer for the next unanswered poll-status.
    pub fn expect_poll(&self) -> TakeExpectationBuilder {
        TakeExpectationBuilder {
            kind: CommandKind::PollStatus,
            after: Duration::ZERO,
            queues: self.queues.clone(),
        }
    }

    /// Queues an answer for the next unanswered fetch-details.
    pub fn expect_details(&self) -> DetailsExpectationBuilder {
        DetailsExpectationBuilder {
            after: Duration::ZERO,
            queues: self.queues.clone(),
        }
    }

    /// Every call seen so far, in arrival order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Arrival instants of every call of one kind.
    pub fn call_times(&self, kind: CommandKind) -> Vec<Instant> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.kind == kind)
            .map(|call| call.at)
            .collect()
    }

    pub fn call_count(&self, kind: CommandKind) -> usize {
        self.call_times(kind).len()
    }

    /// Answers that were produced after their caller had stopped listening.
    pub fn discarded(&self) -> usize {
        self.discarded.load(Ordering::SeqCst)
    }

    /// Panics unless every scripted answer was consumed and no call went unanswered.
    pub fn verify(&self) {
        let remaining: usize = self.queues.lock().unwrap().values().map(VecDeque::len).sum();
        if remaining > 0 {
            panic!("Not all expectations were met. {} remaining", remaining);
        }
        let unexpected = self.unexpected.lock().unwrap();
        if !unexpected.is_empty() {
            let kinds: Vec<CommandKind> = unexpected.iter().map(CommandRequest::kind).collect();
            panic!("Unexpected calls: {:?}", kinds);
        }
    }
}

fn reply<T: Send + 'static>(
    respond_to: Response<T>,
    response: Result<T, TransportFailure>,
    after: Duration,
    discarded: Arc<AtomicUsize>,
) {
    if after.is_zero() {
        if respond_to.send(response).is_err() {
            discarded.fetch_add(1, Ordering::SeqCst);
        }
        return;
    }
    tokio::spawn(async move {
        tokio::time::sleep(after).await;
        if respond_to.send(response).is_err() {
            discarded.fetch_add(1, Ordering::SeqCst);
        }
    });
}

/// Builder for submit-take and poll-status answers.
pub struct TakeExpectationBuilder {
    kind: CommandKind,
    after: Duration,
    queues: Queues,
}

impl TakeExpectationBuilder {
    /// Delays the answer by `delay` after the call arrives.
    pub fn after(mut self, delay: Duration) -> Self {
        self.after = delay;
        self
    }

    pub fn return_ok(self, response: TakeResponse) {
        self.push(Ok(response));
    }

    pub fn return_err(self, failure: TransportFailure) {
        self.push(Err(failure));
    }

    fn push(self, response: Result<TakeResponse, TransportFailure>) {
        let mut queues = self.queues.lock().unwrap();
        queues.entry(self.kind).or_default().push_back(Scripted::Take {
            response,
            after: self.after,
        });
    }
}

/// Builder for fetch-details answers.
pub struct DetailsExpectationBuilder {
    after: Duration,
    queues: Queues,
}

impl DetailsExpectationBuilder {
    /// Delays the answer by `delay` after the call arrives.
    pub fn after(mut self, delay: Duration) -> Self {
        self.after = delay;
        self
    }

    pub fn return_ok(self, details: OrderDetails) {
        self.push(Ok(details));
    }

    pub fn return_err(self, failure: TransportFailure) {
        self.push(Err(failure));
    }

    fn push(self, response: Result<OrderDetails, TransportFailure>) {
        let mut queues = self.queues.lock().unwrap();
        queues
            .entry(CommandKind::FetchDetails)
            .or_default()
            .push_back(Scripted::Details {
                response,
                after: self.after,
            });
    }
}

// =============================================================================
// RAW HELPERS
// =============================================================================

/// Creates a command client and the receiver the test services by hand.
///
/// Use this when a test needs to hold a responder and pick the exact moment it answers,
/// e.g. to make a polling answer and a push event land in the same scheduling tick.
pub fn create_mock_transport(buffer_size: usize) -> (CommandClient, mpsc::Receiver<CommandRequest>) {
    CommandClient::channel(buffer_size)
}

/// Helper to verify that the next message is a SubmitTake request
pub async fn expect_submit(
    receiver: &mut mpsc::Receiver<CommandRequest>,
) -> Option<(OrderId, Response<TakeResponse>)> {
    match receiver.recv().await {
        Some(CommandRequest::SubmitTake {
            order_id,
            respond_to,
        }) => Some((order_id, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a PollStatus request
pub async fn expect_poll(
    receiver: &mut mpsc::Receiver<CommandRequest>,
) -> Option<(OrderId, Response<TakeResponse>)> {
    match receiver.recv().await {
        Some(CommandRequest::PollStatus {
            order_id,
            respond_to,
        }) => Some((order_id, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a FetchDetails request
pub async fn expect_details(
    receiver: &mut mpsc::Receiver<CommandRequest>,
) -> Option<(OrderId, Response<OrderDetails>)> {
    match receiver.recv().await {
        Some(CommandRequest::FetchDetails {
            order_id,
            respond_to,
        }) => Some((order_id, respond_to)),
        _ => None,
    }
}
