//! # Command Client
//!
//! A channel-backed [`TransportCommandPort`]. Each call sends one [`CommandRequest`] over an
//! `mpsc` channel and awaits the answer on its own `oneshot` channel.

use crate::clients::{TransportCommandPort, TransportFailure};
use crate::framework::message::{CommandRequest, Response};
use crate::model::{OrderDetails, OrderId, TakeResponse};
use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

/// A cheap-to-clone client for whatever services the command channel.
///
/// Channel problems are reported as *transient* transport failures: a closed channel or a
/// dropped responder says nothing about the order itself, so the coordinator retries.
#[derive(Clone)]
pub struct CommandClient {
    sender: mpsc::Sender<CommandRequest>,
}

impl CommandClient {
    pub fn new(sender: mpsc::Sender<CommandRequest>) -> Self {
        Self { sender }
    }

    /// Creates a client plus the receiving end that must be serviced.
    pub fn channel(buffer_size: usize) -> (Self, mpsc::Receiver<CommandRequest>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        (Self::new(sender), receiver)
    }

    async fn exchange<T>(
        &self,
        build: impl FnOnce(Response<T>) -> CommandRequest,
    ) -> Result<T, TransportFailure> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| TransportFailure::transient("command channel closed"))?;
        response
            .await
            .map_err(|_| TransportFailure::transient("command responder dropped"))?
    }
}

#[async_trait]
impl TransportCommandPort for CommandClient {
    async fn submit_take(&self, order_id: OrderId) -> Result<TakeResponse, TransportFailure> {
        self.exchange(|respond_to| CommandRequest::SubmitTake {
            order_id,
            respond_to,
        })
        .await
    }

    async fn poll_status(&self, order_id: OrderId) -> Result<TakeResponse, TransportFailure> {
        self.exchange(|respond_to| CommandRequest::PollStatus {
            order_id,
            respond_to,
        })
        .await
    }

    async fn fetch_details(&self, order_id: OrderId) -> Result<OrderDetails, TransportFailure> {
        self.exchange(|respond_to| CommandRequest::FetchDetails {
            order_id,
            respond_to,
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_submit_round_trips_through_channel() {
        let (client, mut receiver) = CommandClient::channel(4);
        let id = OrderId::new();

        let call = tokio::spawn(async move { client.submit_take(id).await });

        match receiver.recv().await {
            Some(CommandRequest::SubmitTake {
                order_id,
                respond_to,
            }) => {
                assert_eq!(order_id, id);
                respond_to.send(Ok(TakeResponse::Processing)).unwrap();
            }
            other => panic!("Expected SubmitTake, got {:?}", other),
        }

        assert_eq!(call.await.unwrap(), Ok(TakeResponse::Processing));
    }

    #[tokio::test]
    async fn test_closed_channel_is_transient() {
        let (client, receiver) = CommandClient::channel(4);
        drop(receiver);

        let err = client.poll_status(OrderId::new()).await.unwrap_err();
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_dropped_responder_is_transient() {
        let (client, mut receiver) = CommandClient::channel(4);

        let call = tokio::spawn(async move { client.fetch_details(OrderId::new()).await });
        let request = receiver.recv().await.unwrap();
        drop(request);

        let err = call.await.unwrap().unwrap_err();
        assert!(err.is_transient());
    }
}
