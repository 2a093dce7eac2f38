//! # Simulated Venue
//!
//! An in-process stand-in for the remote venue. It is an actor in the usual sense: it owns
//! its store of listed orders and the receiving end of the command channel, and answers
//! one [`CommandRequest`] at a time, so the store needs no lock.
//!
//! Its behaviour is driven by a [`VenueScript`]: how many `Processing` answers precede each
//! decision, how many submits and details fetches fail transiently first, and whether
//! decisions are also announced on the push feeds.

use crate::clients::{PushHub, TransportFailure};
use crate::framework::{CommandClient, CommandRequest};
use crate::model::{OrderDetails, OrderId, TakeResponse};
use serde::Deserialize;
use std::collections::HashMap;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Decline reason for orders the venue has never listed.
pub const UNKNOWN_ORDER: &str = "unknown_order";

/// How the venue behaves for every listed order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct VenueScript {
    /// `Processing` answers (the submit counts as one) before the decision.
    pub processing_rounds: u32,
    /// Transient failures of the first submits of each order.
    pub flaky_submits: u32,
    /// Transient failures of the first details fetches of each order.
    pub details_failures: u32,
    /// Also publish each decision on the push feeds.
    pub push_decisions: bool,
}

/// What the venue will eventually say about a listed order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Accept,
    Decline(String),
}

#[derive(Debug)]
struct VenueOrder {
    decision: Decision,
    rounds_left: u32,
    submits_to_fail: u32,
    details_to_fail: u32,
    submitted: bool,
    decided: bool,
}

impl VenueOrder {
    fn new(decision: Decision, script: &VenueScript) -> Self {
        Self {
            decision,
            rounds_left: script.processing_rounds,
            submits_to_fail: script.flaky_submits,
            details_to_fail: script.details_failures,
            submitted: false,
            decided: false,
        }
    }

    fn advance(&mut self) -> TakeResponse {
        if self.rounds_left > 0 {
            self.rounds_left -= 1;
            return TakeResponse::Processing;
        }
        self.decided = true;
        match &self.decision {
            Decision::Accept => TakeResponse::Accepted,
            Decision::Decline(reason) => TakeResponse::Declined(reason.clone()),
        }
    }
}

/// The venue actor.
pub struct SimulatedVenue {
    receiver: mpsc::Receiver<CommandRequest>,
    store: HashMap<OrderId, VenueOrder>,
    script: VenueScript,
    hub: PushHub,
}

impl SimulatedVenue {
    /// Creates the venue and the client that talks to it. The venue does nothing until
    /// [`run`](Self::run) is spawned.
    pub fn new(buffer_size: usize, script: VenueScript, hub: PushHub) -> (Self, CommandClient) {
        let (client, receiver) = CommandClient::channel(buffer_size);
        let venue = Self {
            receiver,
            store: HashMap::new(),
            script,
            hub,
        };
        (venue, client)
    }

    /// Lists an order with the decision the venue will reach for it.
    pub fn list(&mut self, order_id: OrderId, decision: Decision) {
        self.store
            .insert(order_id, VenueOrder::new(decision, &self.script));
    }

    /// Serves requests until every client is dropped.
    pub async fn run(mut self) {
        info!(orders = self.store.len(), script = ?self.script, "Venue started");

        while let Some(request) = self.receiver.recv().await {
            match request {
                CommandRequest::SubmitTake {
                    order_id,
                    respond_to,
                } => {
                    let answer = self.on_submit(order_id);
                    debug!(%order_id, ?answer, "SubmitTake");
                    let _ = respond_to.send(answer);
                }
                CommandRequest::PollStatus {
                    order_id,
                    respond_to,
                } => {
                    let answer = self.on_poll(order_id);
                    debug!(%order_id, ?answer, "PollStatus");
                    let _ = respond_to.send(answer);
                }
                CommandRequest::FetchDetails {
                    order_id,
                    respond_to,
                } => {
                    let answer = self.on_details(order_id);
                    debug!(%order_id, ok = answer.is_ok(), "FetchDetails");
                    let _ = respond_to.send(answer);
                }
            }
        }

        let decided = self.store.values().filter(|order| order.decided).count();
        info!(orders = self.store.len(), decided, "Venue shutdown");
    }

    fn on_submit(&mut self, order_id: OrderId) -> Result<TakeResponse, TransportFailure> {
        let Some(order) = self.store.get_mut(&order_id) else {
            warn!(%order_id, "Submit for unlisted order");
            return Err(TransportFailure::declined(UNKNOWN_ORDER));
        };
        if order.submits_to_fail > 0 {
            order.submits_to_fail -= 1;
            return Err(TransportFailure::transient("venue busy"));
        }
        order.submitted = true;
        let was_decided = order.decided;
        let answer = order.advance();
        if !was_decided {
            self.announce(order_id, &answer);
        }
        Ok(answer)
    }

    fn on_poll(&mut self, order_id: OrderId) -> Result<TakeResponse, TransportFailure> {
        let Some(order) = self.store.get_mut(&order_id) else {
            warn!(%order_id, "Poll for unlisted order");
            return Err(TransportFailure::declined(UNKNOWN_ORDER));
        };
        if !order.submitted {
            return Err(TransportFailure::transient("take not submitted"));
        }
        let was_decided = order.decided;
        let answer = order.advance();
        if !was_decided {
            self.announce(order_id, &answer);
        }
        Ok(answer)
    }

    fn on_details(&mut self, order_id: OrderId) -> Result<OrderDetails, TransportFailure> {
        let Some(order) = self.store.get_mut(&order_id) else {
            return Err(TransportFailure::transient("unknown order"));
        };
        if !order.decided || order.decision != Decision::Accept {
            return Err(TransportFailure::transient("order not assigned"));
        }
        if order.details_to_fail > 0 {
            order.details_to_fail -= 1;
            return Err(TransportFailure::transient("details unavailable"));
        }
        Ok(OrderDetails::new(order_id)
            .with_field("venue", "simulated")
            .with_field("status", "assigned"))
    }

    fn announce(&self, order_id: OrderId, answer: &TakeResponse) {
        if !self.script.push_decisions {
            return;
        }
        match answer {
            TakeResponse::Accepted => {
                self.hub.publish_accepted(order_id);
            }
            TakeResponse::Declined(reason) => {
                self.hub.publish_declined(order_id, reason.clone());
            }
            TakeResponse::Processing => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::{PushEventPort, TransportCommandPort};

    fn spawn_venue(script: VenueScript, listings: &[(OrderId, Decision)]) -> (CommandClient, PushHub) {
        let hub = PushHub::default();
        let (mut venue, client) = SimulatedVenue::new(16, script, hub.clone());
        for (id, decision) in listings {
            venue.list(*id, decision.clone());
        }
        tokio::spawn(venue.run());
        (client, hub)
    }

    #[tokio::test]
    async fn test_unlisted_order_is_declined() {
        let (client, _hub) = spawn_venue(VenueScript::default(), &[]);

        let err = client.submit_take(OrderId::new()).await.unwrap_err();
        assert_eq!(err.decline_reason(), Some(UNKNOWN_ORDER));
    }

    #[tokio::test]
    async fn test_script_rounds_and_flaky_calls() {
        let id = OrderId::new();
        let script = VenueScript {
            processing_rounds: 2,
            flaky_submits: 1,
            details_failures: 1,
            push_decisions: false,
        };
        let (client, _hub) = spawn_venue(script, &[(id, Decision::Accept)]);

        assert!(client.poll_status(id).await.unwrap_err().is_transient());
        assert!(client.submit_take(id).await.unwrap_err().is_transient());
        assert_eq!(client.submit_take(id).await, Ok(TakeResponse::Processing));
        assert!(client.fetch_details(id).await.is_err());
        assert_eq!(client.poll_status(id).await, Ok(TakeResponse::Processing));
        assert_eq!(client.poll_status(id).await, Ok(TakeResponse::Accepted));
        assert!(client.fetch_details(id).await.unwrap_err().is_transient());

        let details = client.fetch_details(id).await.unwrap();
        assert_eq!(details.fields["status"], "assigned");
    }

    #[tokio::test]
    async fn test_decisions_are_pushed_once() {
        let id = OrderId::new();
        let script = VenueScript {
            push_decisions: true,
            ..VenueScript::default()
        };
        let (client, hub) = spawn_venue(script, &[(id, Decision::Decline("expired".into()))]);
        let mut declined = hub.subscribe_declined();

        assert_eq!(
            client.submit_take(id).await,
            Ok(TakeResponse::Declined("expired".into()))
        );
        assert_eq!(
            client.poll_status(id).await,
            Ok(TakeResponse::Declined("expired".into()))
        );

        let notice = declined.recv().await.unwrap();
        assert_eq!(notice.order_id, id);
        assert_eq!(notice.reason, "expired");
        assert!(declined.try_recv().is_err());
    }
}
