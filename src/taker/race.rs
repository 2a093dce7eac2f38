//! # Race Coordinator
//!
//! Merges three producers of an [`Outcome`] for one order: the polling pipeline, the
//! push-accepted feed and the push-declined feed. The first to produce wins and the other
//! two are torn down on the spot.
//!
//! ## Tie-break
//!
//! All three branches are polled from one `tokio::select!` on the caller's task, in
//! `biased` order: cancellation, then the pipeline, then the push feeds. When the pipeline
//! and a push event become ready in the same wake-up, the pipeline wins. Between the two
//! feeds, an acceptance beats a decline that is ready at the same time. A push event that
//! arrives after the pipeline resolved is never looked at.
//!
//! ## Teardown
//!
//! Losing branches are dropped, not ignored. Dropping the pipeline abandons its in-flight
//! call (the answer lands on a closed responder) and disarms its pause. Dropping the
//! receivers releases both push subscriptions. The child token handed to the pipeline is
//! cancelled as well so nothing it owns outlives the race.

use crate::clients::{next_matching, PushEventPort};
use crate::model::{DeclineNotice, OrderId};
use crate::taker::pipeline::PollingPipeline;
use crate::taker::state::Outcome;
use std::fmt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Which producer settled the race.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Branch {
    Pipeline,
    PushAccepted,
    PushDeclined,
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Branch::Pipeline => write!(f, "pipeline"),
            Branch::PushAccepted => write!(f, "push_accepted"),
            Branch::PushDeclined => write!(f, "push_declined"),
        }
    }
}

/// First-completed-wins over the pipeline and the push feeds of one order.
pub struct RaceCoordinator {
    order_id: OrderId,
    pipeline: PollingPipeline,
    accepted: mpsc::UnboundedReceiver<OrderId>,
    declined: mpsc::UnboundedReceiver<DeclineNotice>,
}

impl RaceCoordinator {
    /// Subscribes to both push feeds right away.
    ///
    /// Push feeds do not replay, so the coordinator must exist before the pipeline issues
    /// its first call or an early push would be missed.
    pub fn new(pipeline: PollingPipeline, push: &dyn PushEventPort) -> Self {
        Self {
            order_id: pipeline.order_id(),
            accepted: push.subscribe_accepted(),
            declined: push.subscribe_declined(),
            pipeline,
        }
    }

    /// Runs the race.
    ///
    /// Returns exactly one outcome, or `None` if `cancel` fires before any producer does.
    pub async fn run(self, cancel: CancellationToken) -> Option<Outcome> {
        self.run_with_branch(cancel)
            .await
            .map(|(_, outcome)| outcome)
    }

    /// Like [`run`](Self::run), also reporting which branch won.
    pub async fn run_with_branch(self, cancel: CancellationToken) -> Option<(Branch, Outcome)> {
        let Self {
            order_id,
            pipeline,
            mut accepted,
            mut declined,
        } = self;
        let branches = cancel.child_token();

        let polled = pipeline.run(branches.clone());
        let pushed_accept = next_matching(&mut accepted, move |id: &OrderId| *id == order_id);
        let pushed_decline =
            next_matching(&mut declined, move |notice: &DeclineNotice| notice.order_id == order_id);

        let won = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            Some(outcome) = polled => Some((Branch::Pipeline, outcome)),
            Some(_) = pushed_accept => Some((Branch::PushAccepted, Outcome::AcceptedPending)),
            Some(notice) = pushed_decline => {
                Some((Branch::PushDeclined, Outcome::Declined(notice.reason)))
            }
            else => None,
        };
        branches.cancel();

        match &won {
            Some((branch, outcome)) => info!(%order_id, %branch, ?outcome, "Race settled"),
            None => debug!(%order_id, "Race cancelled before settling"),
        }
        won
    }
}
