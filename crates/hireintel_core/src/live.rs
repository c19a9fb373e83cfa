//! Candidate live-stream state machine.
//!
//! The transport lives in the engine; this side owns the subscription
//! identity, the connection health and what a message does to the store.

use hireintel_logging::{hi_debug, hi_warn};
use serde_json::Value;

use crate::{decode_collection, flag_is_set, EntityStore, PageInfo};

pub type SubscriptionId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StreamStatus {
    #[default]
    Closed,
    Connecting,
    Open,
    Reconnecting,
}

/// Subscriptions to tear down and open after `start()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Restart {
    pub closed: Option<SubscriptionId>,
    pub opened: SubscriptionId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageOutcome {
    /// Candidates were replaced. `recovered` is set when the stream came back
    /// from `Reconnecting`.
    Applied { candidates: usize, recovered: bool },
    Dropped(PayloadIssue),
    /// The message belongs to a subscription that was already torn down.
    Stale,
}

/// Why a single message was dropped. Never fatal to the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadIssue {
    NotJson(String),
    ErrorFlagged(Option<String>),
    MissingData,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LiveStream {
    status: StreamStatus,
    active: Option<SubscriptionId>,
    last_issued: SubscriptionId,
    applied: u64,
    dropped: u64,
}

impl LiveStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> StreamStatus {
        self.status
    }

    pub fn active(&self) -> Option<SubscriptionId> {
        self.active
    }

    pub fn messages_applied(&self) -> u64 {
        self.applied
    }

    pub fn messages_dropped(&self) -> u64 {
        self.dropped
    }

    /// Tear down any current subscription and issue a fresh one.
    pub fn start(&mut self) -> Restart {
        let closed = self.active.take();
        self.last_issued += 1;
        self.active = Some(self.last_issued);
        self.status = StreamStatus::Connecting;
        Restart {
            closed,
            opened: self.last_issued,
        }
    }

    /// Release the subscription. Safe to call repeatedly or before `start()`.
    pub fn stop(&mut self) -> Option<SubscriptionId> {
        self.status = StreamStatus::Closed;
        self.active.take()
    }

    pub fn is_current(&self, subscription: SubscriptionId) -> bool {
        self.active == Some(subscription)
    }

    pub fn on_message(
        &mut self,
        subscription: SubscriptionId,
        raw: &str,
        store: &mut EntityStore,
    ) -> MessageOutcome {
        if !self.is_current(subscription) {
            return MessageOutcome::Stale;
        }

        let (candidates, pagination) = match parse_payload(raw) {
            Ok(parsed) => parsed,
            Err(issue) => {
                self.dropped += 1;
                match &issue {
                    PayloadIssue::NotJson(reason) => {
                        hi_warn!(
                            "Dropping malformed stream payload on subscription {}: {}",
                            subscription,
                            reason
                        );
                    }
                    PayloadIssue::ErrorFlagged(msg) => {
                        hi_debug!(
                            "Stream reported a server-side error: {}",
                            msg.as_deref().unwrap_or("<no message>")
                        );
                    }
                    PayloadIssue::MissingData => {
                        hi_warn!("Dropping stream payload without data");
                    }
                }
                return MessageOutcome::Dropped(issue);
            }
        };

        let count = candidates.len();
        store.replace_candidates(candidates);
        if pagination.is_some() {
            store.set_candidate_page(pagination);
        }
        self.applied += 1;
        let recovered = self.status == StreamStatus::Reconnecting;
        self.status = StreamStatus::Open;
        MessageOutcome::Applied {
            candidates: count,
            recovered,
        }
    }

    /// Returns true when this error degraded a healthy or connecting stream.
    pub fn on_transport_error(&mut self, subscription: SubscriptionId) -> bool {
        if !self.is_current(subscription) {
            return false;
        }
        match self.status {
            StreamStatus::Open | StreamStatus::Connecting => {
                self.status = StreamStatus::Reconnecting;
                true
            }
            StreamStatus::Reconnecting | StreamStatus::Closed => false,
        }
    }

    /// The transport exhausted its retries; the subscription is gone.
    pub fn on_gave_up(&mut self, subscription: SubscriptionId) -> bool {
        if !self.is_current(subscription) {
            return false;
        }
        self.stop();
        true
    }
}

fn parse_payload(raw: &str) -> Result<(Vec<crate::Candidate>, Option<PageInfo>), PayloadIssue> {
    let value: Value =
        serde_json::from_str(raw).map_err(|err| PayloadIssue::NotJson(err.to_string()))?;

    let Value::Object(mut envelope) = value else {
        return Err(PayloadIssue::NotJson("payload is not a JSON object".into()));
    };

    if envelope.get("error").is_some_and(flag_is_set) {
        let msg = envelope
            .get("msg")
            .and_then(Value::as_str)
            .map(ToOwned::to_owned);
        return Err(PayloadIssue::ErrorFlagged(msg));
    }

    let Some(Value::Object(mut data)) = envelope.remove("data") else {
        return Err(PayloadIssue::MissingData);
    };

    let candidates = decode_collection(data.remove("candidates").unwrap_or(Value::Null));
    let pagination = data
        .remove("pagination")
        .and_then(|value| serde_json::from_value(value).ok());
    Ok((candidates, pagination))
}
