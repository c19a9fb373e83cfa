use std::sync::mpsc;
use std::time::Duration;

use futures_util::StreamExt;
use hireintel_core::SubscriptionId;
use hireintel_logging::{hi_debug, hi_error, hi_info, hi_warn};
use rand::Rng;
use tokio_util::sync::CancellationToken;

use crate::gateway::map_reqwest_error;
use crate::sse::SseDecoder;
use crate::{EngineEvent, FailureKind, GatewayError, ReqwestGateway, StreamEvent, StreamEventKind};

/// Backoff between reconnection attempts of a live subscription.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconnectPolicy {
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: f64,
    /// Fraction of the delay added or removed at random, `0.0..=1.0`.
    pub jitter: f64,
    /// Consecutive failures tolerated before giving up. `None` retries forever.
    pub max_retries: Option<u32>,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            multiplier: 2.0,
            jitter: 0.2,
            max_retries: Some(10),
        }
    }
}

impl ReconnectPolicy {
    /// Delay before reconnect number `attempt` (1-based), without jitter. A
    /// `retry:` hint from the server replaces the initial delay.
    pub fn base_delay(&self, attempt: u32, server_retry: Option<Duration>) -> Duration {
        let initial = server_retry.unwrap_or(self.initial_delay);
        let exponent = attempt.saturating_sub(1).min(32) as i32;
        let scaled = initial.as_secs_f64() * self.multiplier.max(1.0).powi(exponent);
        let capped = scaled.min(self.max_delay.as_secs_f64());
        Duration::try_from_secs_f64(capped).unwrap_or(self.max_delay)
    }

    /// `base_delay` spread by the jitter fraction, never above `max_delay`.
    pub fn delay_for(&self, attempt: u32, server_retry: Option<Duration>) -> Duration {
        let base = self.base_delay(attempt, server_retry);
        let jitter = self.jitter.clamp(0.0, 1.0);
        if jitter == 0.0 {
            return base;
        }
        let factor = rand::rng().random_range((1.0 - jitter)..=(1.0 + jitter));
        base.mul_f64(factor).min(self.max_delay)
    }

    pub fn exhausted(&self, attempt: u32) -> bool {
        self.max_retries.is_some_and(|max| attempt > max)
    }
}

pub trait EventSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelEventSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

/// Keep subscription `subscription` to candidates page `page` alive until
/// `cancel` fires or the policy gives up.
///
/// Every delivered event resets the failure count. Once cancelled, nothing
/// more is emitted for this subscription.
pub async fn run_subscription(
    gateway: &ReqwestGateway,
    subscription: SubscriptionId,
    page: u32,
    policy: &ReconnectPolicy,
    sink: &dyn EventSink,
    cancel: CancellationToken,
) {
    let emit = |kind: StreamEventKind| {
        if !cancel.is_cancelled() {
            sink.emit(EngineEvent::Stream(StreamEvent { subscription, kind }));
        }
    };

    let mut attempt: u32 = 0;
    let mut server_retry: Option<Duration> = None;
    loop {
        let mut decoder = SseDecoder::new();
        let ended = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            reason = pump(gateway, page, &mut decoder, &mut attempt, &emit) => Some(reason),
        };
        let Some(reason) = ended else {
            hi_debug!("Subscription {} cancelled", subscription);
            return;
        };
        server_retry = decoder.retry().or(server_retry);

        attempt = attempt.saturating_add(1);
        if policy.exhausted(attempt) {
            hi_error!(
                "Subscription {} gave up after {} attempts: {}",
                subscription,
                attempt,
                reason
            );
            emit(StreamEventKind::GaveUp {
                reason: reason.to_string(),
            });
            return;
        }

        let delay = policy.delay_for(attempt, server_retry);
        hi_warn!(
            "Subscription {} lost ({}); retry {} in {:?}",
            subscription,
            reason,
            attempt,
            delay
        );
        emit(StreamEventKind::TransportError {
            attempt,
            reason: reason.to_string(),
        });

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                hi_debug!("Subscription {} cancelled during backoff", subscription);
                return;
            }
            _ = tokio::time::sleep(delay) => {}
        }
    }
}

/// Run one connection to completion and return why it ended.
async fn pump(
    gateway: &ReqwestGateway,
    page: u32,
    decoder: &mut SseDecoder,
    attempt: &mut u32,
    emit: &(dyn Fn(StreamEventKind) + Sync),
) -> GatewayError {
    let response = match gateway.open_candidate_stream(page).await {
        Ok(response) => response,
        Err(err) => return err,
    };
    hi_info!("Candidate stream connected (page {})", page);
    emit(StreamEventKind::Connected);

    let mut body = response.bytes_stream();
    while let Some(chunk) = body.next().await {
        let chunk = match chunk {
            Ok(chunk) => chunk,
            Err(err) => return map_reqwest_error(err),
        };
        let events = match decoder.feed(&chunk) {
            Ok(events) => events,
            Err(err) => return GatewayError::new(FailureKind::Network, err.to_string()),
        };
        for event in events {
            if !event.is_message() {
                hi_debug!("Skipping '{:?}' event", event.event);
                continue;
            }
            *attempt = 0;
            emit(StreamEventKind::Message(event.data));
        }
    }
    GatewayError::new(FailureKind::Network, "stream closed by server")
}
