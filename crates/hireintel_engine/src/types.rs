use std::fmt;

use hireintel_core::{CandidatePage, EntityId, Interview, Job, SubscriptionId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    /// The request never completed.
    Network,
    Timeout,
    /// Non-2xx response. The backend answered, so this is not a transport fault.
    HttpStatus(u16),
    /// 2xx response whose envelope carried the `error` flag.
    Application,
    Decode,
}

impl FailureKind {
    /// Whether the same request may succeed if the caller tries again later.
    pub fn is_retryable(&self) -> bool {
        match self {
            FailureKind::Network | FailureKind::Timeout => true,
            FailureKind::HttpStatus(code) => *code >= 500,
            FailureKind::InvalidUrl | FailureKind::Application | FailureKind::Decode => false,
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Application => write!(f, "application error"),
            FailureKind::Decode => write!(f, "decode error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct GatewayError {
    pub kind: FailureKind,
    pub message: String,
}

impl GatewayError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("failed to start engine runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEventKind {
    /// The server accepted the subscription and started the event stream.
    Connected,
    /// `data` of one server-sent event.
    Message(String),
    TransportError { attempt: u32, reason: String },
    /// Retry ceiling reached; the subscription ended.
    GaveUp { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamEvent {
    pub subscription: SubscriptionId,
    pub kind: StreamEventKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    JobsFetched(Result<Vec<Job>, GatewayError>),
    CandidatesFetched {
        page: u32,
        result: Result<CandidatePage, GatewayError>,
    },
    InterviewsFetched(Result<Vec<Interview>, GatewayError>),
    JobCreated(Result<Job, GatewayError>),
    /// Completion of an edit, publish or close call.
    JobUpdated(Result<Job, GatewayError>),
    JobDeleted {
        job_id: EntityId,
        result: Result<(), GatewayError>,
    },
    InterviewsScheduled(Result<(), GatewayError>),
    InterviewUpdated(Result<Interview, GatewayError>),
    Stream(StreamEvent),
}
