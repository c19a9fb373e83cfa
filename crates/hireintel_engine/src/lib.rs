//! HireIntel engine: backend gateway, candidate stream transport and effect execution.
mod engine;
mod gateway;
mod sse;
mod stream;
mod types;

pub use engine::{EngineEvents, EngineHandle};
pub use gateway::{FetchSettings, Gateway, ReqwestGateway};
pub use sse::{SseDecoder, SseError, SseEvent, DEFAULT_MAX_LINE_BYTES};
pub use stream::{run_subscription, ChannelEventSink, EventSink, ReconnectPolicy};
pub use types::{EngineError, EngineEvent, FailureKind, GatewayError, StreamEvent, StreamEventKind};
