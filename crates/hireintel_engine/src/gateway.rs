use std::time::Duration;

use bytes::Bytes;
use futures_util::StreamExt;
use hireintel_core::{
    decode_collection, flag_is_set, CandidatePage, Interview, Job, JobDraft, ScheduleRequest,
};
use hireintel_logging::{hi_debug, hi_trace};
use reqwest::header::ACCEPT;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::sse::SseDecoder;
use crate::{FailureKind, GatewayError};

#[derive(Debug, Clone)]
pub struct FetchSettings {
    /// Scheme, host and port of the backend, e.g. `http://localhost:5000`.
    pub base_url: String,
    /// Path prefix of the admin API.
    pub api_prefix: String,
    pub auth_token: Option<String>,
    pub connect_timeout: Duration,
    /// Applies to one-shot calls only; the live stream has no overall timeout.
    pub request_timeout: Duration,
    /// Candidates per stream page.
    pub per_page: u32,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            api_prefix: "/api/v1/admin".to_string(),
            auth_token: None,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            per_page: 10,
        }
    }
}

/// One method per backend operation. Failures come back as values; nothing
/// is retried here.
#[async_trait::async_trait]
pub trait Gateway: Send + Sync {
    async fn list_jobs(&self) -> Result<Vec<Job>, GatewayError>;
    async fn list_interviews(&self) -> Result<Vec<Interview>, GatewayError>;
    /// First page delivered by the candidates channel, read once.
    async fn candidates_snapshot(&self, page: u32) -> Result<CandidatePage, GatewayError>;
    async fn create_job(&self, draft: &JobDraft) -> Result<Job, GatewayError>;
    async fn update_job(&self, job_id: &str, draft: &JobDraft) -> Result<Job, GatewayError>;
    async fn delete_job(&self, job_id: &str) -> Result<(), GatewayError>;
    async fn publish_job(&self, job_id: &str) -> Result<Job, GatewayError>;
    async fn close_job(&self, job_id: &str) -> Result<Job, GatewayError>;
    async fn schedule_interviews(&self, request: &ScheduleRequest) -> Result<(), GatewayError>;
    async fn cancel_interview(&self, interview_id: &str) -> Result<Interview, GatewayError>;
    async fn complete_interview(&self, interview_id: &str) -> Result<Interview, GatewayError>;
}

/// `{ error, data, msg }` wrapper used by every backend response.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    error: Value,
    #[serde(default)]
    data: Value,
    #[serde(default)]
    msg: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ReqwestGateway {
    settings: FetchSettings,
    api_root: Url,
    client: reqwest::Client,
}

impl ReqwestGateway {
    pub fn new(settings: FetchSettings) -> Result<Self, GatewayError> {
        let root = format!(
            "{}/{}",
            settings.base_url.trim_end_matches('/'),
            settings.api_prefix.trim_matches('/')
        );
        let api_root = Url::parse(&root)
            .map_err(|err| GatewayError::new(FailureKind::InvalidUrl, format!("{root}: {err}")))?;
        if api_root.cannot_be_a_base() {
            return Err(GatewayError::new(FailureKind::InvalidUrl, root));
        }

        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .build()
            .map_err(|err| GatewayError::new(FailureKind::Network, err.to_string()))?;

        Ok(Self {
            settings,
            api_root,
            client,
        })
    }

    pub fn settings(&self) -> &FetchSettings {
        &self.settings
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.api_root.clone();
        // `new` rejected cannot-be-a-base roots, so segments are always available.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match self.settings.auth_token.as_deref() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn call(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<Vec<u8>>,
    ) -> Result<Value, GatewayError> {
        let url = self.endpoint(segments);
        hi_trace!("{} {}", method, url);
        let mut builder = self
            .request(method, url)
            .timeout(self.settings.request_timeout);
        if let Some(body) = body {
            builder = builder
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(body);
        }

        let response = builder.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        let bytes = read_body(response).await?;
        let envelope: Option<Envelope> = serde_json::from_slice(&bytes).ok();

        if !status.is_success() {
            let message = envelope
                .and_then(|env| env.msg)
                .unwrap_or_else(|| status.to_string());
            return Err(GatewayError::new(
                FailureKind::HttpStatus(status.as_u16()),
                message,
            ));
        }

        let envelope = envelope.ok_or_else(|| {
            GatewayError::new(FailureKind::Decode, "response is not a JSON envelope")
        })?;
        if flag_is_set(&envelope.error) {
            return Err(GatewayError::new(
                FailureKind::Application,
                envelope
                    .msg
                    .unwrap_or_else(|| "backend reported an error".to_string()),
            ));
        }
        Ok(envelope.data)
    }

    /// Open the candidates event stream for `page`. The response body is the
    /// raw event stream.
    pub(crate) async fn open_candidate_stream(&self, page: u32) -> Result<Response, GatewayError> {
        let mut url = self.endpoint(&["candidates", "stream"]);
        url.query_pairs_mut()
            .append_pair("page", &page.max(1).to_string())
            .append_pair("per_page", &self.settings.per_page.to_string());
        hi_debug!("Opening candidate stream {}", url);

        let response = self
            .request(Method::GET, url)
            .header(ACCEPT, "text/event-stream")
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }
        Ok(response)
    }
}

#[async_trait::async_trait]
impl Gateway for ReqwestGateway {
    async fn list_jobs(&self) -> Result<Vec<Job>, GatewayError> {
        let data = self.call(Method::GET, &["jobs"], None).await?;
        decode_list(data)
    }

    async fn list_interviews(&self) -> Result<Vec<Interview>, GatewayError> {
        let data = self
            .call(Method::GET, &["interviews", "schedules"], None)
            .await?;
        decode_list(data)
    }

    async fn candidates_snapshot(&self, page: u32) -> Result<CandidatePage, GatewayError> {
        let response = tokio::time::timeout(
            self.settings.request_timeout,
            self.open_candidate_stream(page),
        )
        .await
        .map_err(|_| GatewayError::new(FailureKind::Timeout, "candidate stream did not open"))??;

        let first = tokio::time::timeout(self.settings.request_timeout, first_event(response))
            .await
            .map_err(|_| GatewayError::new(FailureKind::Timeout, "no candidate event received"))??;
        // Dropping the response above closed the connection.
        candidate_page_from(&first)
    }

    async fn create_job(&self, draft: &JobDraft) -> Result<Job, GatewayError> {
        let data = self
            .call(Method::POST, &["jobs"], Some(json_body(draft)?))
            .await?;
        decode_one(data)
    }

    async fn update_job(&self, job_id: &str, draft: &JobDraft) -> Result<Job, GatewayError> {
        let data = self
            .call(Method::PUT, &["jobs", job_id], Some(json_body(draft)?))
            .await?;
        decode_one(data)
    }

    async fn delete_job(&self, job_id: &str) -> Result<(), GatewayError> {
        self.call(Method::DELETE, &["jobs", job_id], None).await?;
        Ok(())
    }

    async fn publish_job(&self, job_id: &str) -> Result<Job, GatewayError> {
        let data = self
            .call(Method::POST, &["jobs", job_id, "publish"], None)
            .await?;
        decode_one(data)
    }

    async fn close_job(&self, job_id: &str) -> Result<Job, GatewayError> {
        let data = self
            .call(Method::POST, &["jobs", job_id, "close"], None)
            .await?;
        decode_one(data)
    }

    async fn schedule_interviews(&self, request: &ScheduleRequest) -> Result<(), GatewayError> {
        self.call(
            Method::POST,
            &["interviews", "schedule"],
            Some(json_body(request)?),
        )
        .await?;
        Ok(())
    }

    async fn cancel_interview(&self, interview_id: &str) -> Result<Interview, GatewayError> {
        let data = self
            .call(
                Method::POST,
                &["interviews", "schedules", interview_id, "cancel"],
                None,
            )
            .await?;
        decode_one(data)
    }

    async fn complete_interview(&self, interview_id: &str) -> Result<Interview, GatewayError> {
        let data = self
            .call(
                Method::POST,
                &["interviews", "schedules", interview_id, "complete"],
                None,
            )
            .await?;
        decode_one(data)
    }
}

fn json_body<T: Serialize>(body: &T) -> Result<Vec<u8>, GatewayError> {
    serde_json::to_vec(body).map_err(|err| GatewayError::new(FailureKind::Decode, err.to_string()))
}

async fn read_body(response: Response) -> Result<Bytes, GatewayError> {
    response.bytes().await.map_err(map_reqwest_error)
}

async fn first_event(response: Response) -> Result<String, GatewayError> {
    let mut decoder = SseDecoder::new();
    let mut body = response.bytes_stream();
    while let Some(chunk) = body.next().await {
        let chunk = chunk.map_err(map_reqwest_error)?;
        let events = decoder
            .feed(&chunk)
            .map_err(|err| GatewayError::new(FailureKind::Network, err.to_string()))?;
        if let Some(event) = events.into_iter().find(|e| e.is_message()) {
            return Ok(event.data);
        }
    }
    Err(GatewayError::new(
        FailureKind::Network,
        "candidate stream closed before the first event",
    ))
}

fn candidate_page_from(raw: &str) -> Result<CandidatePage, GatewayError> {
    let envelope: Envelope = serde_json::from_str(raw)
        .map_err(|err| GatewayError::new(FailureKind::Decode, err.to_string()))?;
    if flag_is_set(&envelope.error) {
        return Err(GatewayError::new(
            FailureKind::Application,
            envelope
                .msg
                .unwrap_or_else(|| "candidate stream reported an error".to_string()),
        ));
    }
    let Value::Object(mut data) = envelope.data else {
        return Err(GatewayError::new(
            FailureKind::Decode,
            "candidate event carries no data",
        ));
    };
    Ok(CandidatePage {
        candidates: decode_collection(data.remove("candidates").unwrap_or(Value::Null)),
        pagination: data
            .remove("pagination")
            .and_then(|value| serde_json::from_value(value).ok()),
    })
}

/// `null` data on a list endpoint means "nothing yet".
fn decode_list<T: DeserializeOwned>(data: Value) -> Result<Vec<T>, GatewayError> {
    if data.is_null() {
        return Ok(Vec::new());
    }
    serde_json::from_value(data).map_err(|err| GatewayError::new(FailureKind::Decode, err.to_string()))
}

fn decode_one<T: DeserializeOwned>(data: Value) -> Result<T, GatewayError> {
    if data.is_null() {
        return Err(GatewayError::new(FailureKind::Decode, "response carries no data"));
    }
    serde_json::from_value(data).map_err(|err| GatewayError::new(FailureKind::Decode, err.to_string()))
}

pub(crate) fn map_reqwest_error(err: reqwest::Error) -> GatewayError {
    if err.is_timeout() {
        return GatewayError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return GatewayError::new(FailureKind::Decode, err.to_string());
    }
    GatewayError::new(FailureKind::Network, err.to_string())
}
