use hireintel_logging::hi_warn;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{Candidate, Interview, Job, PageInfo};

/// Authoritative in-memory snapshot of the three dashboard collections.
///
/// Accessors hand out shared slices; every change goes through a replace,
/// append, upsert or remove call on an exclusively borrowed store, so readers
/// never observe a half-applied collection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EntityStore {
    jobs: Vec<Job>,
    candidates: Vec<Candidate>,
    interviews: Vec<Interview>,
    candidate_page: Option<PageInfo>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn interviews(&self) -> &[Interview] {
        &self.interviews
    }

    /// Pagination of the most recent candidate page, if the server sent one.
    pub fn candidate_page(&self) -> Option<PageInfo> {
        self.candidate_page
    }

    pub fn replace_jobs(&mut self, jobs: Vec<Job>) -> &mut Self {
        self.jobs = jobs;
        self
    }

    pub fn replace_candidates(&mut self, candidates: Vec<Candidate>) -> &mut Self {
        self.candidates = candidates;
        self
    }

    pub fn replace_interviews(&mut self, interviews: Vec<Interview>) -> &mut Self {
        self.interviews = interviews;
        self
    }

    pub fn set_candidate_page(&mut self, page: Option<PageInfo>) -> &mut Self {
        self.candidate_page = page;
        self
    }

    pub fn append_job(&mut self, job: Job) -> &mut Self {
        self.jobs.push(job);
        self
    }

    /// Replace-on-edit: swaps the job with the same id, or appends it.
    pub fn upsert_job(&mut self, job: Job) -> &mut Self {
        match self.jobs.iter_mut().find(|existing| existing.id == job.id) {
            Some(slot) => *slot = job,
            None => self.jobs.push(job),
        }
        self
    }

    /// Drops the local copy of a job. Returns whether it was present.
    pub fn remove_job(&mut self, job_id: &str) -> bool {
        let before = self.jobs.len();
        self.jobs.retain(|job| job.id != job_id);
        self.jobs.len() != before
    }

    pub fn upsert_interview(&mut self, interview: Interview) -> &mut Self {
        match self
            .interviews
            .iter_mut()
            .find(|existing| existing.id == interview.id)
        {
            Some(slot) => *slot = interview,
            None => self.interviews.push(interview),
        }
        self
    }
}

/// Decode a JSON collection, degrading null, non-array or malformed input to
/// an empty collection.
pub fn decode_collection<T: DeserializeOwned>(value: Value) -> Vec<T> {
    match value {
        Value::Null => Vec::new(),
        Value::Array(_) => match serde_json::from_value(value) {
            Ok(items) => items,
            Err(err) => {
                hi_warn!("Discarding malformed collection: {}", err);
                Vec::new()
            }
        },
        other => {
            hi_warn!(
                "Expected a JSON array for collection, got {}",
                json_kind(&other)
            );
            Vec::new()
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
