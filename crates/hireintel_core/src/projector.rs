//! Pure projections from the entity snapshot to view models.
//!
//! Nothing here takes `&mut`: every function can run at any rate without
//! touching the store.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::view_model::{
    CandidateCard, DashboardStats, FeedItem, FunnelStage, InterviewRow, JobRow,
    PipelineStageCounts, ScheduleOption, SearchResultKind, SearchResultRow, StatusCount,
    FEED_LENGTH,
};
use crate::{Candidate, CandidateStatus, EntityStore, InterviewStatus, Job, JobStatus};

/// A search match borrowed from the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchHit<'a> {
    Candidate(&'a Candidate),
    Job(&'a Job),
}

pub fn dashboard_stats(store: &EntityStore) -> DashboardStats {
    DashboardStats {
        active_jobs: store
            .jobs()
            .iter()
            .filter(|job| job.status == JobStatus::Active)
            .count(),
        total_candidates: store.candidates().len(),
        scheduled_interviews: store
            .interviews()
            .iter()
            .filter(|interview| interview.status == InterviewStatus::Scheduled)
            .count(),
        hired_candidates: count_status(store, &CandidateStatus::Hired),
    }
}

/// `xml` matches exactly; `extract`, `scrape` and `profile` match anywhere in
/// the tag, so buckets may overlap.
pub fn pipeline_stage_counts(store: &EntityStore) -> PipelineStageCounts {
    let mut counts = PipelineStageCounts {
        total: store.candidates().len(),
        ..PipelineStageCounts::default()
    };
    for candidate in store.candidates() {
        let tag = candidate.pipeline_status.as_str();
        if tag == "xml" {
            counts.xml += 1;
        }
        if tag.contains("extract") {
            counts.extract += 1;
        }
        if tag.contains("scrape") {
            counts.scrape += 1;
        }
        if tag.contains("profile") {
            counts.profile += 1;
        }
    }
    counts
}

/// Candidates with the given status, or all of them when `status` is `None`.
pub fn filtered_candidates<'a>(
    store: &'a EntityStore,
    status: Option<&CandidateStatus>,
) -> Vec<&'a Candidate> {
    store
        .candidates()
        .iter()
        .filter(|candidate| status.is_none_or(|wanted| &candidate.status == wanted))
        .collect()
}

/// Case-insensitive substring search. Candidates (name, email) come first,
/// then jobs (title, description). A blank query matches nothing.
pub fn search_entities<'a>(store: &'a EntityStore, query: &str) -> Vec<SearchHit<'a>> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }
    let hit = |field: &str| field.to_lowercase().contains(&needle);

    let candidates = store
        .candidates()
        .iter()
        .filter(|c| hit(&c.first_name) || hit(&c.last_name) || hit(&c.email))
        .map(SearchHit::Candidate);
    let jobs = store
        .jobs()
        .iter()
        .filter(|j| hit(&j.title) || j.description.as_deref().is_some_and(|d| hit(d)))
        .map(SearchHit::Job);
    candidates.chain(jobs).collect()
}

pub fn hiring_funnel(store: &EntityStore) -> Vec<FunnelStage> {
    let screening = store
        .candidates()
        .iter()
        .filter(|c| c.pipeline_status.contains("extract"))
        .count();
    vec![
        FunnelStage {
            name: "Applied",
            count: count_status(store, &CandidateStatus::Applied),
        },
        FunnelStage {
            name: "Screening",
            count: screening,
        },
        FunnelStage {
            name: "Interview",
            count: count_status(store, &CandidateStatus::Interviewing),
        },
        FunnelStage {
            name: "Hired",
            count: count_status(store, &CandidateStatus::Hired),
        },
    ]
}

/// Candidate counts per status, ordered by status.
pub fn status_breakdown(store: &EntityStore) -> Vec<StatusCount> {
    let mut counts: BTreeMap<&CandidateStatus, usize> = BTreeMap::new();
    for candidate in store.candidates() {
        *counts.entry(&candidate.status).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(status, count)| StatusCount {
            status: status.clone(),
            count,
        })
        .collect()
}

pub fn job_rows(store: &EntityStore) -> Vec<JobRow> {
    store
        .jobs()
        .iter()
        .map(|job| JobRow {
            job_id: job.id.clone(),
            title: job.title.clone(),
            industry: job
                .industry
                .clone()
                .unwrap_or_else(|| "Technology".to_owned()),
            location: job.location.clone().unwrap_or_default(),
            status: job.status.clone(),
            applicants: store
                .candidates()
                .iter()
                .filter(|c| c.job_id.as_deref() == Some(job.id.as_str()))
                .count(),
            created: job
                .created_at
                .as_deref()
                .map(format_date)
                .unwrap_or_default(),
        })
        .collect()
}

pub fn candidate_cards(candidates: &[&Candidate]) -> Vec<CandidateCard> {
    candidates
        .iter()
        .map(|c| CandidateCard {
            candidate_id: c.id.clone(),
            initials: c.initials(),
            name: c.full_name(),
            position: c
                .current_position
                .clone()
                .unwrap_or_else(|| "Position not specified".to_owned()),
            email: c.email.clone(),
            experience: c
                .years_of_experience
                .map(|years| format!("{years} years"))
                .unwrap_or_else(|| "N/A".to_owned()),
            status: c.status.clone(),
            pipeline_status: c.pipeline_status.clone(),
        })
        .collect()
}

pub fn interview_rows(store: &EntityStore) -> Vec<InterviewRow> {
    store
        .interviews()
        .iter()
        .map(|interview| InterviewRow {
            interview_id: interview.id.clone(),
            when: interview
                .scheduled_date
                .as_deref()
                .map(format_date_time)
                .unwrap_or_default(),
            candidate: interview
                .candidate_name
                .clone()
                .unwrap_or_else(|| interview.candidate_id.clone()),
            status: interview.status.clone(),
        })
        .collect()
}

/// The most recent candidates of the snapshot, oldest first.
pub fn pipeline_feed(store: &EntityStore) -> Vec<FeedItem> {
    let candidates = store.candidates();
    let start = candidates.len().saturating_sub(FEED_LENGTH);
    candidates[start..]
        .iter()
        .map(|c| FeedItem {
            candidate_id: c.id.clone(),
            text: format!("{} - {}", c.full_name(), c.pipeline_status),
        })
        .collect()
}

/// Candidates that can be put forward for interview scheduling.
pub fn schedulable_candidates(store: &EntityStore) -> Vec<ScheduleOption> {
    store
        .candidates()
        .iter()
        .filter(|c| matches!(c.status, CandidateStatus::Applied | CandidateStatus::Interviewing))
        .map(|c| ScheduleOption {
            candidate_id: c.id.clone(),
            label: format!(
                "{} ({})",
                c.full_name(),
                c.current_position.as_deref().unwrap_or("No position")
            ),
        })
        .collect()
}

pub fn search_rows(hits: &[SearchHit<'_>]) -> Vec<SearchResultRow> {
    hits.iter()
        .map(|hit| match hit {
            SearchHit::Candidate(c) => SearchResultRow {
                kind: SearchResultKind::Candidate,
                id: c.id.clone(),
                title: c.full_name(),
                subtitle: c.email.clone(),
            },
            SearchHit::Job(j) => SearchResultRow {
                kind: SearchResultKind::Job,
                id: j.id.clone(),
                title: j.title.clone(),
                subtitle: j.location.clone().unwrap_or_default(),
            },
        })
        .collect()
}

fn count_status(store: &EntityStore, status: &CandidateStatus) -> usize {
    store
        .candidates()
        .iter()
        .filter(|c| &c.status == status)
        .count()
}

fn format_date(raw: &str) -> String {
    parse_timestamp(raw)
        .map(|ts| ts.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| raw.to_owned())
}

fn format_date_time(raw: &str) -> String {
    parse_timestamp(raw)
        .map(|ts| ts.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| raw.to_owned())
}

/// Server timestamps come as RFC 3339, naive ISO 8601 or a bare date.
fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.naive_utc());
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(ts);
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(raw, "%a, %d %b %Y %H:%M:%S GMT") {
        return Some(ts);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}
