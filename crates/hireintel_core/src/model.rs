use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Server-assigned identifier; opaque to the client.
pub type EntityId = String;

/// Status enums are open sets: unknown values from the server are kept verbatim.
macro_rules! open_status {
    ($(#[$meta:meta])* $name:ident, default = $default:ident, { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum $name {
            $($variant,)+
            Other(String),
        }

        impl $name {
            pub fn as_str(&self) -> &str {
                match self {
                    $(Self::$variant => $text,)+
                    Self::Other(raw) => raw,
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::$default
            }
        }

        impl From<String> for $name {
            fn from(raw: String) -> Self {
                match raw.as_str() {
                    $($text => Self::$variant,)+
                    _ => Self::Other(raw),
                }
            }
        }

        impl From<&str> for $name {
            fn from(raw: &str) -> Self {
                Self::from(raw.to_owned())
            }
        }

        impl From<$name> for String {
            fn from(status: $name) -> Self {
                match status {
                    $name::Other(raw) => raw,
                    known => known.as_str().to_owned(),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.pad(self.as_str())
            }
        }
    };
}

open_status!(JobStatus, default = Draft, {
    Draft => "draft",
    Active => "active",
    Closed => "closed",
    OnHold => "on_hold",
    Archived => "archived",
});

open_status!(CandidateStatus, default = Applied, {
    Applied => "applied",
    Interviewing => "interviewing",
    Offered => "offered",
    Hired => "hired",
    Rejected => "rejected",
    Withdrawn => "withdrawn",
});

open_status!(InterviewStatus, default = Scheduled, {
    Scheduled => "scheduled",
    Completed => "completed",
    Cancelled => "cancelled",
    Rescheduled => "rescheduled",
    NoShow => "no_show",
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: EntityId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: JobStatus,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: EntityId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub first_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub last_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(default)]
    pub current_position: Option<String>,
    #[serde(default)]
    pub years_of_experience: Option<u32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: CandidateStatus,
    /// Free-form stage tag such as `xml`, `extract_text` or `github_scrape`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub pipeline_status: String,
    #[serde(default)]
    pub job_id: Option<EntityId>,
}

impl Candidate {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_owned()
    }

    pub fn initials(&self) -> String {
        self.first_name
            .chars()
            .take(1)
            .chain(self.last_name.chars().take(1))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interview {
    pub id: EntityId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub candidate_id: EntityId,
    #[serde(default)]
    pub candidate_name: Option<String>,
    #[serde(default)]
    pub job_id: Option<EntityId>,
    #[serde(default)]
    pub scheduled_date: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: InterviewStatus,
}

/// Pagination metadata attached to candidate stream messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PageInfo {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub per_page: u32,
    #[serde(default)]
    pub total_pages: u32,
}

/// One page of candidates as delivered by the candidates channel.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CandidatePage {
    pub candidates: Vec<Candidate>,
    pub pagination: Option<PageInfo>,
}

/// Partial job body for create and edit requests. Unset fields are omitted.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct JobDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_policy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employment_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_experience_years: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_experience_years: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candidates_needed: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<JobStatus>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleRequest {
    pub candidates: Vec<EntityId>,
    pub start_date: String,
    pub end_date: String,
}

/// Truthiness of an application-level `error` field as the backend sends it:
/// `true`, a non-empty string, a non-zero number or any object/array.
pub fn flag_is_set(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
