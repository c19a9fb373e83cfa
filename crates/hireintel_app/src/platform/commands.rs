//! Line-oriented command parser for the terminal adapter.

use hireintel_core::{CandidateStatus, JobDraft, JobStatus, Msg, Page, ScheduleRequest};

pub const HELP: &str = "\
commands:
  page <dashboard|jobs|candidates|interviews|pipeline|analytics>
  filter [status]            filter candidates by status, or clear the filter
  search [text]              search candidates and jobs, or clear the search
  candidates-page <n>        switch the candidate page
  refresh                    refresh the current page
  job field=value;...        create a job (title is required)
  edit <id> field=value;...  edit a job
  delete|publish|close <id>  job lifecycle
  schedule <id,id,..> <start> <end>
  cancel|complete <id>       interview lifecycle
  stream start|stop
  help
  quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Dispatch(Msg),
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("unknown command '{0}', type 'help'")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("{0}")]
    Invalid(String),
}

/// Parse one input line. Blank lines yield `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<Command>, CommandError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    let msg = match verb.to_ascii_lowercase().as_str() {
        "quit" | "exit" => return Ok(Some(Command::Quit)),
        "help" | "?" => return Ok(Some(Command::Help)),
        "page" => {
            let page: Page = rest.parse().map_err(CommandError::Invalid)?;
            Msg::PageSelected(page)
        }
        "filter" => Msg::StatusFilterChanged(
            (!rest.is_empty()).then(|| CandidateStatus::from(rest.to_ascii_lowercase())),
        ),
        "search" => Msg::SearchChanged(rest.to_string()),
        "refresh" => Msg::RefreshTick,
        "candidates-page" => {
            let page = rest
                .parse::<u32>()
                .map_err(|_| CommandError::Usage("candidates-page <n>"))?;
            Msg::CandidatePageSelected(page)
        }
        "job" => Msg::CreateJobSubmitted(parse_draft(rest)?),
        "edit" => {
            let (job_id, fields) = rest
                .split_once(char::is_whitespace)
                .ok_or(CommandError::Usage("edit <id> field=value;..."))?;
            Msg::EditJobSubmitted {
                job_id: job_id.to_string(),
                draft: parse_draft(fields)?,
            }
        }
        "delete" => Msg::DeleteJobConfirmed {
            job_id: single_id(rest, "delete <id>")?,
        },
        "publish" => Msg::PublishJobClicked {
            job_id: single_id(rest, "publish <id>")?,
        },
        "close" => Msg::CloseJobClicked {
            job_id: single_id(rest, "close <id>")?,
        },
        "schedule" => Msg::ScheduleSubmitted(parse_schedule(rest)?),
        "cancel" => Msg::CancelInterviewClicked {
            interview_id: single_id(rest, "cancel <id>")?,
        },
        "complete" => Msg::CompleteInterviewClicked {
            interview_id: single_id(rest, "complete <id>")?,
        },
        "stream" => match rest {
            "start" => Msg::StreamStartRequested,
            "stop" => Msg::StreamStopRequested,
            _ => return Err(CommandError::Usage("stream start|stop")),
        },
        other => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(Some(Command::Dispatch(msg)))
}

fn single_id(rest: &str, usage: &'static str) -> Result<String, CommandError> {
    let mut parts = rest.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some(id), None) => Ok(id.to_string()),
        _ => Err(CommandError::Usage(usage)),
    }
}

/// `title=Backend Engineer;location=Remote;min_experience_years=3`
fn parse_draft(fields: &str) -> Result<JobDraft, CommandError> {
    let mut draft = JobDraft::default();
    for pair in fields.split(';').map(str::trim).filter(|p| !p.is_empty()) {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| CommandError::Invalid(format!("expected field=value, got '{pair}'")))?;
        let value = value.trim().to_string();
        match key.trim() {
            "title" => draft.title = Some(value),
            "description" => draft.description = Some(value),
            "industry" => draft.industry = Some(value),
            "department" => draft.department = Some(value),
            "location" => draft.location = Some(value),
            "remote_policy" => draft.remote_policy = Some(value),
            "employment_type" => draft.employment_type = Some(value),
            "experience_level" => draft.experience_level = Some(value),
            "min_experience_years" => draft.min_experience_years = Some(number(key, &value)?),
            "max_experience_years" => draft.max_experience_years = Some(number(key, &value)?),
            "candidates_needed" => draft.candidates_needed = Some(number(key, &value)?),
            "status" => draft.status = Some(JobStatus::from(value)),
            other => return Err(CommandError::Invalid(format!("unknown job field '{other}'"))),
        }
    }
    Ok(draft)
}

fn number(key: &str, value: &str) -> Result<u32, CommandError> {
    value
        .parse()
        .map_err(|_| CommandError::Invalid(format!("{} must be a whole number", key.trim())))
}

fn parse_schedule(rest: &str) -> Result<ScheduleRequest, CommandError> {
    const USAGE: &str = "schedule <id,id,..> <start> <end>";
    let parts: Vec<&str> = rest.split_whitespace().collect();
    let [ids, start, end] = parts.as_slice() else {
        return Err(CommandError::Usage(USAGE));
    };
    Ok(ScheduleRequest {
        candidates: ids
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect(),
        start_date: start.to_string(),
        end_date: end.to_string(),
    })
}
