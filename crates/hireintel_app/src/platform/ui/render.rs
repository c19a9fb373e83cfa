use std::fmt::Write;

use hireintel_core::{
    AppViewModel, FunnelStage, Notification, NotificationLevel, PageView, SearchResultKind,
    StreamStatus,
};

/// Plain-text rendering of the whole dashboard.
pub fn render(view: &AppViewModel) -> String {
    let mut out = String::new();
    let stream = match view.stream {
        StreamStatus::Closed => "off",
        StreamStatus::Connecting => "connecting",
        StreamStatus::Open => "live",
        StreamStatus::Reconnecting => "reconnecting",
    };
    let _ = writeln!(
        out,
        "== HireIntel | {} | live updates: {}{} ==",
        view.page,
        stream,
        if view.ready { "" } else { " | loading..." }
    );
    let _ = writeln!(
        out,
        "Active jobs: {}  Candidates: {}  Scheduled interviews: {}  Hired: {}",
        view.stats.active_jobs,
        view.stats.total_candidates,
        view.stats.scheduled_interviews,
        view.stats.hired_candidates
    );

    if !view.search_query.trim().is_empty() {
        let _ = writeln!(
            out,
            "Search '{}': {} result(s)",
            view.search_query,
            view.search_results.len()
        );
        for row in &view.search_results {
            let kind = match row.kind {
                SearchResultKind::Candidate => "candidate",
                SearchResultKind::Job => "job",
            };
            let _ = writeln!(out, "  [{kind}] {} - {} ({})", row.title, row.subtitle, row.id);
        }
    }

    out.push('\n');
    render_body(&mut out, &view.body);
    out
}

fn render_body(out: &mut String, body: &PageView) {
    match body {
        PageView::Dashboard { funnel } => render_funnel(out, funnel),
        PageView::Jobs { rows } => {
            if rows.is_empty() {
                let _ = writeln!(out, "No jobs.");
            }
            for row in rows {
                let _ = writeln!(
                    out,
                    "{:<12} {:<32} {:<16} {:<16} {:<10} {:>4} applicants  {}",
                    row.job_id,
                    row.title,
                    row.industry,
                    row.location,
                    row.status,
                    row.applicants,
                    row.created
                );
            }
        }
        PageView::Candidates {
            filter,
            cards,
            page_info,
            schedulable,
        } => {
            if let Some(status) = filter {
                let _ = writeln!(out, "Filter: {status}");
            }
            if cards.is_empty() {
                let _ = writeln!(out, "No candidates.");
            }
            for card in cards {
                let _ = writeln!(
                    out,
                    "[{}] {} <{}> {} | {} | {} | {} ({})",
                    card.initials,
                    card.name,
                    card.email,
                    card.position,
                    card.experience,
                    card.status,
                    card.pipeline_status,
                    card.candidate_id
                );
            }
            if let Some(info) = page_info {
                let _ = writeln!(
                    out,
                    "Page {} of {} ({} total)",
                    info.page, info.total_pages, info.total
                );
            }
            if !schedulable.is_empty() {
                let _ = writeln!(out, "Schedulable:");
                for option in schedulable {
                    let _ = writeln!(out, "  {} {}", option.candidate_id, option.label);
                }
            }
        }
        PageView::Interviews { rows } => {
            if rows.is_empty() {
                let _ = writeln!(out, "No interviews.");
            }
            for row in rows {
                let _ = writeln!(
                    out,
                    "{:<12} {:<17} {:<24} {}",
                    row.interview_id, row.when, row.candidate, row.status
                );
            }
        }
        PageView::Pipeline { stages, feed } => {
            for (name, count) in stages.buckets() {
                let percent = stages.percent_of_total(count);
                let bar = "#".repeat(usize::from(percent / 5));
                let _ = writeln!(out, "{name:<9} {count:>5} {percent:>3}% {bar}");
            }
            let _ = writeln!(out, "Recent activity:");
            for item in feed {
                let _ = writeln!(out, "  {}", item.text);
            }
        }
        PageView::Analytics { funnel, breakdown } => {
            render_funnel(out, funnel);
            let _ = writeln!(out, "By status:");
            for entry in breakdown {
                let _ = writeln!(out, "  {:<14} {}", entry.status, entry.count);
            }
        }
    }
}

fn render_funnel(out: &mut String, funnel: &[FunnelStage]) {
    let _ = writeln!(out, "Hiring funnel:");
    for stage in funnel {
        let _ = writeln!(out, "  {:<10} {}", stage.name, stage.count);
    }
}

pub fn render_notification(notification: &Notification) -> String {
    let tag = match notification.level {
        NotificationLevel::Info => "info",
        NotificationLevel::Success => "ok",
        NotificationLevel::Warning => "warn",
        NotificationLevel::Error => "error",
    };
    format!("[{tag}] {}", notification.message)
}
