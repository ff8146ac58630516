use crate::state::JobStatus;
use crate::storage::{JobRecord, JobStatusReport, ResultRecord};
use std::fmt::Write;

/// Longest URL shown in a table row before it is shortened
const MAX_URL_WIDTH: usize = 72;

/// Renders a job status report
///
/// ```text
/// Job 5f0c...: COMPLETE (3 results)
/// ```
pub fn format_job_status(report: &JobStatusReport) -> String {
    let mut out = String::new();
    match (report.status, report.result_count) {
        (JobStatus::Complete, Some(count)) => {
            let _ = writeln!(
                out,
                "Job {}: {} ({} result{})",
                report.job_id,
                report.status,
                count,
                if count == 1 { "" } else { "s" }
            );
        }
        _ => {
            let _ = writeln!(out, "Job {}: {}", report.job_id, report.status);
        }
    }

    if let Some(error) = &report.error_message {
        let _ = writeln!(out, "  Error: {}", error);
    }

    out
}

/// Renders results as a table, highest score first as given
pub fn format_results(results: &[ResultRecord]) -> String {
    if results.is_empty() {
        return "No results found.\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(out, "{:>6}  {:<16}  {:<width$}  KEYWORDS", "SCORE", "TYPE", "URL", width = MAX_URL_WIDTH);

    for result in results {
        let _ = writeln!(
            out,
            "{:>6.1}  {:<16}  {:<width$}  {}",
            result.relevance_score,
            shorten(&result.file_type, 16),
            shorten(&result.target_url, MAX_URL_WIDTH),
            result.matched_keywords.join(", "),
            width = MAX_URL_WIDTH
        );
    }

    let _ = writeln!(out, "\n{} result(s)", results.len());
    out
}

/// Renders a job listing, one line per job
pub fn format_jobs(jobs: &[JobRecord]) -> String {
    if jobs.is_empty() {
        return "No jobs found.\n".to_string();
    }

    let mut out = String::new();
    for job in jobs {
        let _ = writeln!(
            out,
            "{}  {:<8}  {}  {}",
            job.id, job.status, job.created_at, job.seed_url
        );
        if let Some(error) = &job.error_message {
            let _ = writeln!(out, "    Error: {}", error);
        }
    }
    out
}

fn shorten(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    let kept: String = value.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", kept)
}
