//! Output module for plain-text reports
//!
//! This module renders job status, result listings and job listings for
//! the command line. Formatting is kept separate from printing so reports
//! can be checked in tests.

mod report;

pub use report::{format_job_status, format_jobs, format_results};

use crate::storage::{JobRecord, JobStatusReport, ResultRecord};

/// Prints a job status report to stdout
pub fn print_job_status(report: &JobStatusReport) {
    print!("{}", format_job_status(report));
}

/// Prints a result listing to stdout
pub fn print_results(results: &[ResultRecord]) {
    print!("{}", format_results(results));
}

/// Prints a job listing to stdout
pub fn print_jobs(jobs: &[JobRecord]) {
    print!("{}", format_jobs(jobs));
}
