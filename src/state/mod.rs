//! Job and crawl state
//!
//! # Components
//!
//! - `JobStatus`: lifecycle of a job row (PENDING, COMPLETE, FAILED)
//! - `LinkOutcome`: what happened to one discovered link during a crawl
//! - `HostState`: per-host politeness bookkeeping

mod host_state;
mod job_status;
mod outcome;

pub use host_state::HostState;
pub use job_status::JobStatus;
pub use outcome::{CandidateResult, LinkOutcome, SkipReason};
