//! Integration tests for Keyword-Scout
//!
//! These tests use wiremock to stand in for crawled sites and the relevance
//! oracle endpoint, and tempfile for the job database.

mod common;
mod crawl_tests;
mod job_tests;
