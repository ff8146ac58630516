//! URL handling module for Keyword-Scout
//!
//! This module provides URL normalization for per-job deduplication, host
//! keys for politeness tracking, and coarse file-type classification.

mod file_type;
mod host;
mod normalize;

// Re-export main functions
pub use file_type::{guess_file_type, DEFAULT_FILE_TYPE};
pub use host::host_key;
pub use normalize::normalize_url;
