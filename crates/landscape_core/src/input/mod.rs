//! Typed input of the processing pipeline.
//!
//! # Responsibility
//! - Define description value objects supplied by external format layers.
//! - Provide the process log collected during one run.

pub mod description;
pub mod process_log;
