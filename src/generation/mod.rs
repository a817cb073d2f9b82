//! SEO generation pipeline: template resolution, provider call and retry.

pub mod orchestrator;

pub use orchestrator::{AttemptRecord, Orchestrator};
