//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlPhase`: where the orchestrator is in the topic-then-article pipeline

mod crawl_phase;

pub use crawl_phase::CrawlPhase;
