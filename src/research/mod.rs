//! Deep research: a multi-stage orchestration over one free-text query.

pub mod orchestrator;
pub mod tasks;

pub use orchestrator::{analysis_confidence, DeepResearchOrchestrator, ResearchOptions};
pub use tasks::{cancel_pair, CancelHandle, CancelSignal};
