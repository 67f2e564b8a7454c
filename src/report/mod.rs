//! Briefing generation.

pub mod generator;

pub use generator::{
    generate_json_briefing, generate_markdown_briefing, write_briefing, Briefing, BriefingMetadata,
};
