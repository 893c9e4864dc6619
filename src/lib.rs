pub mod adapter;
pub mod chunk_plan;
pub mod cli;
pub mod config;
pub mod credentials;
pub mod dispatch;
pub mod document;
pub mod envelope;
pub mod error;
pub mod jobs;
pub mod languages;
pub mod merge;
pub mod orchestrator;
pub mod pacing;
pub mod report;
pub mod store;
pub mod strategy;
pub mod util;
