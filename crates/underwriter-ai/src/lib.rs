//! Validation engine for LLM-extracted underwriting rule sets.
//!
//! The library reconciles a hierarchical tree of natural-language underwriting
//! requirements with the flat decision produced by an external rule engine.
//! Per-node verdicts are inferred through free-text condition parsing, field
//! name normalization across naming conventions, and bottom-up AND aggregation
//! over the requirement tree.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
