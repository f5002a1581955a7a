//! BlocIQ - compliance document intake for residential block management.
//!
//! Uploaded inspection documents are turned into text, summarized into a
//! structured compliance record, and, once a person confirms the summary,
//! written against a building with alerts and a renewal reminder.

pub mod calendar;
pub mod cli;
pub mod config;
pub mod extraction;
pub mod llm;
pub mod models;
pub mod repository;
pub mod schema;
pub mod server;
pub mod summarizer;
pub mod workflow;
