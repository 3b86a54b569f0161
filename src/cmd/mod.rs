pub mod config;
pub mod triage;
