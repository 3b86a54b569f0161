pub mod dryrun;
pub mod jira;
pub mod llm;
