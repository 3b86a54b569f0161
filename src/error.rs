use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("issue tracker error: {0}")]
    IssueTracker(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("language model error: {0}")]
    LanguageModel(String),
    #[error("failed to parse model output: {0}")]
    Parse(String),
    #[error("unexpected major classification {0}")]
    UnexpectedCategory(String),
    #[error("{0}: only workflows within the `workflows` namespace are valid")]
    WorkflowNamespace(String),
    #[error("workflow error: {0}")]
    Workflow(String),
    #[error("template error: {0}")]
    Template(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type AppResult<T> = Result<T, AppError>;

impl From<minijinja::Error> for AppError {
    fn from(err: minijinja::Error) -> Self {
        AppError::Template(err.to_string())
    }
}

/// Renders an error followed by every error in its `source` chain, one per line.
pub fn error_trace(error: &(dyn std::error::Error + 'static)) -> String {
    let mut trace = format!("Error: {error}");
    let mut source = error.source();
    while let Some(cause) = source {
        trace.push_str(&format!("\nCaused by: {cause}"));
        source = cause.source();
    }
    trace
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Error)]
    enum PostError {
        #[error("failed to post reply")]
        Reply(#[source] io::Error),
    }

    #[test]
    fn trace_includes_source_chain() {
        let err = PostError::Reply(io::Error::other("disk on fire"));

        let trace = error_trace(&err);

        assert_eq!(trace, "Error: failed to post reply\nCaused by: disk on fire");
    }

    #[test]
    fn trace_without_source_is_a_single_line() {
        let err = AppError::Workflow("mailbox unavailable".to_string());
        assert_eq!(error_trace(&err), "Error: workflow error: mailbox unavailable");
    }

    #[test]
    fn unexpected_category_message_names_the_category() {
        let err = AppError::UnexpectedCategory("Something else".to_string());
        assert_eq!(
            err.to_string(),
            "unexpected major classification Something else"
        );
    }
}
