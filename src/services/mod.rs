pub mod completion;
pub mod issue_tracker;
pub mod language_model;
pub mod tracker;

pub use completion::CompletionFacade;
pub use issue_tracker::{IssueReader, IssueRecord, IssueWriter};
pub use language_model::{LanguageModelService, ResponseFormat};
pub use tracker::IssueTracker;
