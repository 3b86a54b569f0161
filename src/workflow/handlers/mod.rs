pub mod phishing_emails;

use crate::domain::classification::{Category, MappedSubcategory};
use crate::error::AppResult;
use crate::workflow::dispatcher::{WorkflowRegistry, workflow_path};

/// Registers every workflow shipped with the automation.
pub fn register_builtin(registry: &mut WorkflowRegistry) -> AppResult<()> {
    registry.register(
        workflow_path(
            Category::Security,
            MappedSubcategory::Known("phishing_emails"),
        ),
        phishing_emails::build,
    )?;
    Ok(())
}
