use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;

use crate::context::AppContext;
use crate::domain::classification::{Category, MappedSubcategory};
use crate::domain::ticket::Ticket;
use crate::error::{AppError, AppResult};

pub const WORKFLOW_NAMESPACE: &str = "workflows";
pub const ENTRY_POINT: &str = "on_create";

/// Follow-up action for one category/subcategory pair.
#[async_trait]
pub trait Workflow: Send + Sync {
    async fn on_create(&self, ctx: &AppContext, ticket: &mut Ticket) -> AppResult<()>;
}

pub type WorkflowFactory = Box<dyn Fn(&AppContext) -> AppResult<Arc<dyn Workflow>> + Send + Sync>;

pub enum Dispatch {
    Handler(Arc<dyn Workflow>),
    NotFound,
}

/// `workflows.<category>.<mapped_subcategory>.on_create`
pub fn workflow_path(category: Category, mapped: MappedSubcategory) -> String {
    format!(
        "{WORKFLOW_NAMESPACE}.{}.{}.{ENTRY_POINT}",
        category.namespace(),
        mapped.as_str()
    )
}

fn ensure_in_namespace(path: &str) -> AppResult<()> {
    let mut segments = path.split('.');
    let in_namespace = segments.next() == Some(WORKFLOW_NAMESPACE)
        && segments.next().is_some_and(|segment| !segment.is_empty());
    if in_namespace {
        Ok(())
    } else {
        Err(AppError::WorkflowNamespace(path.to_string()))
    }
}

/// Maps workflow paths to factories. A handler is built on first resolution
/// and reused for the rest of the process.
#[derive(Default)]
pub struct WorkflowRegistry {
    factories: HashMap<String, WorkflowFactory>,
    loaded: Mutex<HashMap<String, Arc<dyn Workflow>>>,
}

impl WorkflowRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, path: impl Into<String>, factory: F) -> AppResult<()>
    where
        F: Fn(&AppContext) -> AppResult<Arc<dyn Workflow>> + Send + Sync + 'static,
    {
        let path = path.into();
        ensure_in_namespace(&path)?;
        self.factories.insert(path, Box::new(factory));
        Ok(())
    }

    pub fn is_registered(&self, path: &str) -> bool {
        self.factories.contains_key(path)
    }

    pub fn dispatch(
        &self,
        ctx: &AppContext,
        category: Category,
        mapped: MappedSubcategory,
    ) -> AppResult<Dispatch> {
        self.resolve(ctx, &workflow_path(category, mapped))
    }

    /// Paths outside the workflow namespace are a programming error, not a miss.
    /// A factory that fails is propagated; only an unregistered path is `NotFound`.
    pub fn resolve(&self, ctx: &AppContext, path: &str) -> AppResult<Dispatch> {
        ensure_in_namespace(path)?;

        let mut loaded = self.loaded.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(handler) = loaded.get(path) {
            return Ok(Dispatch::Handler(Arc::clone(handler)));
        }

        let Some(factory) = self.factories.get(path) else {
            return Ok(Dispatch::NotFound);
        };
        let handler = factory(ctx)?;
        loaded.insert(path.to_string(), Arc::clone(&handler));
        Ok(Dispatch::Handler(handler))
    }
}
