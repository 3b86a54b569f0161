pub mod automation;
pub mod classifier;
pub mod dispatcher;
pub mod handlers;
