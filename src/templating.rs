use minijinja::Environment;
use serde::Serialize;

use crate::error::AppResult;

/// Renders a one-off template string against `context`.
pub fn render_template<S: Serialize>(template: &str, context: S) -> AppResult<String> {
    let env = Environment::new();
    let rendered = env.render_str(template, context)?;
    Ok(rendered)
}
