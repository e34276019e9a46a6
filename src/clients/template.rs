use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::debug;

use crate::models::template::{EmailTemplate, RenderContext};

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{([A-Za-z0-9_]+)\}\}").expect("placeholder pattern is valid")
});

#[derive(Debug, Clone, Default)]
pub struct TemplateRenderer {
    template: EmailTemplate,
}

impl TemplateRenderer {
    pub fn new(template: EmailTemplate) -> Self {
        Self { template }
    }

    pub fn render(&self, context: &RenderContext) -> String {
        debug!(variable_count = context.len(), "Rendering email template");

        replace_placeholders(&self.template.html, context)
    }
}

/// Single left-to-right pass over `template`. Substituted values are never
/// rescanned, and keys missing from `context` become empty strings.
pub fn replace_placeholders(template: &str, context: &RenderContext) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| {
            context.get(&caps[1]).unwrap_or_default().to_string()
        })
        .into_owned()
}
