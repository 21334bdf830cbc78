//! Minimal `{{name}}` template substitution.

use super::TemplateRenderer;

/// Replaces `{{key}}` placeholders with top-level values of the data object.
///
/// Unknown placeholders are left as they are. No sanitisation is performed;
/// hosts rendering to HTML must supply their own renderer.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleTemplate;

impl TemplateRenderer for SimpleTemplate {
    fn render(&self, template: &str, data: &serde_json::Value) -> String {
        let Some(fields) = data.as_object() else {
            return template.trim().to_string();
        };

        let mut out = template.trim().to_string();
        for (key, value) in fields {
            let placeholder = format!("{{{{{key}}}}}");
            if !out.contains(&placeholder) {
                continue;
            }
            let replacement = match value {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            out = out.replace(&placeholder, &replacement);
        }
        out
    }
}
