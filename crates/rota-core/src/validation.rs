//! Validation and warning messages shown above the planner.
//!
//! Fatal messages come from configuration checks and stop all fetching.
//! Warnings are raised at runtime when a fetch or action fails; the user can
//! dismiss them.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::{ActionSpec, EntrySource, PlannerConfig, ResourceSource, TitleSource};

/// Severity of a [`ValidationMessage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Fatal,
    Warning,
}

/// A message in the planner's message list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationMessage {
    pub id: Uuid,
    pub text: String,
    pub severity: Severity,
}

impl ValidationMessage {
    /// Creates a message with a fresh unique id.
    pub fn new(text: impl Into<String>, severity: Severity) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            severity,
        }
    }

    /// Creates a fatal message.
    pub fn fatal(text: impl Into<String>) -> Self {
        Self::new(text, Severity::Fatal)
    }

    /// Creates a warning message.
    pub fn warning(text: impl Into<String>) -> Self {
        Self::new(text, Severity::Warning)
    }

    /// Whether the message is fatal.
    pub fn is_fatal(&self) -> bool {
        self.severity == Severity::Fatal
    }

    /// Whether the user may dismiss the message (all but fatal ones).
    pub fn is_dismissible(&self) -> bool {
        !self.is_fatal()
    }
}

impl fmt::Display for ValidationMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.severity {
            Severity::Fatal => "Error:",
            Severity::Warning => "Warning:",
        };
        write!(f, "{label} {}", self.text)
    }
}

/// Newest-first list of messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageLog {
    messages: Vec<ValidationMessage>,
}

impl MessageLog {
    /// Creates a log seeded with the given messages.
    pub fn new(messages: Vec<ValidationMessage>) -> Self {
        Self { messages }
    }

    /// Adds a message in front of the existing ones.
    pub fn push(&mut self, message: ValidationMessage) {
        self.messages.insert(0, message);
    }

    /// Adds a warning and logs it.
    pub fn push_warning(&mut self, text: impl Into<String>) {
        let message = ValidationMessage::warning(text);
        log::warn!("{}", message.text);
        self.push(message);
    }

    /// Removes a message if it is dismissible. Returns whether it was removed.
    pub fn dismiss(&mut self, id: Uuid) -> bool {
        let before = self.messages.len();
        self.messages
            .retain(|message| message.id != id || !message.is_dismissible());
        self.messages.len() != before
    }

    /// Whether any fatal message is present.
    pub fn has_fatal(&self) -> bool {
        self.messages.iter().any(ValidationMessage::is_fatal)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationMessage> {
        self.messages.iter()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// Checks a configuration and returns one fatal message per problem.
pub fn validate_config(config: &PlannerConfig) -> Vec<ValidationMessage> {
    let mut messages = Vec::new();
    let mut add = |category: &str, text: &str| {
        messages.push(ValidationMessage::fatal(format!("{category} :: {text}")));
    };

    // Resources

    match &config.resources.source {
        ResourceSource::Query { entity, .. } if entity.trim().is_empty() => {
            add("Resources", "No resource entity configured");
        }
        ResourceSource::Action { action } if action.name().trim().is_empty() => {
            add("Resources", "No Data Source action configured");
        }
        _ => {}
    }

    if let Some(problem) = title_problem(&config.resources.title) {
        add("Resources", &format!("Resource title {problem}"));
    }

    // Entries

    if let EntrySource::Action { action } = &config.entries.source {
        if action.name().trim().is_empty() {
            add("Entries", "No Data Source action configured");
        }
    }

    if config.entries.owner_reference.trim().is_empty() {
        add("Entries", "No reference from entry to resource configured");
    }

    if config.entries.date_attribute.trim().is_empty() {
        add("Entries", "No entry date attribute configured");
    }

    if let Some(problem) = config.entries.title.as_ref().and_then(title_problem) {
        add("Entries", &format!("Entry title {problem}"));
    }

    // View

    if config.view.year_attribute.trim().is_empty() {
        add("View", "No year attribute configured");
    }

    if config.view.month_attribute.trim().is_empty() {
        add("View", "No month attribute configured");
    }

    // Events

    let bindings = [
        ("Resource", &config.events.resource),
        ("Entry", &config.events.entry),
        ("Empty", &config.events.empty),
    ];
    for (target, binding) in bindings {
        if let Some(action) = &binding.action {
            if action.name().trim().is_empty() {
                add("Events", &format!("No {target} click action configured"));
            }
        }
    }

    if matches!(config.events.empty.action, Some(ActionSpec::OpenPage { .. })) {
        add("Events", "Empty click cannot open a page");
    }

    messages
}

fn title_problem(title: &TitleSource) -> Option<&'static str> {
    match title {
        TitleSource::Attribute { name } if name.trim().is_empty() => {
            Some("type is attribute, but no attribute is selected")
        }
        TitleSource::Action { action } if action.name().trim().is_empty() => {
            Some("type is action, but no action is selected")
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ClickBinding, ClickKind};

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&PlannerConfig::default()).is_empty());
    }

    #[test]
    fn test_missing_attributes_are_fatal() {
        let mut config = PlannerConfig::default();
        config.resources.title = TitleSource::Attribute {
            name: String::new(),
        };
        config.entries.date_attribute = String::new();
        config.view.month_attribute = " ".to_string();

        let messages = validate_config(&config);
        let texts: Vec<_> = messages.iter().map(|m| m.text.as_str()).collect();

        assert_eq!(messages.len(), 3);
        assert!(messages.iter().all(ValidationMessage::is_fatal));
        assert!(texts.contains(
            &"Resources :: Resource title type is attribute, but no attribute is selected"
        ));
        assert!(texts.contains(&"Entries :: No entry date attribute configured"));
        assert!(texts.contains(&"View :: No month attribute configured"));
    }

    #[test]
    fn test_entry_action_needs_a_name() {
        let mut config = PlannerConfig::default();
        config.entries.source = EntrySource::Action {
            action: ActionSpec::Server {
                name: " ".to_string(),
            },
        };

        let messages = validate_config(&config);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].text, "Entries :: No Data Source action configured");
    }

    #[test]
    fn test_empty_click_page_is_rejected() {
        let mut config = PlannerConfig::default();
        config.events.empty = ClickBinding {
            action: Some(ActionSpec::OpenPage {
                page: "Cell_New".to_string(),
                open_as: Default::default(),
            }),
            trigger: ClickKind::Double,
        };

        let messages = validate_config(&config);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].text, "Events :: Empty click cannot open a page");
    }

    #[test]
    fn test_message_ids_are_unique() {
        let a = ValidationMessage::warning("a");
        let b = ValidationMessage::warning("a");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_log_is_newest_first_and_only_warnings_dismiss() {
        let fatal = ValidationMessage::fatal("broken");
        let fatal_id = fatal.id;
        let mut log = MessageLog::new(vec![fatal]);
        log.push_warning("fetch failed");

        let first = log.iter().next().unwrap().clone();
        assert_eq!(first.text, "fetch failed");
        assert!(first.is_dismissible());

        assert!(!log.dismiss(fatal_id));
        assert!(log.dismiss(first.id));
        assert!(!log.dismiss(first.id));
        assert_eq!(log.len(), 1);
        assert!(log.has_fatal());
    }
}
