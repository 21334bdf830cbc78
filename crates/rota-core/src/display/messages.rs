//! Validation and warning list.

use std::fmt;

use crate::validation::MessageLog;

/// Markdown bullet list of a [`MessageLog`], newest first. Renders nothing
/// for an empty log.
pub struct Messages<'a>(pub &'a MessageLog);

impl fmt::Display for Messages<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for message in self.0.iter() {
            writeln!(f, "- {message}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationMessage;

    #[test]
    fn test_messages_list() {
        let mut log = MessageLog::new(vec![ValidationMessage::fatal("View :: No year attribute configured")]);
        log.push_warning("fetch failed");

        assert_eq!(
            Messages(&log).to_string(),
            "- Warning: fetch failed\n- Error: View :: No year attribute configured\n"
        );
        assert_eq!(Messages(&MessageLog::default()).to_string(), "");
    }
}
