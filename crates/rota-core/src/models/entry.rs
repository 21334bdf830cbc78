//! Scheduled entry records.

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use super::ObjectId;
use crate::calendar::DateKey;

/// Placeholder content for entries without a configured title.
pub const DEFAULT_ENTRY_CONTENT: &str = "{entry}";

/// One scheduled entry, as read from the host.
///
/// Entries are never stored on their own; they only live on as cells of the
/// row they attach to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryRecord {
    /// Identity of the entry object
    pub identity: ObjectId,

    /// Resource the entry belongs to; `None` means unattached
    pub owner: Option<ObjectId>,

    /// Day the entry occurs on; `None` when missing or unparseable
    pub occurs_on: Option<Date>,

    /// Rendered content shown in the cell
    pub display_content: String,
}

impl EntryRecord {
    /// Column key of the entry's day, if it has a valid one.
    pub fn date_key(&self) -> Option<DateKey> {
        self.occurs_on.map(DateKey::encode)
    }
}
