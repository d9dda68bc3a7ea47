//! Reminders: dated, pending tasks. Completion removes them from the mirror.
//!
//! Rows written by the assistant may carry a free-form date or no label;
//! those decode as undated or unlabelled reminders.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use zbalo_core::{DomainError, DomainResult, Entity, RecordId};

use crate::draft::RecordDraft;
use crate::kind::EntityKind;
use crate::serde_util;

pub const DEFAULT_ICON: &str = "📌";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reminder {
    pub id: RecordId,
    #[serde(default, with = "serde_util::date")]
    pub date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "serde_util::nullable_string")]
    pub label: String,
    #[serde(default)]
    pub icon: Option<String>,
}

impl Reminder {
    pub fn icon(&self) -> &str {
        self.icon.as_deref().unwrap_or(DEFAULT_ICON)
    }
}

impl Entity for Reminder {
    fn id(&self) -> RecordId {
        self.id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReminderDraft {
    #[serde(with = "serde_util::date")]
    pub date: Option<NaiveDate>,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl RecordDraft for ReminderDraft {
    type Record = Reminder;

    const KIND: EntityKind = EntityKind::Reminder;

    fn validated(mut self) -> DomainResult<Self> {
        self.label = self.label.trim().to_string();
        if self.date.is_none() || self.label.is_empty() {
            return Err(DomainError::validation("date and label are required"));
        }
        self.icon = serde_util::non_blank(self.icon);
        Ok(self)
    }
}
