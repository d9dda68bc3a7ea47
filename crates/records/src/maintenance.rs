//! Maintenance events (watering, pruning, weeding...) logged against a plot.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use zbalo_core::{DomainError, DomainResult, Entity, RecordId};

use crate::draft::RecordDraft;
use crate::kind::EntityKind;
use crate::serde_util;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceEvent {
    pub id: RecordId,
    #[serde(default, with = "serde_util::date")]
    pub date: Option<NaiveDate>,
    /// Value from the maintenance-type vocabulary.
    #[serde(rename = "type", default)]
    pub event_type: Option<String>,
    #[serde(default)]
    pub zone: Option<String>,
    /// Hours spent; the service may hold the raw form input here.
    #[serde(rename = "duree", default, deserialize_with = "serde_util::number")]
    pub duration: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
}

impl MaintenanceEvent {
    /// Labour hours, zero when the stored duration is missing or non-numeric.
    pub fn hours(&self) -> f64 {
        self.duration.unwrap_or(0.0)
    }

    pub fn event_type(&self) -> &str {
        self.event_type.as_deref().unwrap_or_default()
    }
}

impl Entity for MaintenanceEvent {
    fn id(&self) -> RecordId {
        self.id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MaintenanceDraft {
    #[serde(with = "serde_util::date")]
    pub date: Option<NaiveDate>,
    #[serde(rename = "type")]
    pub event_type: Option<String>,
    pub zone: Option<String>,
    #[serde(rename = "duree")]
    pub duration: Option<f64>,
    pub description: Option<String>,
}

impl RecordDraft for MaintenanceDraft {
    type Record = MaintenanceEvent;

    const KIND: EntityKind = EntityKind::MaintenanceEvent;

    fn validated(mut self) -> DomainResult<Self> {
        if self.date.is_none() {
            return Err(DomainError::validation("date is required"));
        }
        if self.duration.is_some_and(|h| h < 0.0) {
            return Err(DomainError::validation("duration cannot be negative"));
        }
        self.zone = serde_util::non_blank(self.zone);
        Ok(self)
    }
}
