//! Crop cycles: one sowing, planting or harvest of a plant in a plot.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use zbalo_core::{DomainError, DomainResult, Entity, RecordId};

use crate::draft::RecordDraft;
use crate::kind::EntityKind;
use crate::serde_util;

/// Phase of a crop cycle.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CropPhase {
    #[serde(rename = "semis")]
    Sowing,
    #[serde(rename = "plantation")]
    Planting,
    #[serde(rename = "recolte")]
    Harvest,
}

impl core::str::FromStr for CropPhase {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "semis" => Ok(CropPhase::Sowing),
            "plantation" => Ok(CropPhase::Planting),
            "recolte" => Ok(CropPhase::Harvest),
            other => Err(DomainError::validation(format!("unknown crop phase: {other}"))),
        }
    }
}

/// How a sowing was made. Only meaningful for [`CropPhase::Sowing`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SowingMode {
    #[serde(rename = "direct")]
    Direct,
    #[serde(rename = "godet")]
    Transplanted,
}

impl core::str::FromStr for SowingMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "direct" => Ok(SowingMode::Direct),
            "godet" => Ok(SowingMode::Transplanted),
            other => Err(DomainError::validation(format!("unknown sowing mode: {other}"))),
        }
    }
}

/// Crop cycle as confirmed by the remote service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropCycle {
    pub id: RecordId,
    #[serde(rename = "plante")]
    pub plant: String,
    #[serde(rename = "variete", default)]
    pub variety: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "serde_util::parsed")]
    pub phase: Option<CropPhase>,
    #[serde(rename = "mode_semis", default, deserialize_with = "serde_util::parsed")]
    pub sowing_mode: Option<SowingMode>,
    /// Free-form value drawn from the crop-status vocabulary.
    #[serde(rename = "statut", default)]
    pub status: Option<String>,
    #[serde(rename = "date", default, with = "serde_util::date")]
    pub start_date: Option<NaiveDate>,
    #[serde(rename = "date_prevue", default, with = "serde_util::date")]
    pub expected_harvest: Option<NaiveDate>,
    /// Plot name (plots are referenced by name, not identifier).
    #[serde(rename = "emplacement", default)]
    pub plot: Option<String>,
    #[serde(rename = "surface", default, deserialize_with = "serde_util::number")]
    pub area: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl CropCycle {
    pub fn status(&self) -> &str {
        self.status.as_deref().unwrap_or_default()
    }

    /// Days from `today` until the expected harvest, negative when late.
    pub fn days_to_harvest(&self, today: NaiveDate) -> Option<i64> {
        self.expected_harvest.map(|d| (d - today).num_days())
    }

    /// Draft pre-filled with this cycle, for editing.
    pub fn to_draft(&self) -> CropCycleDraft {
        CropCycleDraft {
            plant: self.plant.clone(),
            variety: self.variety.clone(),
            phase: self.phase,
            sowing_mode: self.sowing_mode,
            status: self.status.clone(),
            start_date: self.start_date,
            expected_harvest: self.expected_harvest,
            plot: self.plot.clone(),
            area: self.area,
            notes: self.notes.clone(),
        }
    }
}

impl Entity for CropCycle {
    fn id(&self) -> RecordId {
        self.id
    }
}

/// Create/update payload for a crop cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CropCycleDraft {
    #[serde(rename = "plante")]
    pub plant: String,
    #[serde(rename = "variete")]
    pub variety: Option<String>,
    #[serde(rename = "type")]
    pub phase: Option<CropPhase>,
    #[serde(rename = "modeSemis")]
    pub sowing_mode: Option<SowingMode>,
    #[serde(rename = "statut")]
    pub status: Option<String>,
    #[serde(rename = "date", with = "serde_util::date")]
    pub start_date: Option<NaiveDate>,
    #[serde(rename = "datePrevue", with = "serde_util::date")]
    pub expected_harvest: Option<NaiveDate>,
    #[serde(rename = "emplacement")]
    pub plot: Option<String>,
    #[serde(rename = "surface")]
    pub area: Option<f64>,
    pub notes: Option<String>,
}

impl RecordDraft for CropCycleDraft {
    type Record = CropCycle;

    const KIND: EntityKind = EntityKind::CropCycle;

    fn validated(mut self) -> DomainResult<Self> {
        self.plant = self.plant.trim().to_string();
        if self.plant.is_empty() {
            return Err(DomainError::validation("plant name is required"));
        }
        if self.phase != Some(CropPhase::Sowing) {
            self.sowing_mode = None;
        }
        self.variety = serde_util::non_blank(self.variety);
        self.status = serde_util::non_blank(self.status);
        self.plot = serde_util::non_blank(self.plot);
        Ok(self)
    }
}
