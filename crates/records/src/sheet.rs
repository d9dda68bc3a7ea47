//! Crop sheets: agronomic reference data per species.

use serde::{Deserialize, Serialize};

use zbalo_core::{DomainError, DomainResult, Entity, RecordId};

use crate::draft::RecordDraft;
use crate::kind::EntityKind;
use crate::serde_util;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropSheet {
    pub id: RecordId,
    #[serde(rename = "nom")]
    pub name: String,
    #[serde(rename = "categorie", default)]
    pub category: Option<String>,
    #[serde(rename = "varietes", default, deserialize_with = "serde_util::string_list")]
    pub varieties: Vec<String>,
    #[serde(rename = "temp_min", default, deserialize_with = "serde_util::number")]
    pub temp_min: Option<f64>,
    #[serde(rename = "temp_opt", default, deserialize_with = "serde_util::number")]
    pub temp_optimal: Option<f64>,
    #[serde(rename = "temp_max", default, deserialize_with = "serde_util::number")]
    pub temp_max: Option<f64>,
    #[serde(rename = "duree_germination", default, deserialize_with = "serde_util::days")]
    pub germination_days: Option<u32>,
    #[serde(rename = "duree_semis_repiquage", default, deserialize_with = "serde_util::days")]
    pub sowing_to_transplant_days: Option<u32>,
    #[serde(rename = "duree_repiquage_recolte", default, deserialize_with = "serde_util::days")]
    pub transplant_to_harvest_days: Option<u32>,
    #[serde(rename = "duree_semis_recolte", default, deserialize_with = "serde_util::days")]
    pub sowing_to_harvest_days: Option<u32>,
    /// Spacing in centimetres.
    #[serde(rename = "espacement", default, deserialize_with = "serde_util::number")]
    pub spacing: Option<f64>,
    /// Sowing depth in centimetres.
    #[serde(rename = "profondeur", default, deserialize_with = "serde_util::number")]
    pub depth: Option<f64>,
    #[serde(rename = "unite", default)]
    pub sale_unit: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl CropSheet {
    pub fn category(&self) -> &str {
        self.category.as_deref().unwrap_or_default()
    }

    /// Case-insensitive match on the species name.
    pub fn matches_name(&self, query: &str) -> bool {
        self.name.to_lowercase().contains(&query.to_lowercase())
    }

    pub fn to_draft(&self) -> CropSheetDraft {
        CropSheetDraft {
            name: self.name.clone(),
            category: self.category.clone(),
            varieties: self.varieties.clone(),
            temp_min: self.temp_min,
            temp_optimal: self.temp_optimal,
            temp_max: self.temp_max,
            germination_days: self.germination_days,
            sowing_to_transplant_days: self.sowing_to_transplant_days,
            transplant_to_harvest_days: self.transplant_to_harvest_days,
            sowing_to_harvest_days: self.sowing_to_harvest_days,
            spacing: self.spacing,
            depth: self.depth,
            sale_unit: self.sale_unit.clone(),
            notes: self.notes.clone(),
        }
    }
}

impl Entity for CropSheet {
    fn id(&self) -> RecordId {
        self.id
    }
}

/// Sorted, deduplicated categories present in a set of sheets.
pub fn categories(sheets: &[CropSheet]) -> Vec<String> {
    let mut cats: Vec<String> = sheets
        .iter()
        .filter_map(|s| s.category.clone())
        .filter(|c| !c.is_empty())
        .collect();
    cats.sort();
    cats.dedup();
    cats
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CropSheetDraft {
    #[serde(rename = "nom")]
    pub name: String,
    #[serde(rename = "categorie")]
    pub category: Option<String>,
    #[serde(rename = "varietes")]
    pub varieties: Vec<String>,
    #[serde(rename = "tempMin")]
    pub temp_min: Option<f64>,
    #[serde(rename = "tempOpt")]
    pub temp_optimal: Option<f64>,
    #[serde(rename = "tempMax")]
    pub temp_max: Option<f64>,
    #[serde(rename = "dureeGermination")]
    pub germination_days: Option<u32>,
    #[serde(rename = "dureeSemisRepiquage")]
    pub sowing_to_transplant_days: Option<u32>,
    #[serde(rename = "dureeRepiquageRecolte")]
    pub transplant_to_harvest_days: Option<u32>,
    #[serde(rename = "dureeSemisRecolte")]
    pub sowing_to_harvest_days: Option<u32>,
    #[serde(rename = "espacement")]
    pub spacing: Option<f64>,
    #[serde(rename = "profondeur")]
    pub depth: Option<f64>,
    #[serde(rename = "unite")]
    pub sale_unit: Option<String>,
    pub notes: Option<String>,
}

impl CropSheetDraft {
    /// Varieties from a comma-separated input.
    pub fn with_varieties_text(mut self, raw: &str) -> Self {
        self.varieties = raw
            .split(',')
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .collect();
        self
    }
}

impl RecordDraft for CropSheetDraft {
    type Record = CropSheet;

    const KIND: EntityKind = EntityKind::CropSheet;

    fn validated(mut self) -> DomainResult<Self> {
        self.name = self.name.trim().to_string();
        if self.name.is_empty() {
            return Err(DomainError::validation("name is required"));
        }
        if let (Some(min), Some(max)) = (self.temp_min, self.temp_max) {
            if min > max {
                return Err(DomainError::validation(
                    "minimum temperature exceeds maximum temperature",
                ));
            }
        }
        self.varieties.retain(|v| !v.trim().is_empty());
        Ok(self)
    }
}
