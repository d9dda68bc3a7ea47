//! Operator-editable vocabularies (maintenance types, crop statuses,
//! sheet categories, sale units).

use serde::{Deserialize, Serialize};

use zbalo_core::{DomainError, DomainResult};

use crate::serde_util;

/// Name of one vocabulary list on the remote settings endpoint.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VocabularyKey {
    #[serde(rename = "types_entretien")]
    MaintenanceTypes,
    #[serde(rename = "statuts_culture")]
    CropStatuses,
    #[serde(rename = "categories_legume")]
    SheetCategories,
    #[serde(rename = "unites_vente")]
    SaleUnits,
}

impl VocabularyKey {
    pub const ALL: [VocabularyKey; 4] = [
        VocabularyKey::MaintenanceTypes,
        VocabularyKey::CropStatuses,
        VocabularyKey::SheetCategories,
        VocabularyKey::SaleUnits,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VocabularyKey::MaintenanceTypes => "types_entretien",
            VocabularyKey::CropStatuses => "statuts_culture",
            VocabularyKey::SheetCategories => "categories_legume",
            VocabularyKey::SaleUnits => "unites_vente",
        }
    }

    /// Options offered when the service holds no list for this key.
    pub fn defaults(&self) -> &'static [&'static str] {
        match self {
            VocabularyKey::MaintenanceTypes => &[
                "Arrosage",
                "Taille",
                "Fertilisation",
                "Désherbage",
                "Traitement bio",
                "Autre",
            ],
            VocabularyKey::CropStatuses => &["En cours", "En attente", "Terminé"],
            VocabularyKey::SheetCategories => &[
                "Fruit",
                "Mini",
                "Feuille",
                "Racine",
                "Herbe",
                "Brassica",
                "Allium",
                "Légumineuse",
                "Élevage",
            ],
            VocabularyKey::SaleUnits => &[
                "kg", "pièce", "botte", "barquette", "sachet", "pot", "tête", "graine", "litre",
                "caisse", "douzaine",
            ],
        }
    }
}

impl core::fmt::Display for VocabularyKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The named lists; order within a list is display order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigurationVocabulary {
    #[serde(
        rename = "types_entretien",
        default,
        deserialize_with = "serde_util::optional_string_list",
        skip_serializing_if = "Option::is_none"
    )]
    pub maintenance_types: Option<Vec<String>>,
    #[serde(
        rename = "statuts_culture",
        default,
        deserialize_with = "serde_util::optional_string_list",
        skip_serializing_if = "Option::is_none"
    )]
    pub crop_statuses: Option<Vec<String>>,
    #[serde(
        rename = "categories_legume",
        default,
        deserialize_with = "serde_util::optional_string_list",
        skip_serializing_if = "Option::is_none"
    )]
    pub sheet_categories: Option<Vec<String>>,
    #[serde(
        rename = "unites_vente",
        default,
        deserialize_with = "serde_util::optional_string_list",
        skip_serializing_if = "Option::is_none"
    )]
    pub sale_units: Option<Vec<String>>,
}

impl ConfigurationVocabulary {
    fn slot(&self, key: VocabularyKey) -> &Option<Vec<String>> {
        match key {
            VocabularyKey::MaintenanceTypes => &self.maintenance_types,
            VocabularyKey::CropStatuses => &self.crop_statuses,
            VocabularyKey::SheetCategories => &self.sheet_categories,
            VocabularyKey::SaleUnits => &self.sale_units,
        }
    }

    fn slot_mut(&mut self, key: VocabularyKey) -> &mut Option<Vec<String>> {
        match key {
            VocabularyKey::MaintenanceTypes => &mut self.maintenance_types,
            VocabularyKey::CropStatuses => &mut self.crop_statuses,
            VocabularyKey::SheetCategories => &mut self.sheet_categories,
            VocabularyKey::SaleUnits => &mut self.sale_units,
        }
    }

    /// The stored list, empty when the service holds none.
    pub fn list(&self, key: VocabularyKey) -> &[String] {
        self.slot(key).as_deref().unwrap_or_default()
    }

    /// Options to present in a form: the stored list, or the built-in
    /// defaults when none is stored.
    pub fn options(&self, key: VocabularyKey) -> Vec<String> {
        match self.slot(key) {
            Some(list) => list.clone(),
            None => key.defaults().iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Replace one list wholesale.
    pub fn set(&mut self, key: VocabularyKey, values: Vec<String>) {
        *self.slot_mut(key) = Some(values);
    }

    /// Replacement list with `value` appended.
    ///
    /// Returns `Ok(None)` when the value is already present (nothing to send).
    pub fn with_added(&self, key: VocabularyKey, value: &str) -> DomainResult<Option<Vec<String>>> {
        let value = value.trim();
        if value.is_empty() {
            return Err(DomainError::validation("option cannot be blank"));
        }
        let mut list = self.list(key).to_vec();
        if list.iter().any(|o| o == value) {
            return Ok(None);
        }
        list.push(value.to_string());
        Ok(Some(list))
    }

    /// Replacement list with the entry at `index` renamed.
    pub fn with_renamed(&self, key: VocabularyKey, index: usize, value: &str) -> DomainResult<Vec<String>> {
        let value = value.trim();
        if value.is_empty() {
            return Err(DomainError::validation("option cannot be blank"));
        }
        let mut list = self.list(key).to_vec();
        let slot = list
            .get_mut(index)
            .ok_or_else(|| DomainError::validation(format!("no option at index {index} in {key}")))?;
        *slot = value.to_string();
        Ok(list)
    }

    /// Replacement list with the entry at `index` removed.
    pub fn with_removed(&self, key: VocabularyKey, index: usize) -> DomainResult<Vec<String>> {
        let mut list = self.list(key).to_vec();
        if index >= list.len() {
            return Err(DomainError::validation(format!("no option at index {index} in {key}")));
        }
        list.remove(index);
        Ok(list)
    }
}
