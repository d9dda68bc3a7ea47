//! Stock items (seeds, substrate, produce on hand).

use serde::{Deserialize, Serialize};

use zbalo_core::{DomainError, DomainResult, Entity, RecordId};

use crate::draft::RecordDraft;
use crate::kind::EntityKind;
use crate::serde_util;

/// Fill tier shown next to a stock gauge.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockLevel {
    Out,
    Low,
    Ok,
}

impl StockLevel {
    pub fn from_percent(percent: u8) -> Self {
        match percent {
            0..20 => StockLevel::Out,
            20..50 => StockLevel::Low,
            _ => StockLevel::Ok,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockItem {
    pub id: RecordId,
    #[serde(rename = "nom")]
    pub name: String,
    #[serde(rename = "qte", default, deserialize_with = "serde_util::number_or_zero")]
    pub quantity: f64,
    #[serde(rename = "qte_max", default, deserialize_with = "serde_util::number_or_zero")]
    pub max_quantity: f64,
    #[serde(rename = "unite", default)]
    pub unit: Option<String>,
    #[serde(rename = "prix", default, deserialize_with = "serde_util::number_or_zero")]
    pub unit_price: f64,
    #[serde(rename = "fournisseur", default)]
    pub supplier: Option<String>,
}

impl StockItem {
    /// Fill level in percent, `quantity / max` clamped to `[0, 100]`.
    ///
    /// An item without a maximum reads as half full.
    pub fn level_percent(&self) -> u8 {
        if self.max_quantity <= 0.0 {
            return 50;
        }
        let pct = (self.quantity / self.max_quantity * 100.0).round();
        pct.clamp(0.0, 100.0) as u8
    }

    pub fn level(&self) -> StockLevel {
        StockLevel::from_percent(self.level_percent())
    }

    pub fn to_draft(&self) -> StockDraft {
        StockDraft {
            name: self.name.clone(),
            quantity: self.quantity,
            max_quantity: self.max_quantity,
            unit: self.unit.clone().unwrap_or_else(|| StockDraft::DEFAULT_UNIT.to_string()),
            unit_price: self.unit_price,
            supplier: self.supplier.clone().unwrap_or_default(),
        }
    }
}

impl Entity for StockItem {
    fn id(&self) -> RecordId {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockDraft {
    #[serde(rename = "nom")]
    pub name: String,
    #[serde(rename = "qte")]
    pub quantity: f64,
    #[serde(rename = "qteMax")]
    pub max_quantity: f64,
    #[serde(rename = "unite")]
    pub unit: String,
    #[serde(rename = "prix")]
    pub unit_price: f64,
    #[serde(rename = "fournisseur")]
    pub supplier: String,
}

impl StockDraft {
    pub const DEFAULT_MAX: f64 = 100.0;
    pub const DEFAULT_UNIT: &'static str = "kg";
}

impl Default for StockDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            quantity: 0.0,
            max_quantity: Self::DEFAULT_MAX,
            unit: Self::DEFAULT_UNIT.to_string(),
            unit_price: 0.0,
            supplier: String::new(),
        }
    }
}

impl RecordDraft for StockDraft {
    type Record = StockItem;

    const KIND: EntityKind = EntityKind::StockItem;

    fn validated(mut self) -> DomainResult<Self> {
        self.name = self.name.trim().to_string();
        if self.name.is_empty() {
            return Err(DomainError::validation("name is required"));
        }
        if self.unit.trim().is_empty() {
            self.unit = Self::DEFAULT_UNIT.to_string();
        }
        if !self.quantity.is_finite() {
            self.quantity = 0.0;
        }
        if !self.max_quantity.is_finite() || self.max_quantity == 0.0 {
            self.max_quantity = Self::DEFAULT_MAX;
        }
        if !self.unit_price.is_finite() {
            self.unit_price = 0.0;
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(quantity: f64, max_quantity: f64) -> StockItem {
        StockItem {
            id: RecordId::new(1),
            name: "Terreau".into(),
            quantity,
            max_quantity,
            unit: Some("sac".into()),
            unit_price: 0.0,
            supplier: None,
        }
    }

    #[test]
    fn level_is_clamped() {
        assert_eq!(item(250.0, 100.0).level_percent(), 100);
        assert_eq!(item(-5.0, 100.0).level_percent(), 0);
        assert_eq!(item(33.0, 100.0).level_percent(), 33);
    }

    #[test]
    fn level_tiers() {
        assert_eq!(item(10.0, 100.0).level(), StockLevel::Out);
        assert_eq!(item(20.0, 100.0).level(), StockLevel::Low);
        assert_eq!(item(50.0, 100.0).level(), StockLevel::Ok);
        assert_eq!(item(3.0, 0.0).level(), StockLevel::Ok);
    }

    #[test]
    fn draft_fills_defaults() {
        let draft = StockDraft {
            name: "  Graines basilic ".into(),
            unit: " ".into(),
            max_quantity: 0.0,
            ..Default::default()
        }
        .validated()
        .unwrap();
        assert_eq!(draft.name, "Graines basilic");
        assert_eq!(draft.unit, "kg");
        assert_eq!(draft.max_quantity, 100.0);
    }

    #[test]
    fn draft_rejects_blank_name() {
        assert!(StockDraft::default().validated().is_err());
    }
}
