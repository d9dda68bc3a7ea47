//! Sales of produce.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use zbalo_core::{DomainError, DomainResult, Entity, RecordId};

use crate::draft::RecordDraft;
use crate::kind::EntityKind;
use crate::serde_util;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleRecord {
    pub id: RecordId,
    #[serde(default, with = "serde_util::date")]
    pub date: Option<NaiveDate>,
    #[serde(rename = "produit", default)]
    pub product: String,
    #[serde(rename = "qte", default, deserialize_with = "serde_util::number_or_zero")]
    pub quantity: f64,
    #[serde(rename = "unite", default)]
    pub unit: Option<String>,
    #[serde(rename = "prix_unit", default, deserialize_with = "serde_util::number_or_zero")]
    pub unit_price: f64,
    #[serde(default)]
    pub client: Option<String>,
}

impl SaleRecord {
    /// Revenue is always derived, never stored.
    pub fn revenue(&self) -> f64 {
        self.quantity * self.unit_price
    }
}

impl Entity for SaleRecord {
    fn id(&self) -> RecordId {
        self.id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SaleDraft {
    #[serde(with = "serde_util::date")]
    pub date: Option<NaiveDate>,
    #[serde(rename = "produit")]
    pub product: String,
    #[serde(rename = "qte")]
    pub quantity: f64,
    #[serde(rename = "prixUnit")]
    pub unit_price: f64,
    #[serde(rename = "unite")]
    pub unit: Option<String>,
    pub client: Option<String>,
}

impl RecordDraft for SaleDraft {
    type Record = SaleRecord;

    const KIND: EntityKind = EntityKind::Sale;

    fn validated(mut self) -> DomainResult<Self> {
        self.product = self.product.trim().to_string();
        let missing_quantity = !self.quantity.is_finite() || self.quantity == 0.0;
        let missing_price = !self.unit_price.is_finite() || self.unit_price == 0.0;
        if self.product.is_empty() || missing_quantity || missing_price {
            return Err(DomainError::validation(
                "product, quantity and unit price are required",
            ));
        }
        self.client = serde_util::non_blank(self.client);
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn revenue_is_quantity_times_price() {
        let sale: SaleRecord = serde_json::from_str(
            r#"{"id": 9, "date": "2024-07-14", "produit": "Tomate", "qte": 3, "prix_unit": 2.5}"#,
        )
        .unwrap();
        assert_eq!(sale.revenue(), 7.5);
    }

    #[test]
    fn draft_requires_non_zero_quantity_and_price() {
        let draft = SaleDraft {
            product: "Tomate".into(),
            quantity: 0.0,
            unit_price: 2.5,
            ..Default::default()
        };
        assert!(draft.validated().is_err());

        let draft = SaleDraft {
            product: "Tomate".into(),
            quantity: 3.0,
            unit_price: f64::NAN,
            ..Default::default()
        };
        assert!(draft.validated().is_err());
    }

    #[test]
    fn draft_serializes_request_keys() {
        let draft = SaleDraft {
            date: NaiveDate::from_ymd_opt(2024, 7, 14),
            product: "Tomate".into(),
            quantity: 3.0,
            unit_price: 2.5,
            unit: Some("kg".into()),
            client: None,
        };
        let json = serde_json::to_value(&draft).unwrap();
        assert_eq!(json["prixUnit"], 2.5);
        assert_eq!(json["produit"], "Tomate");
        assert_eq!(json["date"], "2024-07-14");
    }
}
