//! Receipt recognition payloads.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::expense::{ExpenseDraft, Provenance};
use crate::serde_util;

/// Upload body: base64 image data (no data-URL prefix) and its media type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReceiptScanRequest {
    pub image: String,
    #[serde(rename = "mediaType")]
    pub media_type: String,
}

/// Fields the recognition service read off a receipt. Unreadable fields
/// come back as null.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ReceiptExtract {
    #[serde(with = "serde_util::date")]
    pub date: Option<NaiveDate>,
    #[serde(rename = "fournisseur")]
    pub supplier: Option<String>,
    #[serde(rename = "categorie")]
    pub category: Option<String>,
    #[serde(deserialize_with = "serde_util::number")]
    pub total: Option<f64>,
    #[serde(rename = "articles", deserialize_with = "serde_util::string_list")]
    pub line_items: Vec<String>,
    pub notes: Option<String>,
}

impl ReceiptExtract {
    /// Expense draft marked as recognized; it still goes through the usual
    /// expense validation before saving.
    pub fn into_draft(self) -> ExpenseDraft {
        ExpenseDraft {
            date: self.date,
            supplier: self.supplier.unwrap_or_default(),
            category: self.category,
            total: self.total,
            line_items: self.line_items,
            notes: self.notes.unwrap_or_default(),
            provenance: Provenance::Recognized,
        }
    }
}

/// Either `{ok: true, data}` or `{error}`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ReceiptScanResponse {
    pub ok: bool,
    pub data: Option<ReceiptExtract>,
    pub error: Option<String>,
}

impl ReceiptScanResponse {
    /// The extract, or the service's message when recognition failed.
    pub fn into_result(self) -> Result<ReceiptExtract, String> {
        match (self.ok, self.data) {
            (true, Some(data)) => Ok(data),
            _ => Err(self
                .error
                .unwrap_or_else(|| "receipt could not be read".to_string())),
        }
    }
}
