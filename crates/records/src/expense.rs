//! Expenses, entered by hand or recognized from a receipt image.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use zbalo_core::{DomainError, DomainResult, Entity, RecordId};

use crate::draft::RecordDraft;
use crate::kind::EntityKind;
use crate::serde_util;

/// Where an expense record came from.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    #[default]
    Manual,
    Recognized,
}

impl Provenance {
    fn from_flag(scanned: bool) -> Self {
        if scanned {
            Provenance::Recognized
        } else {
            Provenance::Manual
        }
    }

    pub fn is_recognized(&self) -> bool {
        matches!(self, Provenance::Recognized)
    }
}

fn provenance_flag<'de, D>(deserializer: D) -> Result<Provenance, D::Error>
where
    D: serde::Deserializer<'de>,
{
    serde_util::flag(deserializer).map(Provenance::from_flag)
}

fn serialize_provenance<S>(value: &Provenance, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_bool(value.is_recognized())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    pub id: RecordId,
    #[serde(default, with = "serde_util::date")]
    pub date: Option<NaiveDate>,
    #[serde(rename = "fournisseur", default)]
    pub supplier: Option<String>,
    /// Value from the expense-category vocabulary.
    #[serde(rename = "categorie", default)]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "serde_util::number")]
    pub total: Option<f64>,
    #[serde(rename = "articles", default, deserialize_with = "serde_util::string_list")]
    pub line_items: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(
        rename = "scan_ai",
        default,
        deserialize_with = "provenance_flag",
        serialize_with = "serialize_provenance"
    )]
    pub provenance: Provenance,
}

impl ExpenseRecord {
    /// Total amount, zero when missing or non-numeric.
    pub fn amount(&self) -> f64 {
        self.total.unwrap_or(0.0)
    }

    pub fn category(&self) -> &str {
        self.category.as_deref().unwrap_or_default()
    }

    pub fn to_draft(&self) -> ExpenseDraft {
        ExpenseDraft {
            date: self.date,
            supplier: self.supplier.clone().unwrap_or_default(),
            category: self.category.clone(),
            total: self.total,
            line_items: self.line_items.clone(),
            notes: self.notes.clone().unwrap_or_default(),
            provenance: self.provenance,
        }
    }
}

impl Entity for ExpenseRecord {
    fn id(&self) -> RecordId {
        self.id
    }
}

/// Built-in expense categories offered by the expense form.
pub const EXPENSE_CATEGORIES: [&str; 7] = [
    "Graines & semences",
    "Terreau & substrat",
    "Matériel & outillage",
    "Engrais & traitement",
    "Élevage & animaux",
    "Énergie & eau",
    "Autre",
];

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExpenseDraft {
    #[serde(with = "serde_util::date")]
    pub date: Option<NaiveDate>,
    #[serde(rename = "fournisseur")]
    pub supplier: String,
    #[serde(rename = "categorie")]
    pub category: Option<String>,
    pub total: Option<f64>,
    #[serde(rename = "articles")]
    pub line_items: Vec<String>,
    pub notes: String,
    #[serde(rename = "scanAI", serialize_with = "serialize_provenance")]
    pub provenance: Provenance,
}

impl ExpenseDraft {
    /// Line items from a multi-line text input: one per line, blanks dropped.
    pub fn with_line_items_text(mut self, raw: &str) -> Self {
        self.line_items = raw
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        self
    }

    /// Total from the raw form input; blank or non-numeric leaves it unset.
    pub fn with_total_input(mut self, raw: &str) -> Self {
        self.total = serde_util::parse_amount(raw);
        self
    }
}

impl RecordDraft for ExpenseDraft {
    type Record = ExpenseRecord;

    const KIND: EntityKind = EntityKind::Expense;

    fn validated(mut self) -> DomainResult<Self> {
        self.supplier = self.supplier.trim().to_string();
        if self.supplier.is_empty() || self.total.is_none() {
            return Err(DomainError::validation("supplier and amount are required"));
        }
        self.line_items.retain(|item| !item.trim().is_empty());
        self.category = serde_util::non_blank(self.category);
        Ok(self)
    }
}
