//! Operator drafts: what a form submits before the remote service confirms it.

use serde::Serialize;
use serde::de::DeserializeOwned;

use zbalo_core::{DomainResult, Entity};

use crate::crop::CropCycleDraft;
use crate::expense::ExpenseDraft;
use crate::kind::EntityKind;
use crate::maintenance::MaintenanceDraft;
use crate::reminder::ReminderDraft;
use crate::sale::SaleDraft;
use crate::sheet::CropSheetDraft;
use crate::stock::StockDraft;

/// A draft for one record kind.
///
/// Each draft owns its validation; `validated` normalises the draft and is
/// the only gate before a request leaves the process.
pub trait RecordDraft: Serialize + Clone {
    /// The confirmed record the remote service returns for this draft.
    type Record: Entity + DeserializeOwned + Clone;

    const KIND: EntityKind;

    /// Check required fields and normalise the payload.
    fn validated(self) -> DomainResult<Self>;
}

/// Closed set of editable record kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum Draft {
    CropCycle(CropCycleDraft),
    Maintenance(MaintenanceDraft),
    Stock(StockDraft),
    Sale(SaleDraft),
    Expense(ExpenseDraft),
    Reminder(ReminderDraft),
    CropSheet(CropSheetDraft),
}

impl Draft {
    pub fn kind(&self) -> EntityKind {
        match self {
            Draft::CropCycle(_) => CropCycleDraft::KIND,
            Draft::Maintenance(_) => MaintenanceDraft::KIND,
            Draft::Stock(_) => StockDraft::KIND,
            Draft::Sale(_) => SaleDraft::KIND,
            Draft::Expense(_) => ExpenseDraft::KIND,
            Draft::Reminder(_) => ReminderDraft::KIND,
            Draft::CropSheet(_) => CropSheetDraft::KIND,
        }
    }

    pub fn validated(self) -> DomainResult<Self> {
        Ok(match self {
            Draft::CropCycle(d) => Draft::CropCycle(d.validated()?),
            Draft::Maintenance(d) => Draft::Maintenance(d.validated()?),
            Draft::Stock(d) => Draft::Stock(d.validated()?),
            Draft::Sale(d) => Draft::Sale(d.validated()?),
            Draft::Expense(d) => Draft::Expense(d.validated()?),
            Draft::Reminder(d) => Draft::Reminder(d.validated()?),
            Draft::CropSheet(d) => Draft::CropSheet(d.validated()?),
        })
    }
}

macro_rules! impl_from_draft {
    ($variant:ident, $t:ty) => {
        impl From<$t> for Draft {
            fn from(value: $t) -> Self {
                Draft::$variant(value)
            }
        }
    };
}

impl_from_draft!(CropCycle, CropCycleDraft);
impl_from_draft!(Maintenance, MaintenanceDraft);
impl_from_draft!(Stock, StockDraft);
impl_from_draft!(Sale, SaleDraft);
impl_from_draft!(Expense, ExpenseDraft);
impl_from_draft!(Reminder, ReminderDraft);
impl_from_draft!(CropSheet, CropSheetDraft);
