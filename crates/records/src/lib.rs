//! Farm records domain model.
//!
//! Wire shapes of every record the remote service holds, the drafts an
//! operator submits, and the configurable vocabularies. Pure data and
//! validation: no IO, no HTTP, no storage.

pub mod assistant;
pub mod crop;
pub mod draft;
pub mod expense;
pub mod kind;
pub mod maintenance;
pub mod plot;
pub mod receipt;
pub mod reminder;
pub mod sale;
pub mod serde_util;
pub mod sheet;
pub mod stats;
pub mod stock;
pub mod vocabulary;

pub use assistant::{ChatReply, ChatRequest, ChatTurn, ExecutedAction, Role};
pub use crop::{CropCycle, CropCycleDraft, CropPhase, SowingMode};
pub use draft::{Draft, RecordDraft};
pub use expense::{ExpenseDraft, ExpenseRecord, Provenance};
pub use kind::{CreatePlacement, EntityKind};
pub use maintenance::{MaintenanceDraft, MaintenanceEvent};
pub use plot::Plot;
pub use receipt::{ReceiptExtract, ReceiptScanRequest, ReceiptScanResponse};
pub use reminder::{Reminder, ReminderDraft};
pub use sale::{SaleDraft, SaleRecord};
pub use sheet::{CropSheet, CropSheetDraft};
pub use stats::DashboardStats;
pub use stock::{StockDraft, StockItem, StockLevel};
pub use vocabulary::{ConfigurationVocabulary, VocabularyKey};
