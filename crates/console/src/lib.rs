//! Farm management console: a local mirror of the remote record service,
//! the gateway that mutates it, and the views derived from it.

pub mod aggregation;
pub mod assistant;
pub mod charts;
pub mod config;
pub mod console;
pub mod dashboard;
pub mod error;
pub mod gateway;
pub mod loader;
pub mod preferences;
pub mod receipts;
pub mod reminders;
pub mod service;
pub mod status;
pub mod store;

#[cfg(test)]
mod testing;

pub use aggregation::{AggregationEngine, HistoryReport, LedgerFilter, LedgerReport, Period};
pub use assistant::{AssistantBridge, ExternalMutation};
pub use charts::{ChartRenderer, RasterSurface, Surface};
pub use config::ConsoleConfig;
pub use console::{Confirm, Console};
pub use error::{ConsoleError, ConsoleResult, ServiceError, ServiceResult};
pub use gateway::MutationGateway;
pub use loader::BulkLoader;
pub use reminders::{ReminderScheduler, Urgency};
pub use service::{HttpRecordService, RecordService};
pub use status::StatusNotifier;
pub use store::{RecordStore, Snapshot};
