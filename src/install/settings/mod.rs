//! Settings: definitions, the per-run registry and reconciliation

mod catalog;
mod reconcile;
mod setting;

pub use catalog::{ALL_SETTINGS, SIGNING_ALGORITHM, SettingRegistry, definition};
pub use reconcile::{ConfigurationGap, Reconciled, ReconciliationReport, ValueSource, reconcile};
pub use setting::{Carry, Requirement, Setting, SettingDef, StoreSection};
