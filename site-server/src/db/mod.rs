//! Database Module
//!
//! Embedded redb store for the settings document

pub mod settings_store;

pub use settings_store::{SettingsStore, StoreError, StoreResult};
