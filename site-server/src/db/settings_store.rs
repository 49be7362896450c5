//! redb-based storage for the site settings document (singleton)

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use shared::models::SiteSettings;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Settings table: key = singleton id, value = JSON document
const SETTINGS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("site_settings");

const SINGLETON_ID: &str = "main";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<StoreError> for shared::error::AppError {
    fn from(e: StoreError) -> Self {
        shared::error::AppError::database(e.to_string())
    }
}

/// Authoritative store for the settings document
#[derive(Clone)]
pub struct SettingsStore {
    db: Arc<Database>,
}

impl std::fmt::Debug for SettingsStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsStore").finish_non_exhaustive()
    }
}

impl SettingsStore {
    /// Open or create database
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::create(path)?;
        Self::init(db)
    }

    /// Open in-memory database (tests, ephemeral previews)
    pub fn open_in_memory() -> StoreResult<Self> {
        let db =
            Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db)
    }

    fn init(db: Database) -> StoreResult<Self> {
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(SETTINGS_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Get the stored document, `None` if it was never written
    pub fn get(&self) -> StoreResult<Option<SiteSettings>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SETTINGS_TABLE)?;

        match table.get(SINGLETON_ID)? {
            Some(guard) => {
                let settings: SiteSettings = serde_json::from_slice(guard.value())?;
                Ok(Some(settings))
            }
            None => Ok(None),
        }
    }

    /// Get the stored document or the empty default
    ///
    /// "Never written" and "empty" are the same thing to readers.
    pub fn get_or_default(&self) -> StoreResult<SiteSettings> {
        Ok(self.get()?.unwrap_or_default())
    }

    /// Replace the whole document and return what was stored
    pub fn replace(&self, settings: &SiteSettings) -> StoreResult<SiteSettings> {
        let value = serde_json::to_vec(settings)?;

        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(SETTINGS_TABLE)?;
            table.insert(SINGLETON_ID, value.as_slice())?;
        }
        write_txn.commit()?;

        Ok(settings.clone())
    }
}
