//! Data storage layer
//!
//! - `sqlite` - Embedded database, schema, migrations and repositories
//! - `types` - Row types shared by repositories and services
//! - `traits` - Repository traits the services are written against
//! - `error` - Unified error type

pub mod error;
pub mod sqlite;
pub mod traits;
pub mod types;

pub use sqlite::SqliteService;

pub use error::DataError;

pub use traits::{AnalyticsRepository, TransactionalRepository};

use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::core::storage::AppStorage;

/// Database service
///
/// Wraps the backend-specific service and hands out repository trait
/// objects for data operations.
pub enum TransactionalService {
    /// SQLite backend (embedded)
    Sqlite(Arc<SqliteService>),
}

impl TransactionalService {
    /// Initialize the database under the storage directory
    pub async fn init(storage: &AppStorage) -> Result<Self, DataError> {
        let service = SqliteService::init(storage).await?;
        Ok(Self::Sqlite(Arc::new(service)))
    }

    /// Migrated in-memory database
    pub async fn in_memory() -> Result<Self, DataError> {
        let service = SqliteService::in_memory().await?;
        Ok(Self::Sqlite(Arc::new(service)))
    }

    /// Run a WAL checkpoint
    pub async fn checkpoint(&self) -> Result<(), DataError> {
        match self {
            Self::Sqlite(s) => s.checkpoint().await.map_err(Into::into),
        }
    }

    /// Close the database connection gracefully
    pub async fn close(&self) {
        match self {
            Self::Sqlite(s) => s.close().await,
        }
    }

    /// Start the background checkpoint task
    pub fn start_checkpoint_task(&self, shutdown_rx: watch::Receiver<bool>) -> JoinHandle<()> {
        match self {
            Self::Sqlite(s) => s.start_checkpoint_task(shutdown_rx),
        }
    }

    /// Repository for users, rooms, teams, messages and emoji
    pub fn repository(&self) -> Box<dyn TransactionalRepository + Send + Sync> {
        match self {
            Self::Sqlite(s) => Box::new(Arc::clone(s)),
        }
    }

    /// Repository for engagement analytics and sessions
    pub fn analytics(&self) -> Box<dyn AnalyticsRepository + Send + Sync> {
        match self {
            Self::Sqlite(s) => Box::new(Arc::clone(s)),
        }
    }
}
