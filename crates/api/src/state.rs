use std::sync::Arc;
use std::time::Duration;

use arogya_core::gateway::RecordGateway;
use arogya_core::grant::AccessGrantService;
use arogya_core::memory::{
    MemoryAccessRequestStore, MemoryOwnerDirectory, MemoryRecordStore, MemoryUserDirectory,
};
use arogya_core::otp::OtpGenerator;
use arogya_core::ports::{
    AccessRequestStore, NotificationPort, OwnerDirectory, RecordStore, Summarizer, UserDirectory,
};
use arogya_db::stores::{PgAccessRequestStore, PgOwnerDirectory, PgRecordStore, PgUserDirectory};
use arogya_db::DbPool;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: services hold their collaborators behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// The consent handshake (request, verify, status lookup).
    pub grants: AccessGrantService,
    /// Grant-gated record and profile access.
    pub gateway: RecordGateway,
    /// Staff accounts for login.
    pub users: Arc<dyn UserDirectory>,
    /// Database pool, when running against Postgres (used by the health check).
    pub pool: Option<DbPool>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
}

/// Persistence collaborators, either all Postgres or all in-memory.
#[derive(Clone)]
pub struct Stores {
    pub requests: Arc<dyn AccessRequestStore>,
    pub records: Arc<dyn RecordStore>,
    pub owners: Arc<dyn OwnerDirectory>,
    pub users: Arc<dyn UserDirectory>,
    pub pool: Option<DbPool>,
}

impl Stores {
    pub fn postgres(pool: DbPool) -> Self {
        Self {
            requests: Arc::new(PgAccessRequestStore::new(pool.clone())),
            records: Arc::new(PgRecordStore::new(pool.clone())),
            owners: Arc::new(PgOwnerDirectory::new(pool.clone())),
            users: Arc::new(PgUserDirectory::new(pool.clone())),
            pool: Some(pool),
        }
    }

    /// In-memory stores. The concrete directories are returned as well so the
    /// caller can seed owners and staff accounts.
    pub fn memory() -> (Self, Arc<MemoryOwnerDirectory>, Arc<MemoryUserDirectory>) {
        let owners = Arc::new(MemoryOwnerDirectory::new());
        let users = Arc::new(MemoryUserDirectory::new());
        let stores = Self {
            requests: Arc::new(MemoryAccessRequestStore::new()),
            records: Arc::new(MemoryRecordStore::new()),
            owners: owners.clone(),
            users: users.clone(),
            pool: None,
        };
        (stores, owners, users)
    }
}

impl AppState {
    /// Wire the access services over the given stores and adapters.
    pub fn new(
        stores: Stores,
        notifier: Arc<dyn NotificationPort>,
        summarizer: Arc<dyn Summarizer>,
        config: ServerConfig,
    ) -> Self {
        let grants = AccessGrantService::new(
            stores.requests,
            stores.owners.clone(),
            notifier,
            OtpGenerator::from_secs(config.access.otp_ttl_secs),
        )
        .with_delivery_wait(Duration::from_millis(config.access.otp_delivery_wait_ms));
        let gateway = RecordGateway::new(
            grants.clone(),
            stores.records,
            stores.owners,
            summarizer,
        );
        Self {
            grants,
            gateway,
            users: stores.users,
            pool: stores.pool,
            config: Arc::new(config),
        }
    }
}
