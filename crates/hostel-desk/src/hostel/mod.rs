//! Owner accounts, room setup, tenant lifecycle and rent tracking.

pub mod accounts;
pub mod domain;
pub mod export;
pub mod memory;
pub mod router;
pub mod service;
pub mod sqlite;
pub mod store;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use crate::config::StoreConfig;

pub use accounts::Credentials;
pub use domain::{
    Month, Payment, PaymentId, RoomConfig, RoomType, Tenant, TenantId, TenantStatus, UserAccount,
    UserId, VacancyEntry,
};
pub use export::{export_tenants_csv, ExportError};
pub use memory::InMemoryHostelStore;
pub use router::hostel_router;
pub use service::{
    BalanceStatement, CheckoutReceipt, DashboardSummary, HostelService, HostelServiceError,
    NewTenantRequest, PaymentRequest, RoomSetup, SettlementStatement,
};
pub use sqlite::SqliteHostelStore;
pub use store::{HostelStore, StoreError};

/// Opens the configured store; `:memory:` selects the process-local store.
pub fn open_store(config: &StoreConfig) -> Result<Arc<dyn HostelStore>, StoreError> {
    if config.is_in_memory() {
        return Ok(Arc::new(InMemoryHostelStore::new()));
    }
    Ok(Arc::new(SqliteHostelStore::open(&config.database_path)?))
}
