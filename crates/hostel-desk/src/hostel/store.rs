use chrono::NaiveDate;

use super::domain::{
    NewPayment, NewTenant, NewUser, Payment, RoomConfig, RoomType, Tenant, TenantId, TenantStatus,
    UserAccount, UserId,
};

/// Storage abstraction over users, room configuration, tenants and payments.
///
/// Implementations serialize their own writes; callers only ever see snapshots.
pub trait HostelStore: Send + Sync {
    /// Fails with [`StoreError::Conflict`] when the email is taken.
    fn insert_user(&self, user: NewUser) -> Result<UserAccount, StoreError>;
    fn user_by_email(&self, email: &str) -> Result<Option<UserAccount>, StoreError>;

    /// Replaces any existing configuration for the same owner and room type.
    fn replace_room_config(&self, config: RoomConfig) -> Result<(), StoreError>;
    fn room_config(
        &self,
        owner: UserId,
        room_type: RoomType,
    ) -> Result<Option<RoomConfig>, StoreError>;
    fn room_configs(&self, owner: UserId) -> Result<Vec<RoomConfig>, StoreError>;

    fn insert_tenant(&self, tenant: NewTenant) -> Result<Tenant, StoreError>;
    fn tenant(&self, id: TenantId) -> Result<Option<Tenant>, StoreError>;
    /// Tenants for the owner ordered by id, optionally narrowed to one status.
    fn tenants(
        &self,
        owner: UserId,
        status: Option<TenantStatus>,
    ) -> Result<Vec<Tenant>, StoreError>;
    fn count_active(&self, owner: UserId, room_type: RoomType) -> Result<i64, StoreError>;
    /// Fails with [`StoreError::Conflict`] unless the tenant is still active.
    fn mark_checked_out(
        &self,
        id: TenantId,
        checkout_date: NaiveDate,
    ) -> Result<Tenant, StoreError>;

    /// Fails with [`StoreError::Conflict`] when the tenant is no longer active.
    fn insert_payment(&self, payment: NewPayment) -> Result<Payment, StoreError>;
    /// Payments for the tenant in the order they were recorded.
    fn payments_for(&self, tenant: TenantId) -> Result<Vec<Payment>, StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record conflicts with stored state")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
