use chrono::{Local, NaiveDate, SubsecRound};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use super::accounts::{hash_password, verify_password, Credentials, DEFAULT_SUBSCRIPTION};
use super::domain::{
    Month, NewPayment, NewTenant, NewUser, Payment, RoomConfig, RoomType, Tenant, TenantId,
    TenantStatus, UserAccount, UserId, VacancyEntry,
};
use super::store::{HostelStore, StoreError};
use crate::ledger::{Balance, Settlement};

/// Capacity and rent for one room type.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RoomSetup {
    pub room_type: RoomType,
    pub capacity: i64,
    pub rent: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewTenantRequest {
    pub name: String,
    #[serde(default)]
    pub contact: String,
    pub room_type: RoomType,
    #[serde(default)]
    pub building: Option<String>,
    /// Defaults to the onboarding day.
    #[serde(default)]
    pub join_date: Option<NaiveDate>,
    #[serde(default)]
    pub security_deposit: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentRequest {
    pub amount: i64,
    pub month: Month,
    #[serde(default)]
    pub paid_on: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BalanceStatement {
    pub tenant_id: TenantId,
    pub name: String,
    pub status: TenantStatus,
    pub evaluated_on: NaiveDate,
    #[serde(flatten)]
    pub balance: Balance,
}

#[derive(Debug, Clone, Serialize)]
pub struct SettlementStatement {
    pub tenant_id: TenantId,
    pub name: String,
    pub status: TenantStatus,
    pub evaluated_on: NaiveDate,
    #[serde(flatten)]
    pub settlement: Settlement,
    pub summary: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckoutReceipt {
    pub tenant: Tenant,
    pub settlement: SettlementStatement,
}

/// Owner-level totals shown on the dashboard. Money totals cover active tenants only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DashboardSummary {
    pub active_tenants: usize,
    pub checked_out_tenants: usize,
    pub capacity: i64,
    pub occupied: i64,
    pub vacant: i64,
    pub accrued: i64,
    pub paid: i64,
    pub outstanding: i64,
}

/// Onboarding, payments, checkout and statements over a [`HostelStore`].
pub struct HostelService<S: ?Sized> {
    store: Arc<S>,
    currency: String,
}

impl<S> HostelService<S>
where
    S: HostelStore + ?Sized,
{
    pub fn new(store: Arc<S>, currency: impl Into<String>) -> Self {
        Self {
            store,
            currency: currency.into(),
        }
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn signup(&self, credentials: Credentials) -> Result<UserAccount, HostelServiceError> {
        credentials
            .validate()
            .map_err(HostelServiceError::InvalidInput)?;
        let email = credentials.normalized_email();

        let account = self
            .store
            .insert_user(NewUser {
                email: email.clone(),
                password_hash: hash_password(&credentials.password),
                subscription: DEFAULT_SUBSCRIPTION.to_string(),
            })
            .map_err(|err| match err {
                StoreError::Conflict => HostelServiceError::DuplicateEmail(email),
                other => other.into(),
            })?;

        info!(user_id = %account.id, "owner account created");
        Ok(account)
    }

    pub fn login(&self, credentials: Credentials) -> Result<UserAccount, HostelServiceError> {
        let email = credentials.normalized_email();
        match self.store.user_by_email(&email)? {
            Some(account) if verify_password(&credentials.password, &account.password_hash) => {
                Ok(account)
            }
            _ => {
                warn!("rejected login attempt");
                Err(HostelServiceError::InvalidCredentials)
            }
        }
    }

    pub fn configure_room(
        &self,
        owner: UserId,
        setup: RoomSetup,
    ) -> Result<RoomConfig, HostelServiceError> {
        if setup.capacity < 0 || setup.rent < 0 {
            return Err(HostelServiceError::InvalidInput(
                "capacity and rent must not be negative".to_string(),
            ));
        }

        let config = RoomConfig {
            owner_id: owner,
            room_type: setup.room_type,
            capacity: setup.capacity,
            rent: setup.rent,
        };
        self.store.replace_room_config(config)?;
        info!(
            owner_id = %owner,
            room_type = setup.room_type.label(),
            capacity = setup.capacity,
            rent = setup.rent,
            "room configuration saved"
        );
        Ok(config)
    }

    pub fn room_configs(&self, owner: UserId) -> Result<Vec<RoomConfig>, HostelServiceError> {
        let mut configs = self.store.room_configs(owner)?;
        configs.sort_by_key(|config| config.room_type);
        Ok(configs)
    }

    pub fn vacancy(&self, owner: UserId) -> Result<Vec<VacancyEntry>, HostelServiceError> {
        self.room_configs(owner)?
            .into_iter()
            .map(|config| -> Result<VacancyEntry, HostelServiceError> {
                let occupied = self.store.count_active(owner, config.room_type)?;
                Ok(VacancyEntry {
                    room_type: config.room_type,
                    capacity: config.capacity,
                    occupied,
                    vacant: config.capacity.saturating_sub(occupied),
                })
            })
            .collect()
    }

    pub fn onboard(
        &self,
        owner: UserId,
        request: NewTenantRequest,
        today: NaiveDate,
    ) -> Result<Tenant, HostelServiceError> {
        let name = request.name.trim().to_string();
        if name.is_empty() {
            return Err(HostelServiceError::InvalidInput(
                "tenant name must not be empty".to_string(),
            ));
        }
        if request.security_deposit < 0 {
            return Err(HostelServiceError::InvalidInput(
                "security deposit must not be negative".to_string(),
            ));
        }

        let rent = self
            .store
            .room_config(owner, request.room_type)?
            .map(|config| config.rent)
            .filter(|rent| *rent > 0)
            .ok_or(HostelServiceError::RoomNotConfigured(request.room_type))?;

        let building = request
            .building
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());

        let tenant = self.store.insert_tenant(NewTenant {
            owner_id: owner,
            name,
            contact: request.contact.trim().to_string(),
            room_type: request.room_type,
            building,
            created_at: Local::now().naive_local().trunc_subsecs(0),
            join_date: request.join_date.unwrap_or(today),
            monthly_rent: rent,
            security_deposit: request.security_deposit,
        })?;

        info!(
            owner_id = %owner,
            tenant_id = %tenant.id,
            room_type = tenant.room_type.label(),
            monthly_rent = tenant.monthly_rent,
            "tenant onboarded"
        );
        Ok(tenant)
    }

    pub fn tenants(
        &self,
        owner: UserId,
        status: TenantStatus,
    ) -> Result<Vec<Tenant>, HostelServiceError> {
        Ok(self.store.tenants(owner, Some(status))?)
    }

    /// Tenant owned by `owner`; other owners' tenants are reported as missing.
    pub fn tenant(&self, owner: UserId, id: TenantId) -> Result<Tenant, HostelServiceError> {
        self.store
            .tenant(id)?
            .filter(|tenant| tenant.owner_id == owner)
            .ok_or(HostelServiceError::TenantNotFound(id))
    }

    pub fn record_payment(
        &self,
        owner: UserId,
        id: TenantId,
        request: PaymentRequest,
        today: NaiveDate,
    ) -> Result<Payment, HostelServiceError> {
        if request.amount <= 0 {
            return Err(HostelServiceError::InvalidAmount(request.amount));
        }

        let tenant = self.tenant(owner, id)?;
        if !tenant.is_active() {
            return Err(HostelServiceError::TenantNotActive(id));
        }

        let payment = self
            .store
            .insert_payment(NewPayment {
                tenant_id: tenant.id,
                owner_id: owner,
                amount: request.amount,
                paid_for_month: request.month,
                paid_on: request.paid_on.unwrap_or(today),
            })
            .map_err(|err| inactive_on_conflict(err, id))?;

        info!(
            owner_id = %owner,
            tenant_id = %tenant.id,
            amount = payment.amount,
            month = payment.paid_for_month.label(),
            "payment recorded"
        );
        Ok(payment)
    }

    pub fn payments(
        &self,
        owner: UserId,
        id: TenantId,
    ) -> Result<Vec<Payment>, HostelServiceError> {
        let tenant = self.tenant(owner, id)?;
        Ok(self.store.payments_for(tenant.id)?)
    }

    pub fn balance(
        &self,
        owner: UserId,
        id: TenantId,
        today: NaiveDate,
    ) -> Result<BalanceStatement, HostelServiceError> {
        let tenant = self.tenant(owner, id)?;
        let evaluated_on = tenant.evaluation_date(today);
        let balance = self.balance_for(&tenant, evaluated_on)?;

        Ok(BalanceStatement {
            tenant_id: tenant.id,
            name: tenant.name,
            status: tenant.status,
            evaluated_on,
            balance,
        })
    }

    pub fn settlement(
        &self,
        owner: UserId,
        id: TenantId,
        today: NaiveDate,
    ) -> Result<SettlementStatement, HostelServiceError> {
        let tenant = self.tenant(owner, id)?;
        self.settlement_for(&tenant, tenant.evaluation_date(today))
    }

    /// Marks an active tenant as checked out and settles the account as of
    /// the checkout date.
    pub fn checkout(
        &self,
        owner: UserId,
        id: TenantId,
        checkout_date: NaiveDate,
    ) -> Result<CheckoutReceipt, HostelServiceError> {
        let tenant = self.tenant(owner, id)?;
        if !tenant.is_active() {
            return Err(HostelServiceError::TenantNotActive(id));
        }

        let tenant = self
            .store
            .mark_checked_out(tenant.id, checkout_date)
            .map_err(|err| inactive_on_conflict(err, id))?;
        let settlement = self.settlement_for(&tenant, checkout_date)?;

        info!(
            owner_id = %owner,
            tenant_id = %tenant.id,
            refund = settlement.settlement.refund,
            "tenant checked out"
        );
        Ok(CheckoutReceipt { tenant, settlement })
    }

    pub fn dashboard(
        &self,
        owner: UserId,
        today: NaiveDate,
    ) -> Result<DashboardSummary, HostelServiceError> {
        let mut summary = DashboardSummary::default();

        for entry in self.vacancy(owner)? {
            summary.capacity = summary.capacity.saturating_add(entry.capacity);
            summary.occupied = summary.occupied.saturating_add(entry.occupied);
            summary.vacant = summary.vacant.saturating_add(entry.vacant);
        }

        for tenant in self.store.tenants(owner, None)? {
            if !tenant.is_active() {
                summary.checked_out_tenants += 1;
                continue;
            }
            summary.active_tenants += 1;
            let balance = self.balance_for(&tenant, today)?;
            summary.accrued = summary.accrued.saturating_add(balance.accrued);
            summary.paid = summary.paid.saturating_add(balance.paid);
            summary.outstanding = summary.outstanding.saturating_add(balance.remaining);
        }

        Ok(summary)
    }

    pub(crate) fn balance_for(
        &self,
        tenant: &Tenant,
        evaluated_on: NaiveDate,
    ) -> Result<Balance, HostelServiceError> {
        let amounts: Vec<i64> = self
            .store
            .payments_for(tenant.id)?
            .into_iter()
            .map(|payment| payment.amount)
            .collect();

        Ok(match tenant.joined_on() {
            Some(joined) => {
                Balance::for_join_date(joined, tenant.monthly_rent, &amounts, evaluated_on)
            }
            None => Balance::zero(),
        })
    }

    pub(crate) fn settlement_for(
        &self,
        tenant: &Tenant,
        evaluated_on: NaiveDate,
    ) -> Result<SettlementStatement, HostelServiceError> {
        let balance = self.balance_for(tenant, evaluated_on)?;
        let settlement = Settlement::from_balance(balance, tenant.security_deposit);

        Ok(SettlementStatement {
            tenant_id: tenant.id,
            name: tenant.name.clone(),
            status: tenant.status,
            evaluated_on,
            summary: settlement.summary(&self.currency),
            settlement,
        })
    }
}

/// Another writer checked the tenant out between our read and the store write.
fn inactive_on_conflict(err: StoreError, id: TenantId) -> HostelServiceError {
    match err {
        StoreError::Conflict => HostelServiceError::TenantNotActive(id),
        other => other.into(),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum HostelServiceError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("payment amount must be positive, got {0}")]
    InvalidAmount(i64),
    #[error("an account for '{0}' already exists")]
    DuplicateEmail(String),
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("room type '{0}' has no rent configured; configure rooms first")]
    RoomNotConfigured(RoomType),
    #[error("tenant {0} not found")]
    TenantNotFound(TenantId),
    #[error("tenant {0} is already checked out")]
    TenantNotActive(TenantId),
    #[error(transparent)]
    Store(#[from] StoreError),
}
