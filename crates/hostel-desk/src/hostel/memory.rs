use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use super::domain::{
    NewPayment, NewTenant, NewUser, Payment, PaymentId, RoomConfig, RoomType, Tenant, TenantId,
    TenantStatus, UserAccount, UserId, DATE_FORMAT,
};
use super::store::{HostelStore, StoreError};

/// Process-local store. Ids are assigned from 1 per record kind.
#[derive(Debug, Default)]
pub struct InMemoryHostelStore {
    state: Mutex<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    last_user: i64,
    last_tenant: i64,
    last_payment: i64,
    users: BTreeMap<UserId, UserAccount>,
    rooms: BTreeMap<(UserId, RoomType), RoomConfig>,
    tenants: BTreeMap<TenantId, Tenant>,
    payments: Vec<Payment>,
}

impl InMemoryHostelStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>, StoreError> {
        self.state
            .lock()
            .map_err(|_| StoreError::Unavailable("in-memory store lock poisoned".to_string()))
    }
}

impl HostelStore for InMemoryHostelStore {
    fn insert_user(&self, user: NewUser) -> Result<UserAccount, StoreError> {
        let mut state = self.lock()?;
        if state.users.values().any(|existing| existing.email == user.email) {
            return Err(StoreError::Conflict);
        }

        state.last_user += 1;
        let account = UserAccount {
            id: UserId(state.last_user),
            email: user.email,
            password_hash: user.password_hash,
            subscription: user.subscription,
        };
        state.users.insert(account.id, account.clone());
        Ok(account)
    }

    fn user_by_email(&self, email: &str) -> Result<Option<UserAccount>, StoreError> {
        let state = self.lock()?;
        Ok(state
            .users
            .values()
            .find(|account| account.email == email)
            .cloned())
    }

    fn replace_room_config(&self, config: RoomConfig) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        state
            .rooms
            .insert((config.owner_id, config.room_type), config);
        Ok(())
    }

    fn room_config(
        &self,
        owner: UserId,
        room_type: RoomType,
    ) -> Result<Option<RoomConfig>, StoreError> {
        let state = self.lock()?;
        Ok(state.rooms.get(&(owner, room_type)).copied())
    }

    fn room_configs(&self, owner: UserId) -> Result<Vec<RoomConfig>, StoreError> {
        let state = self.lock()?;
        Ok(state
            .rooms
            .values()
            .filter(|config| config.owner_id == owner)
            .copied()
            .collect())
    }

    fn insert_tenant(&self, tenant: NewTenant) -> Result<Tenant, StoreError> {
        let mut state = self.lock()?;
        state.last_tenant += 1;
        let record = Tenant {
            id: TenantId(state.last_tenant),
            owner_id: tenant.owner_id,
            name: tenant.name,
            contact: tenant.contact,
            room_type: tenant.room_type,
            building: tenant.building,
            status: TenantStatus::Active,
            created_at: tenant.created_at,
            join_date: tenant.join_date.format(DATE_FORMAT).to_string(),
            checkout_date: None,
            monthly_rent: tenant.monthly_rent,
            security_deposit: tenant.security_deposit,
        };
        state.tenants.insert(record.id, record.clone());
        Ok(record)
    }

    fn tenant(&self, id: TenantId) -> Result<Option<Tenant>, StoreError> {
        let state = self.lock()?;
        Ok(state.tenants.get(&id).cloned())
    }

    fn tenants(
        &self,
        owner: UserId,
        status: Option<TenantStatus>,
    ) -> Result<Vec<Tenant>, StoreError> {
        let state = self.lock()?;
        Ok(state
            .tenants
            .values()
            .filter(|tenant| tenant.owner_id == owner)
            .filter(|tenant| status.map_or(true, |wanted| tenant.status == wanted))
            .cloned()
            .collect())
    }

    fn count_active(&self, owner: UserId, room_type: RoomType) -> Result<i64, StoreError> {
        let state = self.lock()?;
        let count = state
            .tenants
            .values()
            .filter(|tenant| {
                tenant.owner_id == owner && tenant.room_type == room_type && tenant.is_active()
            })
            .count();
        Ok(count as i64)
    }

    fn mark_checked_out(
        &self,
        id: TenantId,
        checkout_date: NaiveDate,
    ) -> Result<Tenant, StoreError> {
        let mut state = self.lock()?;
        let tenant = state.tenants.get_mut(&id).ok_or(StoreError::NotFound)?;
        if !tenant.is_active() {
            return Err(StoreError::Conflict);
        }
        tenant.status = TenantStatus::CheckedOut;
        tenant.checkout_date = Some(checkout_date);
        Ok(tenant.clone())
    }

    fn insert_payment(&self, payment: NewPayment) -> Result<Payment, StoreError> {
        let mut state = self.lock()?;
        match state.tenants.get(&payment.tenant_id) {
            None => return Err(StoreError::NotFound),
            Some(tenant) if !tenant.is_active() => return Err(StoreError::Conflict),
            Some(_) => {}
        }
        state.last_payment += 1;
        let record = Payment {
            id: PaymentId(state.last_payment),
            tenant_id: payment.tenant_id,
            owner_id: payment.owner_id,
            amount: payment.amount,
            paid_for_month: payment.paid_for_month,
            paid_on: payment.paid_on,
        };
        state.payments.push(record.clone());
        Ok(record)
    }

    fn payments_for(&self, tenant: TenantId) -> Result<Vec<Payment>, StoreError> {
        let state = self.lock()?;
        Ok(state
            .payments
            .iter()
            .filter(|payment| payment.tenant_id == tenant)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hostel::domain::Month;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
    }

    #[test]
    fn writes_against_checked_out_tenant_conflict() {
        let store = InMemoryHostelStore::new();
        let tenant = store
            .insert_tenant(NewTenant {
                owner_id: UserId(1),
                name: "Kiran".to_string(),
                contact: String::new(),
                room_type: RoomType::Single,
                building: None,
                created_at: date(2025, 1, 1).and_hms_opt(9, 0, 0).expect("valid time"),
                join_date: date(2025, 1, 1),
                monthly_rent: 6000,
                security_deposit: 6000,
            })
            .expect("tenant inserted");
        store
            .mark_checked_out(tenant.id, date(2025, 2, 10))
            .expect("first checkout");

        assert!(matches!(
            store.mark_checked_out(tenant.id, date(2025, 5, 1)),
            Err(StoreError::Conflict)
        ));
        assert!(matches!(
            store.insert_payment(NewPayment {
                tenant_id: tenant.id,
                owner_id: UserId(1),
                amount: 6000,
                paid_for_month: Month::Feb,
                paid_on: date(2025, 2, 11),
            }),
            Err(StoreError::Conflict)
        ));
        let stored = store
            .tenant(tenant.id)
            .expect("fetch")
            .expect("tenant present");
        assert_eq!(stored.checkout_date, Some(date(2025, 2, 10)));
        assert!(store.payments_for(tenant.id).expect("payments").is_empty());
    }
}
