use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use super::domain::{
    Month, NewPayment, NewTenant, NewUser, Payment, PaymentId, RoomConfig, RoomType, Tenant,
    TenantId, TenantStatus, UserAccount, UserId, DATE_FORMAT, TIMESTAMP_FORMAT,
};
use super::store::{HostelStore, StoreError};
use crate::ledger::parse_join_date;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    email TEXT NOT NULL UNIQUE,
    password TEXT NOT NULL,
    subscription TEXT NOT NULL DEFAULT 'trial'
);

CREATE TABLE IF NOT EXISTS room_config (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    owner_id INTEGER NOT NULL,
    room_type TEXT NOT NULL,
    capacity INTEGER NOT NULL,
    rent INTEGER NOT NULL,
    UNIQUE (owner_id, room_type)
);

CREATE TABLE IF NOT EXISTS tenants (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    owner_id INTEGER NOT NULL,
    name TEXT NOT NULL,
    contact TEXT NOT NULL,
    room_type TEXT NOT NULL,
    building TEXT,
    status TEXT NOT NULL,
    created_at TEXT NOT NULL,
    join_date TEXT NOT NULL,
    checkout_date TEXT,
    security_deposit INTEGER NOT NULL,
    monthly_rent INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_tenants_owner_status ON tenants(owner_id, status);

CREATE TABLE IF NOT EXISTS payments (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    tenant_id INTEGER NOT NULL,
    owner_id INTEGER NOT NULL,
    amount INTEGER NOT NULL,
    paid_for_month TEXT NOT NULL,
    paid_on TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_payments_tenant ON payments(tenant_id);
"#;

const TENANT_COLUMNS: &str = "id, owner_id, name, contact, room_type, building, status, \
     created_at, join_date, checkout_date, security_deposit, monthly_rent";

/// SQLite-backed store. One connection, serialized behind a mutex.
#[derive(Debug)]
pub struct SqliteHostelStore {
    conn: Mutex<Connection>,
}

impl SqliteHostelStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(store_error)?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(store_error)?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA).map_err(store_error)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Unavailable("sqlite connection lock poisoned".to_string()))
    }
}

fn store_error(err: rusqlite::Error) -> StoreError {
    match &err {
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.code == ErrorCode::ConstraintViolation =>
        {
            StoreError::Conflict
        }
        _ => StoreError::Unavailable(err.to_string()),
    }
}

/// Explains why a status-guarded write touched no rows.
fn inactive_or_missing(conn: &Connection, id: TenantId) -> StoreError {
    let exists: Result<i64, _> = conn.query_row(
        "SELECT COUNT(*) FROM tenants WHERE id = ?1",
        params![id.0],
        |row| row.get(0),
    );
    match exists {
        Ok(0) => StoreError::NotFound,
        Ok(_) => StoreError::Conflict,
        Err(err) => store_error(err),
    }
}

fn corrupt(column: &str, detail: impl std::fmt::Display) -> StoreError {
    StoreError::Unavailable(format!("unreadable {column} column: {detail}"))
}

/// Raw tenant columns, decoded outside the rusqlite row closure.
struct TenantRow {
    id: i64,
    owner_id: i64,
    name: String,
    contact: String,
    room_type: String,
    building: Option<String>,
    status: String,
    created_at: String,
    join_date: String,
    checkout_date: Option<String>,
    security_deposit: i64,
    monthly_rent: i64,
}

impl TenantRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            owner_id: row.get(1)?,
            name: row.get(2)?,
            contact: row.get(3)?,
            room_type: row.get(4)?,
            building: row.get(5)?,
            status: row.get(6)?,
            created_at: row.get(7)?,
            join_date: row.get(8)?,
            checkout_date: row.get(9)?,
            security_deposit: row.get(10)?,
            monthly_rent: row.get(11)?,
        })
    }

    fn into_tenant(self) -> Result<Tenant, StoreError> {
        let room_type = self
            .room_type
            .parse::<RoomType>()
            .map_err(|err| corrupt("room_type", err))?;
        let status = self
            .status
            .parse::<TenantStatus>()
            .map_err(|err| corrupt("status", err))?;
        let created_at = NaiveDateTime::parse_from_str(&self.created_at, TIMESTAMP_FORMAT)
            .map_err(|err| corrupt("created_at", err))?;

        Ok(Tenant {
            id: TenantId(self.id),
            owner_id: UserId(self.owner_id),
            name: self.name,
            contact: self.contact,
            room_type,
            building: self.building,
            status,
            created_at,
            join_date: self.join_date,
            checkout_date: self.checkout_date.as_deref().and_then(parse_join_date),
            monthly_rent: self.monthly_rent,
            security_deposit: self.security_deposit,
        })
    }
}

struct PaymentRow {
    id: i64,
    tenant_id: i64,
    owner_id: i64,
    amount: i64,
    paid_for_month: String,
    paid_on: String,
}

impl PaymentRow {
    fn into_payment(self) -> Result<Payment, StoreError> {
        let paid_for_month = self
            .paid_for_month
            .parse::<Month>()
            .map_err(|err| corrupt("paid_for_month", err))?;
        let paid_on = NaiveDate::parse_from_str(&self.paid_on, DATE_FORMAT)
            .map_err(|err| corrupt("paid_on", err))?;

        Ok(Payment {
            id: PaymentId(self.id),
            tenant_id: TenantId(self.tenant_id),
            owner_id: UserId(self.owner_id),
            amount: self.amount,
            paid_for_month,
            paid_on,
        })
    }
}

fn room_config_from_row(
    owner: UserId,
    room_type: &str,
    capacity: i64,
    rent: i64,
) -> Result<RoomConfig, StoreError> {
    let room_type = room_type
        .parse::<RoomType>()
        .map_err(|err| corrupt("room_type", err))?;
    Ok(RoomConfig {
        owner_id: owner,
        room_type,
        capacity,
        rent,
    })
}

impl HostelStore for SqliteHostelStore {
    fn insert_user(&self, user: NewUser) -> Result<UserAccount, StoreError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO users (email, password, subscription) VALUES (?1, ?2, ?3)",
            params![user.email, user.password_hash, user.subscription],
        )
        .map_err(store_error)?;

        Ok(UserAccount {
            id: UserId(conn.last_insert_rowid()),
            email: user.email,
            password_hash: user.password_hash,
            subscription: user.subscription,
        })
    }

    fn user_by_email(&self, email: &str) -> Result<Option<UserAccount>, StoreError> {
        let conn = self.lock()?;
        conn.query_row(
            "SELECT id, email, password, subscription FROM users WHERE email = ?1",
            params![email],
            |row| {
                Ok(UserAccount {
                    id: UserId(row.get(0)?),
                    email: row.get(1)?,
                    password_hash: row.get(2)?,
                    subscription: row.get(3)?,
                })
            },
        )
        .optional()
        .map_err(store_error)
    }

    fn replace_room_config(&self, config: RoomConfig) -> Result<(), StoreError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction().map_err(store_error)?;
        tx.execute(
            "DELETE FROM room_config WHERE owner_id = ?1 AND room_type = ?2",
            params![config.owner_id.0, config.room_type.label()],
        )
        .map_err(store_error)?;
        tx.execute(
            "INSERT INTO room_config (owner_id, room_type, capacity, rent) VALUES (?1, ?2, ?3, ?4)",
            params![
                config.owner_id.0,
                config.room_type.label(),
                config.capacity,
                config.rent
            ],
        )
        .map_err(store_error)?;
        tx.commit().map_err(store_error)
    }

    fn room_config(
        &self,
        owner: UserId,
        room_type: RoomType,
    ) -> Result<Option<RoomConfig>, StoreError> {
        let conn = self.lock()?;
        let row = conn
            .query_row(
                "SELECT capacity, rent FROM room_config WHERE owner_id = ?1 AND room_type = ?2",
                params![owner.0, room_type.label()],
                |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)),
            )
            .optional()
            .map_err(store_error)?;

        Ok(row.map(|(capacity, rent)| RoomConfig {
            owner_id: owner,
            room_type,
            capacity,
            rent,
        }))
    }

    fn room_configs(&self, owner: UserId) -> Result<Vec<RoomConfig>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare("SELECT room_type, capacity, rent FROM room_config WHERE owner_id = ?1")
            .map_err(store_error)?;
        let rows = stmt
            .query_map(params![owner.0], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, i64>(2)?,
                ))
            })
            .map_err(store_error)?;

        let mut configs = Vec::new();
        for row in rows {
            let (room_type, capacity, rent) = row.map_err(store_error)?;
            configs.push(room_config_from_row(owner, &room_type, capacity, rent)?);
        }
        configs.sort_by_key(|config| config.room_type);
        Ok(configs)
    }

    fn insert_tenant(&self, tenant: NewTenant) -> Result<Tenant, StoreError> {
        let conn = self.lock()?;
        let join_date = tenant.join_date.format(DATE_FORMAT).to_string();
        conn.execute(
            "INSERT INTO tenants (owner_id, name, contact, room_type, building, status, created_at, \
             join_date, checkout_date, security_deposit, monthly_rent) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, NULL, ?9, ?10)",
            params![
                tenant.owner_id.0,
                tenant.name,
                tenant.contact,
                tenant.room_type.label(),
                tenant.building,
                TenantStatus::Active.as_str(),
                tenant.created_at.format(TIMESTAMP_FORMAT).to_string(),
                join_date,
                tenant.security_deposit,
                tenant.monthly_rent
            ],
        )
        .map_err(store_error)?;

        Ok(Tenant {
            id: TenantId(conn.last_insert_rowid()),
            owner_id: tenant.owner_id,
            name: tenant.name,
            contact: tenant.contact,
            room_type: tenant.room_type,
            building: tenant.building,
            status: TenantStatus::Active,
            created_at: tenant.created_at,
            join_date,
            checkout_date: None,
            monthly_rent: tenant.monthly_rent,
            security_deposit: tenant.security_deposit,
        })
    }

    fn tenant(&self, id: TenantId) -> Result<Option<Tenant>, StoreError> {
        let conn = self.lock()?;
        let sql = format!("SELECT {TENANT_COLUMNS} FROM tenants WHERE id = ?1");
        conn.query_row(&sql, params![id.0], TenantRow::read)
            .optional()
            .map_err(store_error)?
            .map(TenantRow::into_tenant)
            .transpose()
    }

    fn tenants(
        &self,
        owner: UserId,
        status: Option<TenantStatus>,
    ) -> Result<Vec<Tenant>, StoreError> {
        let conn = self.lock()?;
        let sql = format!(
            "SELECT {TENANT_COLUMNS} FROM tenants \
             WHERE owner_id = ?1 AND (?2 IS NULL OR status = ?2) ORDER BY id"
        );
        let mut stmt = conn.prepare(&sql).map_err(store_error)?;
        let rows = stmt
            .query_map(
                params![owner.0, status.map(TenantStatus::as_str)],
                TenantRow::read,
            )
            .map_err(store_error)?;

        let mut tenants = Vec::new();
        for row in rows {
            tenants.push(row.map_err(store_error)?.into_tenant()?);
        }
        Ok(tenants)
    }

    fn count_active(&self, owner: UserId, room_type: RoomType) -> Result<i64, StoreError> {
        let conn = self.lock()?;
        conn.query_row(
            "SELECT COUNT(*) FROM tenants WHERE owner_id = ?1 AND room_type = ?2 AND status = ?3",
            params![owner.0, room_type.label(), TenantStatus::Active.as_str()],
            |row| row.get(0),
        )
        .map_err(store_error)
    }

    fn mark_checked_out(
        &self,
        id: TenantId,
        checkout_date: NaiveDate,
    ) -> Result<Tenant, StoreError> {
        let conn = self.lock()?;
        let changed = conn
            .execute(
                "UPDATE tenants SET status = ?2, checkout_date = ?3 \
                 WHERE id = ?1 AND status = ?4",
                params![
                    id.0,
                    TenantStatus::CheckedOut.as_str(),
                    checkout_date.format(DATE_FORMAT).to_string(),
                    TenantStatus::Active.as_str()
                ],
            )
            .map_err(store_error)?;
        if changed == 0 {
            return Err(inactive_or_missing(&conn, id));
        }

        let sql = format!("SELECT {TENANT_COLUMNS} FROM tenants WHERE id = ?1");
        conn.query_row(&sql, params![id.0], TenantRow::read)
            .map_err(store_error)?
            .into_tenant()
    }

    fn insert_payment(&self, payment: NewPayment) -> Result<Payment, StoreError> {
        let conn = self.lock()?;
        let inserted = conn
            .execute(
                "INSERT INTO payments (tenant_id, owner_id, amount, paid_for_month, paid_on) \
                 SELECT ?1, ?2, ?3, ?4, ?5 \
                 WHERE EXISTS (SELECT 1 FROM tenants WHERE id = ?1 AND status = ?6)",
                params![
                    payment.tenant_id.0,
                    payment.owner_id.0,
                    payment.amount,
                    payment.paid_for_month.label(),
                    payment.paid_on.format(DATE_FORMAT).to_string(),
                    TenantStatus::Active.as_str()
                ],
            )
            .map_err(store_error)?;
        if inserted == 0 {
            return Err(inactive_or_missing(&conn, payment.tenant_id));
        }

        Ok(Payment {
            id: PaymentId(conn.last_insert_rowid()),
            tenant_id: payment.tenant_id,
            owner_id: payment.owner_id,
            amount: payment.amount,
            paid_for_month: payment.paid_for_month,
            paid_on: payment.paid_on,
        })
    }

    fn payments_for(&self, tenant: TenantId) -> Result<Vec<Payment>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, tenant_id, owner_id, amount, paid_for_month, paid_on \
                 FROM payments WHERE tenant_id = ?1 ORDER BY id",
            )
            .map_err(store_error)?;
        let rows = stmt
            .query_map(params![tenant.0], |row| {
                Ok(PaymentRow {
                    id: row.get(0)?,
                    tenant_id: row.get(1)?,
                    owner_id: row.get(2)?,
                    amount: row.get(3)?,
                    paid_for_month: row.get(4)?,
                    paid_on: row.get(5)?,
                })
            })
            .map_err(store_error)?;

        let mut payments = Vec::new();
        for row in rows {
            payments.push(row.map_err(store_error)?.into_payment()?);
        }
        Ok(payments)
    }
}
