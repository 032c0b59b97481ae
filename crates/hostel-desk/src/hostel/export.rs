use chrono::NaiveDate;
use serde::Serialize;
use std::io::Write;

use super::domain::UserId;
use super::service::{HostelService, HostelServiceError};
use super::store::{HostelStore, StoreError};

#[derive(Debug, Serialize)]
struct TenantExportRow<'a> {
    id: i64,
    name: &'a str,
    contact: &'a str,
    room_type: &'static str,
    building: &'a str,
    status: &'static str,
    join_date: &'a str,
    checkout_date: Option<NaiveDate>,
    monthly_rent: i64,
    security_deposit: i64,
    evaluated_on: NaiveDate,
    accrued: i64,
    paid: i64,
    remaining: i64,
    refund: i64,
}

/// Writes every tenant of the owner, any status, with their settlement figures.
/// Returns the number of data rows written.
pub fn export_tenants_csv<S, W>(
    service: &HostelService<S>,
    owner: UserId,
    writer: W,
    today: NaiveDate,
) -> Result<usize, ExportError>
where
    S: HostelStore + ?Sized,
    W: Write,
{
    let mut csv = csv::Writer::from_writer(writer);
    let tenants = service.store().tenants(owner, None)?;

    for tenant in &tenants {
        let evaluated_on = tenant.evaluation_date(today);
        let statement = service.settlement_for(tenant, evaluated_on)?;
        let figures = statement.settlement;

        csv.serialize(TenantExportRow {
            id: tenant.id.0,
            name: &tenant.name,
            contact: &tenant.contact,
            room_type: tenant.room_type.label(),
            building: tenant.building.as_deref().unwrap_or(""),
            status: tenant.status.as_str(),
            join_date: &tenant.join_date,
            checkout_date: tenant.checkout_date,
            monthly_rent: tenant.monthly_rent,
            security_deposit: tenant.security_deposit,
            evaluated_on,
            accrued: figures.accrued,
            paid: figures.paid,
            remaining: figures.remaining,
            refund: figures.refund,
        })?;
    }

    csv.flush()?;
    Ok(tenants.len())
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to write csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to flush export: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Service(#[from] HostelServiceError),
}

impl From<StoreError> for ExportError {
    fn from(value: StoreError) -> Self {
        Self::Service(value.into())
    }
}
