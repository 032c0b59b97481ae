use std::sync::Arc;

use chrono::NaiveDate;
use hostel_desk::hostel::{
    export_tenants_csv, Credentials, HostelService, Month, NewTenantRequest, PaymentRequest,
    RoomSetup, RoomType, SqliteHostelStore, TenantStatus,
};

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

fn sqlite_service() -> HostelService<SqliteHostelStore> {
    let store = SqliteHostelStore::open_in_memory().expect("sqlite opens");
    HostelService::new(Arc::new(store), "₹")
}

#[test]
fn full_tenant_lifecycle_on_sqlite() {
    let service = sqlite_service();
    let owner = service
        .signup(Credentials::new("warden@example.com", "pw"))
        .expect("signup")
        .id;
    service
        .configure_room(
            owner,
            RoomSetup {
                room_type: RoomType::TwoSharing,
                capacity: 4,
                rent: 4500,
            },
        )
        .expect("room configured");

    let tenant = service
        .onboard(
            owner,
            NewTenantRequest {
                name: "Anil".to_string(),
                contact: "90000 11111".to_string(),
                room_type: RoomType::TwoSharing,
                building: Some("A".to_string()),
                join_date: Some(date(2025, 1, 31)),
                security_deposit: 4500,
            },
            date(2025, 1, 31),
        )
        .expect("tenant onboarded");

    for month in [Month::Jan, Month::Feb] {
        service
            .record_payment(
                owner,
                tenant.id,
                PaymentRequest {
                    amount: 4500,
                    month,
                    paid_on: Some(date(2025, 2, 10)),
                },
                date(2025, 2, 10),
            )
            .expect("payment recorded");
    }

    let vacancy = service.vacancy(owner).expect("vacancy");
    assert_eq!(vacancy.len(), 1);
    assert_eq!(vacancy[0].occupied, 1);
    assert_eq!(vacancy[0].vacant, 3);

    let receipt = service
        .checkout(owner, tenant.id, date(2025, 4, 1))
        .expect("checkout");
    assert_eq!(receipt.settlement.settlement.months, 4);
    assert_eq!(receipt.settlement.settlement.accrued, 18000);
    assert_eq!(receipt.settlement.settlement.remaining, 9000);
    assert_eq!(receipt.settlement.settlement.refund, -4500);

    let checked_out = service
        .tenants(owner, TenantStatus::CheckedOut)
        .expect("list");
    assert_eq!(checked_out.len(), 1);
    assert_eq!(checked_out[0].checkout_date, Some(date(2025, 4, 1)));
    assert_eq!(service.vacancy(owner).expect("vacancy")[0].vacant, 4);

    let mut buffer = Vec::new();
    let rows =
        export_tenants_csv(&service, owner, &mut buffer, date(2025, 9, 1)).expect("export");
    assert_eq!(rows, 1);
    let text = String::from_utf8(buffer).expect("utf-8 csv");
    let mut lines = text.lines();
    assert_eq!(
        lines.next(),
        Some(
            "id,name,contact,room_type,building,status,join_date,checkout_date,monthly_rent,\
             security_deposit,evaluated_on,accrued,paid,remaining,refund"
        )
    );
    assert_eq!(
        lines.next(),
        Some(
            "1,Anil,90000 11111,2 Sharing,A,checked_out,2025-01-31,2025-04-01,4500,4500,\
             2025-04-01,18000,9000,9000,-4500"
        )
    );
}
