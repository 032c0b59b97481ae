use std::sync::Arc;

use axum::body::to_bytes;
use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::hostel::accounts::Credentials;
use crate::hostel::domain::{RoomType, Tenant, UserId};
use crate::hostel::memory::InMemoryHostelStore;
use crate::hostel::service::{HostelService, NewTenantRequest, RoomSetup};

pub(super) type MemoryService = HostelService<InMemoryHostelStore>;

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn service() -> (Arc<InMemoryHostelStore>, Arc<MemoryService>) {
    let store = Arc::new(InMemoryHostelStore::new());
    let service = Arc::new(HostelService::new(store.clone(), "₹"));
    (store, service)
}

pub(super) fn owner(service: &MemoryService, email: &str) -> UserId {
    service
        .signup(Credentials::new(email, "correct horse"))
        .expect("owner signs up")
        .id
}

pub(super) fn configured_owner(service: &MemoryService) -> UserId {
    let owner = owner(service, "warden@example.com");
    for (room_type, capacity, rent) in [
        (RoomType::Single, 2, 6000),
        (RoomType::TwoSharing, 4, 4500),
        (RoomType::ThreeSharing, 6, 3000),
    ] {
        service
            .configure_room(
                owner,
                RoomSetup {
                    room_type,
                    capacity,
                    rent,
                },
            )
            .expect("room configured");
    }
    owner
}

pub(super) fn tenant_request(
    name: &str,
    room_type: RoomType,
    join_date: NaiveDate,
) -> NewTenantRequest {
    NewTenantRequest {
        name: name.to_string(),
        contact: "98450 12345".to_string(),
        room_type,
        building: Some("B".to_string()),
        join_date: Some(join_date),
        security_deposit: 3000,
    }
}

/// Tenant in a 3000/month bed who joined on 2025-01-15 with a 3000 deposit.
pub(super) fn onboarded_tenant(service: &MemoryService, owner: UserId) -> Tenant {
    service
        .onboard(
            owner,
            tenant_request("Ravi", RoomType::ThreeSharing, date(2025, 1, 15)),
            date(2025, 1, 15),
        )
        .expect("tenant onboarded")
}

pub(super) async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("body readable");
    serde_json::from_slice(&bytes).expect("json body")
}
