use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use serde_json::json;

use super::accounts::Credentials;
use super::domain::{TenantId, TenantStatus, UserId};
use super::service::{
    HostelService, HostelServiceError, NewTenantRequest, PaymentRequest, RoomSetup,
};
use super::store::{HostelStore, StoreError};

/// Optional evaluation date for statement endpoints; defaults to the local date.
#[derive(Debug, Default, Deserialize)]
pub struct EvaluationQuery {
    #[serde(default)]
    pub today: Option<NaiveDate>,
}

impl EvaluationQuery {
    fn resolve(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct TenantListQuery {
    #[serde(default)]
    pub status: Option<TenantStatus>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CheckoutRequest {
    #[serde(default)]
    pub checkout_date: Option<NaiveDate>,
}

impl CheckoutRequest {
    /// An empty body means "check out today"; anything else must be valid JSON.
    fn from_body(body: &[u8]) -> Result<Self, HostelServiceError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice(body).map_err(|err| {
            HostelServiceError::InvalidInput(format!("invalid checkout request: {err}"))
        })
    }
}

/// Router exposing accounts, rooms, tenants, payments and statements.
pub fn hostel_router<S>(service: Arc<HostelService<S>>) -> Router
where
    S: HostelStore + ?Sized + 'static,
{
    Router::new()
        .route("/api/v1/accounts/signup", post(signup_handler::<S>))
        .route("/api/v1/accounts/login", post(login_handler::<S>))
        .route(
            "/api/v1/owners/:owner_id/rooms",
            get(list_rooms_handler::<S>).post(configure_room_handler::<S>),
        )
        .route("/api/v1/owners/:owner_id/vacancy", get(vacancy_handler::<S>))
        .route(
            "/api/v1/owners/:owner_id/dashboard",
            get(dashboard_handler::<S>),
        )
        .route(
            "/api/v1/owners/:owner_id/tenants",
            get(list_tenants_handler::<S>).post(onboard_handler::<S>),
        )
        .route(
            "/api/v1/owners/:owner_id/tenants/:tenant_id",
            get(tenant_handler::<S>),
        )
        .route(
            "/api/v1/owners/:owner_id/tenants/:tenant_id/balance",
            get(balance_handler::<S>),
        )
        .route(
            "/api/v1/owners/:owner_id/tenants/:tenant_id/settlement",
            get(settlement_handler::<S>),
        )
        .route(
            "/api/v1/owners/:owner_id/tenants/:tenant_id/checkout",
            post(checkout_handler::<S>),
        )
        .route(
            "/api/v1/owners/:owner_id/tenants/:tenant_id/payments",
            get(list_payments_handler::<S>).post(record_payment_handler::<S>),
        )
        .with_state(service)
}

impl HostelServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidInput(_) | Self::InvalidAmount(_) | Self::RoomNotConfigured(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::TenantNotFound(_) | Self::Store(StoreError::NotFound) => StatusCode::NOT_FOUND,
            Self::DuplicateEmail(_)
            | Self::TenantNotActive(_)
            | Self::Store(StoreError::Conflict) => StatusCode::CONFLICT,
            Self::Store(StoreError::Unavailable(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for HostelServiceError {
    fn into_response(self) -> Response {
        let payload = json!({ "error": self.to_string() });
        (self.status_code(), Json(payload)).into_response()
    }
}

pub(crate) async fn signup_handler<S>(
    State(service): State<Arc<HostelService<S>>>,
    Json(credentials): Json<Credentials>,
) -> Result<Response, HostelServiceError>
where
    S: HostelStore + ?Sized + 'static,
{
    let account = service.signup(credentials)?;
    Ok((StatusCode::CREATED, Json(account)).into_response())
}

pub(crate) async fn login_handler<S>(
    State(service): State<Arc<HostelService<S>>>,
    Json(credentials): Json<Credentials>,
) -> Result<Response, HostelServiceError>
where
    S: HostelStore + ?Sized + 'static,
{
    let account = service.login(credentials)?;
    Ok(Json(account).into_response())
}

pub(crate) async fn list_rooms_handler<S>(
    State(service): State<Arc<HostelService<S>>>,
    Path(owner_id): Path<i64>,
) -> Result<Response, HostelServiceError>
where
    S: HostelStore + ?Sized + 'static,
{
    let configs = service.room_configs(UserId(owner_id))?;
    Ok(Json(configs).into_response())
}

pub(crate) async fn configure_room_handler<S>(
    State(service): State<Arc<HostelService<S>>>,
    Path(owner_id): Path<i64>,
    Json(setup): Json<RoomSetup>,
) -> Result<Response, HostelServiceError>
where
    S: HostelStore + ?Sized + 'static,
{
    let config = service.configure_room(UserId(owner_id), setup)?;
    Ok(Json(config).into_response())
}

pub(crate) async fn vacancy_handler<S>(
    State(service): State<Arc<HostelService<S>>>,
    Path(owner_id): Path<i64>,
) -> Result<Response, HostelServiceError>
where
    S: HostelStore + ?Sized + 'static,
{
    let vacancy = service.vacancy(UserId(owner_id))?;
    Ok(Json(vacancy).into_response())
}

pub(crate) async fn dashboard_handler<S>(
    State(service): State<Arc<HostelService<S>>>,
    Path(owner_id): Path<i64>,
    Query(query): Query<EvaluationQuery>,
) -> Result<Response, HostelServiceError>
where
    S: HostelStore + ?Sized + 'static,
{
    let summary = service.dashboard(UserId(owner_id), query.resolve())?;
    Ok(Json(summary).into_response())
}

pub(crate) async fn list_tenants_handler<S>(
    State(service): State<Arc<HostelService<S>>>,
    Path(owner_id): Path<i64>,
    Query(query): Query<TenantListQuery>,
) -> Result<Response, HostelServiceError>
where
    S: HostelStore + ?Sized + 'static,
{
    let status = query.status.unwrap_or(TenantStatus::Active);
    let tenants = service.tenants(UserId(owner_id), status)?;
    Ok(Json(tenants).into_response())
}

pub(crate) async fn onboard_handler<S>(
    State(service): State<Arc<HostelService<S>>>,
    Path(owner_id): Path<i64>,
    Json(request): Json<NewTenantRequest>,
) -> Result<Response, HostelServiceError>
where
    S: HostelStore + ?Sized + 'static,
{
    let today = Local::now().date_naive();
    let tenant = service.onboard(UserId(owner_id), request, today)?;
    Ok((StatusCode::CREATED, Json(tenant)).into_response())
}

pub(crate) async fn tenant_handler<S>(
    State(service): State<Arc<HostelService<S>>>,
    Path((owner_id, tenant_id)): Path<(i64, i64)>,
) -> Result<Response, HostelServiceError>
where
    S: HostelStore + ?Sized + 'static,
{
    let tenant = service.tenant(UserId(owner_id), TenantId(tenant_id))?;
    Ok(Json(tenant).into_response())
}

pub(crate) async fn balance_handler<S>(
    State(service): State<Arc<HostelService<S>>>,
    Path((owner_id, tenant_id)): Path<(i64, i64)>,
    Query(query): Query<EvaluationQuery>,
) -> Result<Response, HostelServiceError>
where
    S: HostelStore + ?Sized + 'static,
{
    let statement = service.balance(UserId(owner_id), TenantId(tenant_id), query.resolve())?;
    Ok(Json(statement).into_response())
}

pub(crate) async fn settlement_handler<S>(
    State(service): State<Arc<HostelService<S>>>,
    Path((owner_id, tenant_id)): Path<(i64, i64)>,
    Query(query): Query<EvaluationQuery>,
) -> Result<Response, HostelServiceError>
where
    S: HostelStore + ?Sized + 'static,
{
    let statement = service.settlement(UserId(owner_id), TenantId(tenant_id), query.resolve())?;
    Ok(Json(statement).into_response())
}

pub(crate) async fn checkout_handler<S>(
    State(service): State<Arc<HostelService<S>>>,
    Path((owner_id, tenant_id)): Path<(i64, i64)>,
    body: Bytes,
) -> Result<Response, HostelServiceError>
where
    S: HostelStore + ?Sized + 'static,
{
    let checkout_date = CheckoutRequest::from_body(&body)?
        .checkout_date
        .unwrap_or_else(|| Local::now().date_naive());
    let receipt = service.checkout(UserId(owner_id), TenantId(tenant_id), checkout_date)?;
    Ok(Json(receipt).into_response())
}

pub(crate) async fn list_payments_handler<S>(
    State(service): State<Arc<HostelService<S>>>,
    Path((owner_id, tenant_id)): Path<(i64, i64)>,
) -> Result<Response, HostelServiceError>
where
    S: HostelStore + ?Sized + 'static,
{
    let payments = service.payments(UserId(owner_id), TenantId(tenant_id))?;
    Ok(Json(payments).into_response())
}

pub(crate) async fn record_payment_handler<S>(
    State(service): State<Arc<HostelService<S>>>,
    Path((owner_id, tenant_id)): Path<(i64, i64)>,
    Json(request): Json<PaymentRequest>,
) -> Result<Response, HostelServiceError>
where
    S: HostelStore + ?Sized + 'static,
{
    let today = Local::now().date_naive();
    let payment = service.record_payment(UserId(owner_id), TenantId(tenant_id), request, today)?;
    Ok((StatusCode::CREATED, Json(payment)).into_response())
}
