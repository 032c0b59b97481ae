use chrono::{Local, NaiveDate};
use hostel_desk::config::AppConfig;
use hostel_desk::hostel::{
    open_store, HostelService, HostelStore, Month, RoomType, StoreError, TenantStatus,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

pub(crate) type SharedService = Arc<HostelService<dyn HostelStore>>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) fn build_service(config: &AppConfig) -> Result<SharedService, StoreError> {
    let store = open_store(&config.store)?;
    Ok(Arc::new(HostelService::new(
        store,
        config.ledger.currency_symbol.clone(),
    )))
}

pub(crate) fn today_or(date: Option<NaiveDate>) -> NaiveDate {
    date.unwrap_or_else(|| Local::now().date_naive())
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn parse_room_type(raw: &str) -> Result<RoomType, String> {
    raw.parse::<RoomType>().map_err(|err| {
        let known: Vec<&str> = RoomType::ordered().iter().map(|room| room.label()).collect();
        format!("{err}; expected one of: {}", known.join(", "))
    })
}

pub(crate) fn parse_month(raw: &str) -> Result<Month, String> {
    raw.parse::<Month>()
}

pub(crate) fn parse_status(raw: &str) -> Result<TenantStatus, String> {
    raw.parse::<TenantStatus>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_cli_values() {
        assert_eq!(
            parse_date(" 2025-03-20 "),
            Ok(NaiveDate::from_ymd_opt(2025, 3, 20).expect("valid date"))
        );
        assert!(parse_date("20/03/2025").is_err());
        assert_eq!(parse_room_type("3 sharing"), Ok(RoomType::ThreeSharing));
        assert!(parse_room_type("Suite")
            .expect_err("unknown room")
            .contains("2 Sharing (Attached Bathroom)"));
        assert_eq!(parse_month("oct"), Ok(Month::Oct));
        assert_eq!(parse_status("checked-out"), Ok(TenantStatus::CheckedOut));
    }
}
