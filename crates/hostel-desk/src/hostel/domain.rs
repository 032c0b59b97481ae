use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ledger::parse_join_date;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(pub i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Bed arrangements an owner can price and allocate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RoomType {
    #[serde(rename = "Single", alias = "single")]
    Single,
    #[serde(rename = "2 Sharing", alias = "two_sharing")]
    TwoSharing,
    #[serde(
        rename = "2 Sharing (Attached Bathroom)",
        alias = "two_sharing_attached"
    )]
    TwoSharingAttached,
    #[serde(rename = "3 Sharing", alias = "three_sharing")]
    ThreeSharing,
}

impl RoomType {
    pub const fn ordered() -> [Self; 4] {
        [
            Self::Single,
            Self::TwoSharing,
            Self::TwoSharingAttached,
            Self::ThreeSharing,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Single => "Single",
            Self::TwoSharing => "2 Sharing",
            Self::TwoSharingAttached => "2 Sharing (Attached Bathroom)",
            Self::ThreeSharing => "3 Sharing",
        }
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::TwoSharing => "two_sharing",
            Self::TwoSharingAttached => "two_sharing_attached",
            Self::ThreeSharing => "three_sharing",
        }
    }
}

impl fmt::Display for RoomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for RoomType {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let value = raw.trim();
        Self::ordered()
            .into_iter()
            .find(|room| room.label().eq_ignore_ascii_case(value) || room.key() == value)
            .ok_or_else(|| format!("unknown room type '{raw}'"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TenantStatus {
    Active,
    CheckedOut,
}

impl TenantStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::CheckedOut => "checked_out",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::CheckedOut => "Checked Out",
        }
    }
}

impl FromStr for TenantStatus {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "active" => Ok(Self::Active),
            "checked_out" | "checkedout" => Ok(Self::CheckedOut),
            _ => Err(format!("unknown tenant status '{raw}'")),
        }
    }
}

/// Calendar month a payment is recorded against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Month {
    Jan,
    Feb,
    Mar,
    Apr,
    May,
    Jun,
    Jul,
    Aug,
    Sep,
    Oct,
    Nov,
    Dec,
}

impl Month {
    pub const fn ordered() -> [Self; 12] {
        [
            Self::Jan,
            Self::Feb,
            Self::Mar,
            Self::Apr,
            Self::May,
            Self::Jun,
            Self::Jul,
            Self::Aug,
            Self::Sep,
            Self::Oct,
            Self::Nov,
            Self::Dec,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Jan => "Jan",
            Self::Feb => "Feb",
            Self::Mar => "Mar",
            Self::Apr => "Apr",
            Self::May => "May",
            Self::Jun => "Jun",
            Self::Jul => "Jul",
            Self::Aug => "Aug",
            Self::Sep => "Sep",
            Self::Oct => "Oct",
            Self::Nov => "Nov",
            Self::Dec => "Dec",
        }
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Month {
    type Err = String;

    /// Accepts the short label or any longer prefix such as `September`.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let value = raw.trim();
        let prefix = value.get(..3).unwrap_or(value);
        Self::ordered()
            .into_iter()
            .find(|month| month.label().eq_ignore_ascii_case(prefix))
            .ok_or_else(|| format!("unknown month '{raw}'"))
    }
}

/// Owner account. The password hash never leaves the store layer in responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserAccount {
    pub id: UserId,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub subscription: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub subscription: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomConfig {
    pub owner_id: UserId,
    pub room_type: RoomType,
    pub capacity: i64,
    pub rent: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VacancyEntry {
    pub room_type: RoomType,
    pub capacity: i64,
    pub occupied: i64,
    /// Negative when more tenants are active than beds configured.
    pub vacant: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tenant {
    pub id: TenantId,
    pub owner_id: UserId,
    pub name: String,
    pub contact: String,
    pub room_type: RoomType,
    pub building: Option<String>,
    pub status: TenantStatus,
    pub created_at: NaiveDateTime,
    /// Kept as the text the store holds; read through [`Tenant::joined_on`].
    pub join_date: String,
    pub checkout_date: Option<NaiveDate>,
    pub monthly_rent: i64,
    pub security_deposit: i64,
}

impl Tenant {
    pub fn joined_on(&self) -> Option<NaiveDate> {
        parse_join_date(&self.join_date)
    }

    pub fn is_active(&self) -> bool {
        self.status == TenantStatus::Active
    }

    /// Date balances are evaluated on: accrual stops at checkout.
    pub fn evaluation_date(&self, today: NaiveDate) -> NaiveDate {
        match (self.status, self.checkout_date) {
            (TenantStatus::CheckedOut, Some(checkout)) => checkout,
            _ => today,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTenant {
    pub owner_id: UserId,
    pub name: String,
    pub contact: String,
    pub room_type: RoomType,
    pub building: Option<String>,
    pub created_at: NaiveDateTime,
    pub join_date: NaiveDate,
    pub monthly_rent: i64,
    pub security_deposit: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Payment {
    pub id: PaymentId,
    pub tenant_id: TenantId,
    pub owner_id: UserId,
    pub amount: i64,
    pub paid_for_month: Month,
    pub paid_on: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPayment {
    pub tenant_id: TenantId,
    pub owner_id: UserId,
    pub amount: i64,
    pub paid_for_month: Month,
    pub paid_on: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn room_types_parse_from_labels_and_keys() {
        assert_eq!("Single".parse::<RoomType>(), Ok(RoomType::Single));
        assert_eq!(
            "2 sharing (attached bathroom)".parse::<RoomType>(),
            Ok(RoomType::TwoSharingAttached)
        );
        assert_eq!("three_sharing".parse::<RoomType>(), Ok(RoomType::ThreeSharing));
        assert!("Dorm".parse::<RoomType>().is_err());
    }

    #[test]
    fn months_parse_short_and_long_names() {
        assert_eq!("jan".parse::<Month>(), Ok(Month::Jan));
        assert_eq!("September".parse::<Month>(), Ok(Month::Sep));
        assert!("Smarch".parse::<Month>().is_err());
    }

    #[test]
    fn room_type_serializes_as_label() {
        let json = serde_json::to_string(&RoomType::TwoSharingAttached).expect("serializes");
        assert_eq!(json, "\"2 Sharing (Attached Bathroom)\"");
        let parsed: RoomType = serde_json::from_str("\"two_sharing\"").expect("alias parses");
        assert_eq!(parsed, RoomType::TwoSharing);
    }
}
