use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Rent accrued against a tenant, what was paid, and what is still owed.
///
/// `remaining` is negative when the tenant has paid ahead of the accrued total.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    /// Billed calendar months, or 0 when no join date could be read.
    pub months: i64,
    pub accrued: i64,
    pub paid: i64,
    pub remaining: i64,
}

impl Balance {
    pub const fn zero() -> Self {
        Self {
            months: 0,
            accrued: 0,
            paid: 0,
            remaining: 0,
        }
    }

    /// Balance for a tenant whose join date is already known.
    pub fn for_join_date(
        join_date: NaiveDate,
        monthly_rent: i64,
        payments: &[i64],
        today: NaiveDate,
    ) -> Self {
        let months = months_elapsed(join_date, today);
        let accrued = months.saturating_mul(monthly_rent);
        let paid = total_paid(payments);

        Self {
            months,
            accrued,
            paid,
            remaining: accrued.saturating_sub(paid),
        }
    }
}

/// Whole calendar months billed between `join_date` and `today`, counting the
/// joining month itself. Never less than one.
pub fn months_elapsed(join_date: NaiveDate, today: NaiveDate) -> i64 {
    let years = i64::from(today.year()) - i64::from(join_date.year());
    let months = i64::from(today.month()) - i64::from(join_date.month());
    (years * 12 + months + 1).max(1)
}

/// Reads `YYYY-MM-DD`, or the date prefix of a longer ISO-8601 timestamp.
pub fn parse_join_date(raw: &str) -> Option<NaiveDate> {
    let prefix = raw.trim().get(..10)?;
    NaiveDate::parse_from_str(prefix, DATE_FORMAT).ok()
}

/// Balance for a stored join date string. A missing or unreadable date yields
/// [`Balance::zero`] rather than an error.
pub fn compute_balance(
    join_date: Option<&str>,
    monthly_rent: i64,
    payments: &[i64],
    today: NaiveDate,
) -> Balance {
    match join_date.and_then(parse_join_date) {
        Some(join_date) => Balance::for_join_date(join_date, monthly_rent, payments, today),
        None => Balance::zero(),
    }
}

fn total_paid(payments: &[i64]) -> i64 {
    payments
        .iter()
        .fold(0_i64, |total, amount| total.saturating_add(*amount))
}
