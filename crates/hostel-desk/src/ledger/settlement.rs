use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::balance::{compute_balance, Balance};

/// Checkout reconciliation of a tenant's balance against the security deposit.
///
/// `refund` is `deposit - remaining`; a negative value is money the tenant
/// still owes once the deposit has been used up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub months: i64,
    pub accrued: i64,
    pub paid: i64,
    pub remaining: i64,
    pub deposit: i64,
    pub refund: i64,
}

/// Which way money moves when the tenant leaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "amount", rename_all = "snake_case")]
pub enum SettlementDirection {
    Refund(i64),
    Collect(i64),
}

impl SettlementDirection {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Refund(_) => "Amount to refund tenant",
            Self::Collect(_) => "Amount to collect from tenant",
        }
    }

    pub const fn amount(self) -> i64 {
        match self {
            Self::Refund(amount) | Self::Collect(amount) => amount,
        }
    }
}

impl Settlement {
    pub fn from_balance(balance: Balance, deposit: i64) -> Self {
        Self {
            months: balance.months,
            accrued: balance.accrued,
            paid: balance.paid,
            remaining: balance.remaining,
            deposit,
            refund: deposit.saturating_sub(balance.remaining),
        }
    }

    pub fn balance(&self) -> Balance {
        Balance {
            months: self.months,
            accrued: self.accrued,
            paid: self.paid,
            remaining: self.remaining,
        }
    }

    pub fn direction(&self) -> SettlementDirection {
        if self.refund >= 0 {
            SettlementDirection::Refund(self.refund)
        } else {
            SettlementDirection::Collect(self.refund.saturating_neg())
        }
    }

    /// One-line summary such as `Amount to collect from tenant: ₹3000`.
    pub fn summary(&self, currency: &str) -> String {
        let direction = self.direction();
        format!(
            "{}: {}",
            direction.label(),
            format_amount(currency, direction.amount())
        )
    }
}

pub fn compute_settlement(
    join_date: Option<&str>,
    monthly_rent: i64,
    payments: &[i64],
    deposit: i64,
    today: NaiveDate,
) -> Settlement {
    let balance = compute_balance(join_date, monthly_rent, payments, today);
    Settlement::from_balance(balance, deposit)
}

pub fn format_amount(currency: &str, amount: i64) -> String {
    if amount < 0 {
        format!("-{currency}{}", amount.unsigned_abs())
    } else {
        format!("{currency}{amount}")
    }
}
