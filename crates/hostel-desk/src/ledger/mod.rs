//! Rent accrual and checkout arithmetic.
//!
//! Everything here is a pure function of its arguments. The evaluation date is
//! always passed in so callers decide what "today" means.

mod balance;
mod settlement;

pub use balance::{compute_balance, months_elapsed, parse_join_date, Balance};
pub use settlement::{compute_settlement, format_amount, Settlement, SettlementDirection};
