//! Hostel administration: owner accounts, room configuration, tenant
//! onboarding and checkout, and monthly rent tracking.
//!
//! The rent arithmetic lives in [`ledger`] and is independent of storage;
//! [`hostel`] wires it to a [`hostel::HostelStore`] and an axum router.

pub mod config;
pub mod error;
pub mod hostel;
pub mod ledger;
pub mod telemetry;
