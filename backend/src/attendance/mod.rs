//! Attendance taking: the durable ledger and the time-boxed sessions that feed it.

pub mod clock;
pub mod ledger;
pub mod manager;
pub mod session;

pub use manager::SessionManager;
