//! Accrual module
//!
//! Scheduled batch computation of compound interest on loans and term
//! deposits. The engine walks every active interest-bearing holder once per
//! run; the scheduler owns the timer, the per-day run lease and graceful
//! shutdown.

mod engine;
pub mod formula;
mod scheduler;

pub use engine::{AccrualEngine, AccrualError, AccrualFailure, AccrualReport};
pub use scheduler::AccrualScheduler;
