//! Compound interest formula
//!
//! One accrual run applies:
//!
//! ```text
//! new_interest = principal * ((1 + rate/n)^n - 1) / SCALE
//! ```
//!
//! with n = 365 daily compounding periods. The SCALE divisors (10^7 for
//! loans, 10^4 for term deposits) convert the annual compound-growth figure
//! into a small per-run increment and are kept as-is for numerical
//! compatibility with the books produced so far. Whether that scaling is the
//! intended model is an open product question; if true daily compounding is
//! ever confirmed as the correct semantics, this function is the single
//! place to change.

use rust_decimal::{Decimal, MathematicalOps};

/// Daily compounding periods per year.
pub const COMPOUNDING_PERIODS: i64 = 365;

/// Legacy per-run scale divisor for loan interest.
pub const LOAN_SCALE: Decimal = Decimal::from_parts(10_000_000, 0, 0, false, 0);

/// Legacy per-run scale divisor for term deposit interest.
pub const TERM_DEPOSIT_SCALE: Decimal = Decimal::from_parts(10_000, 0, 0, false, 0);

/// Interest applied to a holder by one accrual run.
///
/// `rate` is the annual nominal rate as a decimal fraction (e.g. 0.0745).
/// The result is rounded to 8 decimal places before being applied.
pub fn per_run_interest(principal: Decimal, rate: Decimal, scale: Decimal) -> Decimal {
    let n = Decimal::from(COMPOUNDING_PERIODS);
    let growth = (Decimal::ONE + rate / n).powi(COMPOUNDING_PERIODS);
    (principal * (growth - Decimal::ONE) / scale).round_dp(8)
}

/// Per-run interest for a loan.
pub fn loan_interest(principal: Decimal, rate: Decimal) -> Decimal {
    per_run_interest(principal, rate, LOAN_SCALE)
}

/// Per-run interest for a term deposit.
pub fn term_deposit_interest(principal: Decimal, rate: Decimal) -> Decimal {
    per_run_interest(principal, rate, TERM_DEPOSIT_SCALE)
}
