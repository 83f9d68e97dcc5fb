//! Transaction reference numbers
//!
//! Every transaction record is stamped with a reference number at creation
//! time: three uppercase letters, one digit, three uppercase letters, one
//! digit, two uppercase letters (e.g. `QWE4RTY7UI`). The space is large but
//! not collision-free, so the repository retries inserts on a
//! unique-constraint violation with a freshly generated number.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

const UPPERCASE: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// A generated transaction reference number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReferenceNumber(String);

impl ReferenceNumber {
    /// Generate a fresh reference number.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let mut out = String::with_capacity(10);

        push_letters(&mut out, &mut rng, 3);
        out.push(char::from(b'0' + rng.gen_range(0..10)));
        push_letters(&mut out, &mut rng, 3);
        out.push(char::from(b'0' + rng.gen_range(0..10)));
        push_letters(&mut out, &mut rng, 2);

        Self(out)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn push_letters<R: Rng>(out: &mut String, rng: &mut R, count: usize) {
    for _ in 0..count {
        let idx = rng.gen_range(0..UPPERCASE.len());
        out.push(char::from(UPPERCASE[idx]));
    }
}

impl fmt::Display for ReferenceNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
