// Coupon code newtype.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// A coupon's unique redemption code.
///
/// Codes are the merchant-facing company prefix followed by a random
/// seven-digit number, e.g. `COMAL4821963`. The store enforces global
/// uniqueness on the backing column; generation here only makes
/// collisions unlikely, not impossible.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CouponCode(String);

impl CouponCode {
    /// Wrap an already-stored code. Trims surrounding whitespace.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into().trim().to_owned())
    }

    /// Generate a fresh code for `company_code` using the supplied RNG.
    pub fn generate<R: Rng>(company_code: &str, rng: &mut R) -> Self {
        let number: u32 = rng.gen_range(1_000_000..10_000_000);
        Self(format!("{company_code}{number}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CouponCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CouponCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CouponCode {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn generated_code_has_company_prefix_and_seven_digits() {
        let mut rng = rand::thread_rng();
        for _ in 0..100 {
            let code = CouponCode::generate("COMAL", &mut rng);
            let digits = code.as_str().strip_prefix("COMAL").unwrap();
            assert_eq!(digits.len(), 7);
            assert!(digits.chars().all(|c| c.is_ascii_digit()));
            assert_ne!(digits.chars().next(), Some('0'));
        }
    }

    #[test]
    fn new_trims_whitespace() {
        assert_eq!(CouponCode::new("  COMAL1234567 ").as_str(), "COMAL1234567");
    }
}
