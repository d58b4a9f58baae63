// Validation engine.
//
// Decides whether a looked-up coupon may be redeemed. A failed check
// is a normal outcome, not an error: callers get the full check
// breakdown plus the user-facing message for the first failing check.

use chrono::{DateTime, Utc};

use crate::model::{Coupon, CouponStatus};

pub const MSG_NOT_FOUND: &str = "Cupón no encontrado";
pub const MSG_ALREADY_REDEEMED: &str = "Este cupón ya fue canjeado";
pub const MSG_EXPIRED: &str = "Este cupón está vencido";
pub const MSG_IDENTITY_MISMATCH: &str = "El DUI no coincide con el comprador";
pub const MSG_VALID: &str = "Cupón válido";

/// Individual check results, reported even when an earlier check fails.
///
/// When the coupon doesn't exist the remaining checks are all `false`:
/// nothing can be asserted about a missing coupon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ValidationChecks {
    pub exists: bool,
    pub not_redeemed: bool,
    pub not_expired: bool,
    pub identity_matches: bool,
}

/// The outcome of a redemption validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationOutcome {
    pub valid: bool,
    pub checks: ValidationChecks,
    /// User-facing message for the first failing check, in priority
    /// order: existence, redemption, expiry, identity.
    pub message: &'static str,
}

impl ValidationOutcome {
    fn rejected(checks: ValidationChecks, message: &'static str) -> Self {
        Self {
            valid: false,
            checks,
            message,
        }
    }
}

/// Validate a coupon for redemption as of `now`.
///
/// `presented_national_id` is the DUI presented at the counter. Every
/// redemption requires the document: all four checks must hold.
pub fn validate(
    coupon: Option<&Coupon>,
    presented_national_id: &str,
    now: DateTime<Utc>,
) -> ValidationOutcome {
    let Some(coupon) = coupon else {
        return ValidationOutcome::rejected(ValidationChecks::default(), MSG_NOT_FOUND);
    };

    let checks = ValidationChecks {
        exists: true,
        not_redeemed: coupon.status != CouponStatus::Redeemed,
        not_expired: coupon.status != CouponStatus::Expired && !coupon.is_past_deadline(now),
        identity_matches: presented_national_id == coupon.national_id,
    };

    if !checks.not_redeemed {
        ValidationOutcome::rejected(checks, MSG_ALREADY_REDEEMED)
    } else if !checks.not_expired {
        ValidationOutcome::rejected(checks, MSG_EXPIRED)
    } else if !checks.identity_matches {
        ValidationOutcome::rejected(checks, MSG_IDENTITY_MISMATCH)
    } else {
        ValidationOutcome {
            valid: true,
            checks,
            message: MSG_VALID,
        }
    }
}
