// ── Core error types ──
//
// User-facing errors from cuponera-core. These are NOT store-specific --
// consumers never see HTTP status codes or JSON parse failures directly.
// The `From<cuponera_api::Error>` impl translates transport-layer errors
// into domain-appropriate variants.

use thiserror::Error;

use crate::engine::validate::ValidationChecks;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach the coupon store: {reason}")]
    ConnectionFailed { reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Store request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Coupon not found: {code}")]
    CouponNotFound { code: String },

    #[error("Offer not found: {id}")]
    OfferNotFound { id: String },

    // ── Operation errors ─────────────────────────────────────────────
    /// Purchase rejected before any write was attempted (offer off
    /// sale, sold out, or over the purchase limit).
    #[error("Purchase rejected: {reason}")]
    PurchaseRejected { reason: String },

    /// The store persisted none of the requested coupons.
    #[error("Purchase failed: {message}")]
    PurchaseFailed { message: String },

    /// Redemption refused by the validation engine. `reason` is the
    /// user-facing (Spanish) message for the first failing check.
    #[error("Redemption rejected: {reason}")]
    RedemptionRejected {
        reason: &'static str,
        checks: ValidationChecks,
    },

    /// An operation needs a signed-in session and none is set.
    #[error("No active session: {operation} requires a signed-in buyer")]
    NoSession { operation: &'static str },

    // ── Store errors (wrapped, not exposed raw) ──────────────────────
    #[error("Store error: {message}")]
    Store {
        message: String,
        /// Machine-readable store error type (e.g. `"UNIQUE_CONSTRAINT"`).
        kind: Option<String>,
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<cuponera_api::Error> for CoreError {
    fn from(err: cuponera_api::Error) -> Self {
        match err {
            cuponera_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            cuponera_api::Error::Transport(ref e) => {
                // reqwest timeouts don't carry the configured duration;
                // only `Error::Timeout` from the api crate does.
                if e.is_timeout() {
                    CoreError::ConnectionFailed {
                        reason: format!("request timed out: {e}"),
                    }
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Store {
                        message: e.to_string(),
                        kind: None,
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            cuponera_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid store URL: {e}"),
            },
            cuponera_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            cuponera_api::Error::Store {
                message,
                kind,
                status,
            } => CoreError::Store {
                message,
                kind,
                status: Some(status),
            },
            cuponera_api::Error::RecordNotFound { table, id } => CoreError::Store {
                message: format!("Record not found: {table}/{id}"),
                kind: None,
                status: Some(404),
            },
            cuponera_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}
