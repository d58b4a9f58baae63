use thiserror::Error;

/// Top-level error type for the `cuponera-api` crate.
///
/// Covers every failure mode of the table store surface: authentication,
/// transport, structured store errors, and payload decoding.
/// `cuponera-core` maps these into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// API token rejected by the store (401/403).
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Store ───────────────────────────────────────────────────────
    /// Structured error from the table store (parsed from the
    /// `{"error": {"type", "message"}}` body).
    #[error("Table store error (HTTP {status}): {message}")]
    Store {
        message: String,
        /// Machine-readable error type (e.g. `"UNIQUE_CONSTRAINT"`).
        kind: Option<String>,
        status: u16,
    },

    /// Record not found (404 on a direct record read).
    #[error("Record not found: {table}/{id}")]
    RecordNotFound { table: String, id: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

/// Error type the store reports when a unique index rejects a value.
pub(crate) const UNIQUE_CONSTRAINT: &str = "UNIQUE_CONSTRAINT";

impl Error {
    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Timeout { .. } => true,
            Self::Store { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::RecordNotFound { .. } => true,
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::Store { status: 404, .. } => true,
            _ => false,
        }
    }

    /// Returns `true` if the store rejected a write because a unique
    /// index (the coupon `codigo` column) already holds the value.
    pub fn is_unique_violation(&self) -> bool {
        matches!(
            self,
            Self::Store { kind: Some(k), .. } if k == UNIQUE_CONSTRAINT
        )
    }

    /// Extract the store error type, if available.
    pub fn store_error_kind(&self) -> Option<&str> {
        match self {
            Self::Store { kind, .. } => kind.as_deref(),
            _ => None,
        }
    }
}
