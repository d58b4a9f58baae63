//! Coupon lifecycle engine between `cuponera-api` and UI consumers.
//!
//! This crate owns the business logic and domain model for the La
//! Cuponera workspace:
//!
//! - **[`Coordinator`]** — Central facade for consumers. Holds the
//!   signed-in [`SessionContext`], runs the refresh / purchase / redeem
//!   flows, and publishes the categorized wallet through a
//!   `tokio::sync::watch` channel that UIs subscribe to.
//!
//! - **Categorization engine** ([`engine::categorize`]) — Pure split of
//!   a wallet into available / redeemed / expired buckets from the
//!   stored status plus the use-by deadline, against one clock reading.
//!   Derived expiry is presentation-only and never written back.
//!
//! - **Validation engine** ([`engine::validate`]) — Redemption
//!   gatekeeper. Checks existence, prior redemption, expiry, and buyer
//!   identity in priority order and reports the full check breakdown
//!   with a user-facing (Spanish) message.
//!
//! - **[`CouponStore`]** — Persistence seam. [`TableStore`] implements
//!   it over the REST table client; tests swap in an in-memory store.
//!
//! - **Domain model** ([`model`]) — Canonical types ([`Coupon`],
//!   [`Offer`], [`CouponCode`], [`CouponStatus`]) decoupled from the
//!   store's Spanish wire columns, which `convert` maps at the boundary.

pub mod convert;
pub mod coordinator;
pub mod engine;
pub mod error;
pub mod model;
pub mod session;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use coordinator::{Coordinator, PurchaseFailure, PurchaseOutcome, WalletState};
pub use engine::categorize::{CouponBuckets, categorize};
pub use engine::validate::{ValidationChecks, ValidationOutcome, validate};
pub use error::CoreError;
pub use session::SessionContext;
pub use store::{BatchOutcome, CouponStore, RejectedDraft, TableStore};

// Re-export model types at the crate root for ergonomics.
pub use model::{Coupon, CouponCode, CouponDraft, CouponStatus, Offer, WalletStatistics};
